//! Style configuration delivered by the host, plus the persist-defaults hook.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Assignment;

/// Stroke pattern for crease lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
	/// Continuous line.
	#[default]
	Solid,
	/// `[5, 5]`.
	Dashed,
	/// `[1, 5]`.
	Dotted,
	/// `[5, 5, 1, 5]`.
	#[serde(alias = "dash-dot")]
	DashDot,
}

impl LineStyle {
	/// Dash segments at zoom 1, in pixels.
	pub fn base_pattern(self) -> &'static [f64] {
		match self {
			Self::Solid => &[],
			Self::Dashed => &[5.0, 5.0],
			Self::Dotted => &[1.0, 5.0],
			Self::DashDot => &[5.0, 5.0, 1.0, 5.0],
		}
	}
}

/// Per-assignment stroke colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
	pub mountain: String,
	pub valley: String,
	pub boundary: String,
	pub flat: String,
	pub unassigned: String,
}

impl Default for Colors {
	fn default() -> Self {
		Self {
			mountain: "red".into(),
			valley: "blue".into(),
			boundary: "black".into(),
			flat: "gray".into(),
			unassigned: "#b0b0b0".into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineStyles {
	pub line_width: f64,
	pub mountain_style: LineStyle,
	pub valley_style: LineStyle,
}

impl Default for LineStyles {
	fn default() -> Self {
		Self {
			line_width: 2.0,
			mountain_style: LineStyle::DashDot,
			valley_style: LineStyle::Dashed,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VertexStyle {
	pub show: bool,
	pub radius: f64,
	pub color: String,
}

impl Default for VertexStyle {
	fn default() -> Self {
		Self {
			show: true,
			radius: 2.0,
			color: "black".into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasStyle {
	pub background_color: String,
	/// Pixels kept clear around the fitted pattern.
	pub padding: f64,
	/// Fractional zoom change per wheel notch.
	pub zoom_speed: f64,
}

impl Default for CanvasStyle {
	fn default() -> Self {
		Self {
			background_color: "#ffffff".into(),
			padding: 40.0,
			zoom_speed: 0.1,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelStyle {
	pub radius: f64,
	pub vertex_color: String,
	pub edge_color: String,
	pub face_color: String,
	pub border_color: String,
	pub border_width: f64,
	pub font_size: f64,
	pub text_color: String,
	/// Vertical pixel offset from the anchor point; negative is up.
	pub offset: f64,
}

impl Default for LabelStyle {
	fn default() -> Self {
		Self {
			radius: 8.0,
			vertex_color: "#ffe08a".into(),
			edge_color: "#b8e0ff".into(),
			face_color: "#c8f0c0".into(),
			border_color: "#333333".into(),
			border_width: 1.0,
			font_size: 10.0,
			text_color: "#000000".into(),
			offset: -12.0,
		}
	}
}

/// Complete style configuration. Replaced wholesale on every host update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
	pub colors: Colors,
	pub line_styles: LineStyles,
	pub vertices: VertexStyle,
	pub canvas: CanvasStyle,
	pub labels: LabelStyle,
}

impl StyleConfig {
	/// Stroke color for an assignment.
	pub fn color(&self, assignment: Assignment) -> &str {
		match assignment {
			Assignment::Boundary => &self.colors.boundary,
			Assignment::Mountain => &self.colors.mountain,
			Assignment::Valley => &self.colors.valley,
			Assignment::Flat => &self.colors.flat,
			Assignment::Unassigned => &self.colors.unassigned,
		}
	}

	/// Line style for an assignment. Only mountain and valley are configurable.
	pub fn line_style(&self, assignment: Assignment) -> LineStyle {
		match assignment {
			Assignment::Mountain => self.line_styles.mountain_style,
			Assignment::Valley => self.line_styles.valley_style,
			_ => LineStyle::Solid,
		}
	}

	/// Flattens the configuration into dotted keys, e.g. `colors.mountain`.
	pub fn to_keys(&self) -> Vec<(String, Value)> {
		let mut keys = Vec::new();
		if let Ok(Value::Object(root)) = serde_json::to_value(self) {
			flatten_into("", &root, &mut keys);
		}
		keys
	}

	/// Builds a configuration from dotted keys, defaulting anything absent.
	pub fn from_keys<'a>(keys: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
		let mut root = Map::new();
		for (key, value) in keys {
			let mut node = &mut root;
			let mut parts = key.split('.').peekable();
			while let Some(part) = parts.next() {
				if parts.peek().is_none() {
					node.insert(part.to_owned(), value.clone());
					break;
				}
				let child = node
					.entry(part.to_owned())
					.or_insert_with(|| Value::Object(Map::new()));
				let Value::Object(map) = child else {
					break;
				};
				node = map;
			}
		}
		serde_json::from_value(Value::Object(root)).unwrap_or_else(|err| {
			warn!("Stored style configuration is invalid, using defaults: {err}");
			Self::default()
		})
	}
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
	for (name, value) in map {
		let key = if prefix.is_empty() {
			name.clone()
		} else {
			format!("{prefix}.{name}")
		};
		match value {
			Value::Object(child) => flatten_into(&key, child, out),
			leaf => out.push((key, leaf.clone())),
		}
	}
}

/// Persistent storage for style keys.
pub trait ConfigStore {
	/// Returns the stored value for a dotted key.
	fn get(&self, key: &str) -> Option<Value>;

	/// Stores `value` under `key` only if nothing is stored there yet.
	fn persist_default(&mut self, key: &str, value: Value);

	/// Loads the stored configuration, defaulting absent keys.
	fn load(&self) -> StyleConfig {
		let keys: Vec<(String, Value)> = StyleConfig::default()
			.to_keys()
			.into_iter()
			.filter_map(|(key, _)| self.get(&key).map(|value| (key, value)))
			.collect();
		StyleConfig::from_keys(keys.iter().map(|(k, v)| (k.as_str(), v.clone())))
	}
}

/// Requests persistence of every default style key the store lacks.
///
/// Returns the keys that were written.
pub fn seed_defaults(store: &mut impl ConfigStore) -> Vec<String> {
	let mut written = Vec::new();
	for (key, value) in StyleConfig::default().to_keys() {
		if store.get(&key).is_none() {
			debug!("persisting default {key} = {value}");
			store.persist_default(&key, value);
			written.push(key);
		}
	}
	written
}

/// In-memory store, used when no browser storage is available.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	values: Map<String, Value>,
}

impl ConfigStore for MemoryStore {
	fn get(&self, key: &str) -> Option<Value> {
		self.values.get(key).cloned()
	}

	fn persist_default(&mut self, key: &str, value: Value) {
		self.values.entry(key.to_owned()).or_insert(value);
	}
}

const STORAGE_PREFIX: &str = "fold-preview.";

/// Browser `localStorage`, keys prefixed with `fold-preview.`.
pub struct LocalStorageStore {
	storage: web_sys::Storage,
}

impl LocalStorageStore {
	/// Opens the window's local storage, if the browser allows it.
	pub fn open() -> Option<Self> {
		let storage = web_sys::window()?.local_storage().ok()??;
		Some(Self { storage })
	}
}

impl ConfigStore for LocalStorageStore {
	fn get(&self, key: &str) -> Option<Value> {
		let raw = self
			.storage
			.get_item(&format!("{STORAGE_PREFIX}{key}"))
			.ok()??;
		serde_json::from_str(&raw).ok()
	}

	fn persist_default(&mut self, key: &str, value: Value) {
		if self.get(key).is_some() {
			return;
		}
		if self
			.storage
			.set_item(&format!("{STORAGE_PREFIX}{key}"), &value.to_string())
			.is_err()
		{
			warn!("Could not persist style key {key}");
		}
	}
}
