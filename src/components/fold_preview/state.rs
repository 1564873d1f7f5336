use log::{debug, info, warn};
use serde_json::Value;

use super::config::StyleConfig;
use super::document::{FoldDocument, FoldError};
use super::message::HostMessage;
use super::render::{self, DrawOp};
use super::transform::{Point, ViewTransform};

pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// Horizontal space taken by the page padding around the canvas.
pub const FIXED_PADDING: f64 = 40.0;

/// Which index labels are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelVisibility {
	pub vertices: bool,
	pub edges: bool,
	pub faces: bool,
}

/// Label categories the user can toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
	Vertex,
	Edge,
	Face,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

/// Keyboard and button commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
	ZoomIn,
	ZoomOut,
	Reset,
	FitToView,
}

impl Command {
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"+" | "=" => Some(Self::ZoomIn),
			"-" => Some(Self::ZoomOut),
			"r" | "R" => Some(Self::Reset),
			"f" | "F" => Some(Self::FitToView),
			_ => None,
		}
	}
}

/// All state of one open diagram.
pub struct PreviewState {
	pub transform: ViewTransform,
	pub labels: LabelVisibility,
	pub drag: DragState,
	pub config: StyleConfig,
	/// Last successfully parsed document.
	pub document: Option<FoldDocument>,
	/// Error banner text.
	pub error: Option<String>,
	pub width: f64,
	pub height: f64,
}

impl PreviewState {
	pub fn new(width: f64, height: f64, config: StyleConfig) -> Self {
		Self {
			transform: ViewTransform::IDENTITY,
			labels: LabelVisibility::default(),
			drag: DragState::default(),
			config,
			document: None,
			error: None,
			width,
			height,
		}
	}

	/// Display list for the current frame.
	pub fn render(&self) -> Vec<DrawOp> {
		render::render(self)
	}

	pub fn has_document(&self) -> bool {
		self.document.is_some()
	}

	/// Whether the loaded document has face data, gating the face-label toggle.
	pub fn has_faces(&self) -> bool {
		self.document.as_ref().is_some_and(FoldDocument::has_faces)
	}

	/// Returns true when a redraw is needed.
	pub fn resize(&mut self, width: f64, height: f64) -> bool {
		self.width = width;
		self.height = height;
		self.has_document()
	}

	pub fn begin_drag(&mut self, x: f64, y: f64) {
		self.drag = DragState {
			active: true,
			last_x: x,
			last_y: y,
		};
	}

	/// Pans by the distance since the previous move; returns true if dragging.
	pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
		if !self.drag.active {
			return false;
		}
		let (dx, dy) = (x - self.drag.last_x, y - self.drag.last_y);
		self.drag.last_x = x;
		self.drag.last_y = y;
		self.pan(dx, dy);
		true
	}

	pub fn end_drag(&mut self) {
		self.drag.active = false;
	}

	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.transform.pan_by(dx, dy);
	}

	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		self.transform.zoom_at(anchor, factor);
		debug!("zoom {:.3} at ({:.1}, {:.1})", self.transform.zoom, anchor.x, anchor.y);
	}

	pub fn zoom_centered(&mut self, factor: f64) {
		self.zoom_at(Point::new(self.width / 2.0, self.height / 2.0), factor);
	}

	/// Zooms for one wheel event at the cursor; returns false for a zero delta.
	pub fn wheel(&mut self, anchor: Point, delta_y: f64) -> bool {
		if delta_y == 0.0 || delta_y.is_nan() {
			return false;
		}
		let factor = 1.0 - delta_y.signum() * self.config.canvas.zoom_speed;
		self.zoom_at(anchor, factor);
		true
	}

	pub fn reset(&mut self) {
		self.transform.reset();
	}

	/// The base fit already frames the document, so fitting clears the user adjustment.
	pub fn fit_to_view(&mut self) {
		self.reset();
	}

	pub fn command(&mut self, command: Command) {
		match command {
			Command::ZoomIn => self.zoom_centered(ZOOM_IN_FACTOR),
			Command::ZoomOut => self.zoom_centered(ZOOM_OUT_FACTOR),
			Command::Reset => self.reset(),
			Command::FitToView => self.fit_to_view(),
		}
	}

	/// Sets a label toggle. Face labels stay off without face data.
	pub fn set_label(&mut self, kind: LabelKind, on: bool) {
		match kind {
			LabelKind::Vertex => self.labels.vertices = on,
			LabelKind::Edge => self.labels.edges = on,
			LabelKind::Face => self.labels.faces = on && self.has_faces(),
		}
	}

	/// Replaces the style configuration wholesale.
	pub fn set_config(&mut self, config: StyleConfig) {
		self.config = config;
	}

	/// Shows `message` in the banner, keeping the last diagram.
	pub fn show_error(&mut self, message: impl Into<String>) {
		let message = message.into();
		warn!("{message}");
		self.error = Some(message);
	}

	/// Parses document text. Returns true when a redraw is needed.
	pub fn load_text(&mut self, text: &str) -> bool {
		self.accept(FoldDocument::parse(text))
	}

	/// Validates an already decoded document. Returns true when a redraw is needed.
	pub fn load_value(&mut self, value: Value) -> bool {
		self.accept(FoldDocument::from_value(value).map_err(FoldError::from))
	}

	fn accept(&mut self, result: Result<FoldDocument, FoldError>) -> bool {
		match result {
			Ok(doc) => {
				let dangling = doc.dangling_references();
				if dangling > 0 {
					warn!("{dangling} references to missing vertices will be skipped");
				}
				info!(
					"Loaded FOLD document: {} vertices, {} edges",
					doc.vertices.len(),
					doc.edges.len()
				);
				self.document = Some(doc);
				self.error = None;
			}
			Err(err) if err.is_missing_required() => {
				debug!("{err}; nothing to draw");
				self.document = None;
				self.error = None;
			}
			Err(err) => {
				self.show_error(err.to_string());
				return false;
			}
		}
		if !self.has_faces() {
			self.labels.faces = false;
		}
		true
	}

	/// Applies a host message. Returns true when a redraw is needed.
	pub fn apply(&mut self, message: HostMessage) -> bool {
		match message {
			HostMessage::Update { content, config } => {
				// A new style repaints the last good document even if this one is rejected.
				let restyled = config.is_some();
				if let Some(config) = config {
					self.set_config(config);
				}
				let loaded = match content {
					Value::String(text) => self.load_text(&text),
					value => self.load_value(value),
				};
				loaded || restyled
			}
			HostMessage::ConfigUpdate { config } => {
				self.set_config(config);
				true
			}
			HostMessage::Error { content } => {
				self.show_error(content);
				false
			}
		}
	}
}

/// Canvas size inside a container, leaving room for the controls and legend.
pub fn canvas_size(container_w: f64, container_h: f64, controls_h: f64, legend_h: f64) -> (f64, f64) {
	(
		(container_w - FIXED_PADDING).max(1.0),
		(container_h - controls_h - legend_h).max(1.0),
	)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn triangle() -> &'static str {
		r#"{"vertices_coords":[[0,0],[1,0],[1,1]],
		    "edges_vertices":[[0,1],[1,2],[2,0]],
		    "edges_assignment":["B","M","V"]}"#
	}

	fn loaded() -> PreviewState {
		let mut state = PreviewState::new(800.0, 600.0, StyleConfig::default());
		assert!(state.load_text(triangle()));
		state
	}

	#[test]
	fn drag_pans_by_incremental_deltas() {
		let mut state = loaded();
		assert!(!state.drag_to(50.0, 50.0));
		state.begin_drag(10.0, 10.0);
		assert!(state.drag_to(15.0, 12.0));
		assert!(state.drag_to(25.0, 20.0));
		state.end_drag();
		assert!(!state.drag_to(100.0, 100.0));
		assert_eq!(state.transform.pan, Point::new(15.0, 10.0));
	}

	#[test]
	fn reset_after_any_history() {
		let mut state = loaded();
		state.begin_drag(0.0, 0.0);
		state.drag_to(30.0, -4.0);
		state.command(Command::ZoomIn);
		state.wheel(Point::new(3.0, 9.0), -120.0);
		state.command(Command::Reset);
		assert_eq!(state.transform, ViewTransform::IDENTITY);

		state.command(Command::ZoomOut);
		state.command(Command::FitToView);
		assert_eq!(state.transform, ViewTransform::IDENTITY);
	}

	#[test]
	fn button_zoom_anchors_at_center() {
		let mut state = loaded();
		let center = Point::new(400.0, 300.0);
		let before = state.transform.screen_to_fitted(center);
		state.command(Command::ZoomIn);
		let after = state.transform.fitted_to_screen(before);
		assert!((after.x - center.x).abs() < 1e-9);
		assert!((after.y - center.y).abs() < 1e-9);
		assert!((state.transform.zoom - 1.2).abs() < 1e-12);
	}

	#[test]
	fn wheel_uses_zoom_speed() {
		let mut state = loaded();
		state.config.canvas.zoom_speed = 0.25;
		assert!(state.wheel(Point::new(0.0, 0.0), -3.0));
		assert!((state.transform.zoom - 1.25).abs() < 1e-12);
		assert!(state.wheel(Point::new(0.0, 0.0), 40.0));
		assert!((state.transform.zoom - 0.9375).abs() < 1e-12);
		assert!(!state.wheel(Point::new(0.0, 0.0), 0.0));
	}

	#[test]
	fn key_bindings() {
		assert_eq!(Command::from_key("="), Some(Command::ZoomIn));
		assert_eq!(Command::from_key("+"), Some(Command::ZoomIn));
		assert_eq!(Command::from_key("-"), Some(Command::ZoomOut));
		assert_eq!(Command::from_key("R"), Some(Command::Reset));
		assert_eq!(Command::from_key("f"), Some(Command::FitToView));
		assert_eq!(Command::from_key("x"), None);
	}

	#[test]
	fn parse_error_keeps_last_document() {
		let mut state = loaded();
		assert!(!state.load_text("{invalid"));
		assert!(state.has_document());
		assert!(state.error.as_deref().unwrap().starts_with("Error parsing FOLD data"));

		assert!(state.load_text(triangle()));
		assert!(state.error.is_none());
	}

	#[test]
	fn parse_error_before_any_document_stays_blank() {
		let mut state = PreviewState::new(100.0, 100.0, StyleConfig::default());
		assert!(!state.load_text("{invalid"));
		assert!(!state.has_document());
		assert_eq!(state.render().len(), 2);
	}

	#[test]
	fn host_error_is_verbatim_and_keeps_document() {
		let mut state = loaded();
		let redraw = state.apply(HostMessage::Error {
			content: "Invalid JSON format".into(),
		});
		assert!(!redraw);
		assert_eq!(state.error.as_deref(), Some("Invalid JSON format"));
		assert!(state.has_document());
	}

	#[test]
	fn update_accepts_text_or_object_and_config() {
		let mut state = PreviewState::new(100.0, 100.0, StyleConfig::default());
		let mut config = StyleConfig::default();
		config.colors.boundary = "purple".into();
		assert!(state.apply(HostMessage::Update {
			content: json!({"vertices_coords": [[0, 0]], "edges_vertices": []}),
			config: Some(config.clone()),
		}));
		assert_eq!(state.config, config);
		assert_eq!(state.document.as_ref().unwrap().vertices.len(), 1);

		assert!(state.apply(HostMessage::ConfigUpdate {
			config: StyleConfig::default()
		}));
		assert_eq!(state.config.colors.boundary, "black");
		assert!(state.has_document());
	}

	#[test]
	fn new_config_with_bad_document_repaints_last_frame() {
		let mut state = loaded();
		let mut config = StyleConfig::default();
		config.colors.mountain = "green".into();
		assert!(state.apply(HostMessage::Update {
			content: json!("{invalid"),
			config: Some(config.clone()),
		}));
		assert_eq!(state.config, config);
		assert!(state.has_document());
		assert!(state.error.is_some());

		// Without a config the rejected update changes nothing on the canvas.
		assert!(!state.apply(HostMessage::Update {
			content: json!("{invalid"),
			config: None,
		}));
	}

	#[test]
	fn negative_vertex_ids_skip_only_their_element() {
		let mut state = PreviewState::new(800.0, 600.0, StyleConfig::default());
		assert!(state.load_value(json!({
			"vertices_coords": [[0, 0], [1, 0], [1, 1]],
			"edges_vertices": [[0, 1], [1, 2], [2, -1]],
			"faces_vertices": [[0, 1, -1]]
		})));
		assert!(state.error.is_none());
		assert!(state.has_faces());
		assert_eq!(state.document.as_ref().unwrap().edges.len(), 3);
	}

	#[test]
	fn repeated_zoom_out_stays_drawable() {
		let mut state = loaded();
		for _ in 0..4000 {
			state.command(Command::ZoomOut);
		}
		let t = state.transform;
		assert!(t.zoom > 0.0 && t.pan.x.is_finite() && t.pan.y.is_finite());
	}

	#[test]
	fn face_toggle_requires_faces() {
		let mut state = loaded();
		state.set_label(LabelKind::Face, true);
		assert!(!state.labels.faces);
		assert!(!state.has_faces());

		state.load_value(json!({
			"vertices_coords": [[0, 0], [1, 0], [0, 1]],
			"edges_vertices": [],
			"faces_vertices": [[0, 1, 2]]
		}));
		state.set_label(LabelKind::Face, true);
		assert!(state.labels.faces);

		// Face data disappears: the toggle is forced off.
		state.load_text(triangle());
		assert!(!state.labels.faces);
	}

	#[test]
	fn resize_keeps_view_and_reports_redraw() {
		let mut empty = PreviewState::new(10.0, 10.0, StyleConfig::default());
		assert!(!empty.resize(20.0, 20.0));

		let mut state = loaded();
		state.pan(5.0, 5.0);
		assert!(state.resize(1024.0, 768.0));
		assert_eq!((state.width, state.height), (1024.0, 768.0));
		assert_eq!(state.transform.pan, Point::new(5.0, 5.0));
	}

	#[test]
	fn canvas_size_subtracts_chrome() {
		assert_eq!(canvas_size(840.0, 700.0, 40.0, 60.0), (800.0, 600.0));
		assert_eq!(canvas_size(10.0, 10.0, 40.0, 60.0), (1.0, 1.0));
	}
}
