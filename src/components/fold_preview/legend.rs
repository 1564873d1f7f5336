//! Legend entries describing the active line styles and label colors.

use super::config::StyleConfig;
use super::document::{Assignment, FoldDocument};
use super::render::{Stroke, edge_stroke};

#[derive(Clone, Debug, PartialEq)]
pub enum Swatch {
	/// A short line stroked exactly like the diagram's edges at zoom 1.
	Line(Stroke),
	/// A sample label circle.
	Label {
		fill: String,
		border: String,
		border_width: f64,
		radius: f64,
		text: &'static str,
		text_color: String,
		font_size: f64,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub name: &'static str,
	pub swatch: Swatch,
}

impl LegendEntry {
	/// SVG `stroke-dasharray` value for line swatches; `none` when solid.
	pub fn dash_array(&self) -> String {
		match &self.swatch {
			Swatch::Line(stroke) if !stroke.dash.is_empty() => stroke
				.dash
				.iter()
				.map(f64::to_string)
				.collect::<Vec<_>>()
				.join(","),
			_ => "none".to_owned(),
		}
	}
}

/// Builds the legend for `config`, adding face labels only when `document` has face data.
pub fn build(config: &StyleConfig, document: Option<&FoldDocument>) -> Vec<LegendEntry> {
	let mut entries: Vec<LegendEntry> = Assignment::ALL
		.into_iter()
		.map(|a| LegendEntry {
			name: a.label(),
			swatch: Swatch::Line(edge_stroke(config, a, 1.0)),
		})
		.collect();

	let labels = &config.labels;
	let label = |name, fill: &str, text| LegendEntry {
		name,
		swatch: Swatch::Label {
			fill: fill.to_owned(),
			border: labels.border_color.clone(),
			border_width: labels.border_width,
			radius: labels.radius,
			text,
			text_color: labels.text_color.clone(),
			font_size: labels.font_size,
		},
	};

	entries.push(label("Vertex Labels", &labels.vertex_color, "0"));
	entries.push(label("Edge Labels", &labels.edge_color, "1"));
	if document.is_some_and(FoldDocument::has_faces) {
		entries.push(label("Face Labels", &labels.face_color, "2"));
	}
	entries
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn names(entries: &[LegendEntry]) -> Vec<&'static str> {
		entries.iter().map(|e| e.name).collect()
	}

	fn doc(value: serde_json::Value) -> FoldDocument {
		FoldDocument::from_value(value).unwrap()
	}

	#[test]
	fn always_lists_lines_and_point_labels() {
		let entries = build(&StyleConfig::default(), None);
		assert_eq!(
			names(&entries),
			vec![
				"Boundary",
				"Mountain",
				"Valley",
				"Flat",
				"Unassigned",
				"Vertex Labels",
				"Edge Labels"
			]
		);
	}

	#[test]
	fn face_entry_gates_on_array_presence() {
		let config = StyleConfig::default();
		let with_empty = doc(json!({
			"vertices_coords": [], "edges_vertices": [], "faces_vertices": []
		}));
		assert!(names(&build(&config, Some(&with_empty))).contains(&"Face Labels"));

		let without = doc(json!({ "vertices_coords": [], "edges_vertices": [] }));
		assert!(!names(&build(&config, Some(&without))).contains(&"Face Labels"));
	}

	#[test]
	fn swatches_match_renderer_strokes() {
		let mut config = StyleConfig::default();
		config.line_styles.line_width = 3.0;
		let entries = build(&config, None);
		for (entry, a) in entries.iter().zip(Assignment::ALL) {
			assert_eq!(entry.swatch, Swatch::Line(edge_stroke(&config, a, 1.0)));
		}
		assert_eq!(entries[0].dash_array(), "none");
		assert_eq!(entries[1].dash_array(), "5,5,1,5");
		assert_eq!(entries[2].dash_array(), "5,5");
	}

	#[test]
	fn label_swatches_use_category_colors() {
		let entries = build(&StyleConfig::default(), None);
		let Swatch::Label { fill, text, .. } = &entries[5].swatch else {
			panic!("expected label swatch");
		};
		assert_eq!(fill, "#ffe08a");
		assert_eq!(*text, "0");
	}
}
