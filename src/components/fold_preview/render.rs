//! Builds the display list for one frame of the crease pattern.
//!
//! Coordinates are mapped through [`BaseFit`] here; the user's pan and zoom
//! are emitted as a canvas-level transform, so every pixel-sized quantity is
//! divided by `zoom` before it is recorded.

use super::config::{LineStyle, StyleConfig};
use super::document::{Assignment, FoldDocument};
use super::state::{LabelVisibility, PreviewState};
use super::transform::{BaseFit, Bounds, Point, ViewTransform};

/// Stroke parameters for one path.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	pub color: String,
	pub width: f64,
	pub dash: Vec<f64>,
}

/// A filled, bordered circle with centered text.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelOp {
	pub center: Point,
	pub radius: f64,
	pub fill: String,
	pub border: String,
	pub border_width: f64,
	pub text: String,
	pub font_size: f64,
	pub text_color: String,
}

/// One drawing command. Painters replay these in order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
	Clear { width: f64, height: f64 },
	FillRect { width: f64, height: f64, color: String },
	Save,
	Restore,
	Translate(Point),
	Scale(f64),
	/// All segments form a single path stroked once.
	StrokeSegments {
		segments: Vec<(Point, Point)>,
		stroke: Stroke,
	},
	/// All circles form a single path filled once.
	FillCircles {
		centers: Vec<Point>,
		radius: f64,
		color: String,
	},
	Label(LabelOp),
}

/// Dash pattern for `style`, keeping dash density fixed in document space.
pub fn dash_pattern(style: LineStyle, zoom: f64) -> Vec<f64> {
	style.base_pattern().iter().map(|k| k / zoom).collect()
}

/// The stroke used for edges with `assignment` at `zoom`.
pub fn edge_stroke(config: &StyleConfig, assignment: Assignment, zoom: f64) -> Stroke {
	Stroke {
		color: config.color(assignment).to_owned(),
		width: config.line_styles.line_width / zoom,
		dash: dash_pattern(config.line_style(assignment), zoom),
	}
}

/// Renders the state's current document, or just the background if none.
pub fn render(state: &PreviewState) -> Vec<DrawOp> {
	let (width, height) = (state.width, state.height);
	let mut ops = vec![
		DrawOp::Clear { width, height },
		DrawOp::FillRect {
			width,
			height,
			color: state.config.canvas.background_color.clone(),
		},
	];
	if let Some(doc) = &state.document {
		draw_document(
			&mut ops,
			doc,
			&state.config,
			&state.transform,
			state.labels,
			width,
			height,
		);
	}
	ops
}

fn draw_document(
	ops: &mut Vec<DrawOp>,
	doc: &FoldDocument,
	config: &StyleConfig,
	view: &ViewTransform,
	labels: LabelVisibility,
	width: f64,
	height: f64,
) {
	let Some(bounds) = Bounds::of(&doc.vertices) else {
		return;
	};
	let fit = BaseFit::new(bounds, width, height, config.canvas.padding);
	let mapped: Vec<Point> = doc.vertices.iter().map(|&v| fit.map(v)).collect();
	let k = view.zoom;

	ops.push(DrawOp::Save);
	ops.push(DrawOp::Translate(view.pan));
	ops.push(DrawOp::Scale(k));

	for assignment in Assignment::ALL {
		let segments: Vec<(Point, Point)> = doc
			.edges
			.iter()
			.zip(&doc.assignments)
			.filter(|(_, a)| **a == Some(assignment))
			.filter_map(|(&[a, b], _)| Some((*mapped.get(a)?, *mapped.get(b)?)))
			.collect();
		if segments.is_empty() {
			continue;
		}
		ops.push(DrawOp::StrokeSegments {
			segments,
			stroke: edge_stroke(config, assignment, k),
		});
	}

	if config.vertices.show && !mapped.is_empty() {
		ops.push(DrawOp::FillCircles {
			centers: mapped.clone(),
			radius: config.vertices.radius / k,
			color: config.vertices.color.clone(),
		});
	}

	let style = &config.labels;
	let label = |anchor: Point, index: usize, fill: &str| {
		DrawOp::Label(LabelOp {
			center: Point::new(anchor.x, anchor.y + style.offset / k),
			radius: style.radius / k,
			fill: fill.to_owned(),
			border: style.border_color.clone(),
			border_width: style.border_width / k,
			text: index.to_string(),
			font_size: style.font_size / k,
			text_color: style.text_color.clone(),
		})
	};

	if labels.faces {
		for (index, face) in doc.faces.iter().flatten().enumerate() {
			if let Some(centroid) = centroid(face, &mapped) {
				ops.push(label(centroid, index, &style.face_color));
			}
		}
	}
	if labels.edges {
		for (index, &[a, b]) in doc.edges.iter().enumerate() {
			if let (Some(&p), Some(&q)) = (mapped.get(a), mapped.get(b)) {
				ops.push(label(p.midpoint(q), index, &style.edge_color));
			}
		}
	}
	if labels.vertices {
		for (index, &p) in mapped.iter().enumerate() {
			ops.push(label(p, index, &style.vertex_color));
		}
	}

	ops.push(DrawOp::Restore);
}

/// Mean of the face's vertices; `None` if empty or any id is out of range.
fn centroid(face: &[usize], mapped: &[Point]) -> Option<Point> {
	if face.is_empty() {
		return None;
	}
	let (mut sx, mut sy) = (0.0, 0.0);
	for &id in face {
		let p = mapped.get(id)?;
		sx += p.x;
		sy += p.y;
	}
	let n = face.len() as f64;
	Some(Point::new(sx / n, sy / n))
}
