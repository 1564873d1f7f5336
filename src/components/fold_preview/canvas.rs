use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::render::{DrawOp, LabelOp, Stroke};

/// Replays a display list onto a 2D canvas context.
pub fn paint(ctx: &CanvasRenderingContext2d, ops: &[DrawOp]) {
	for op in ops {
		match op {
			DrawOp::Clear { width, height } => ctx.clear_rect(0.0, 0.0, *width, *height),
			DrawOp::FillRect {
				width,
				height,
				color,
			} => {
				ctx.set_fill_style_str(color);
				ctx.fill_rect(0.0, 0.0, *width, *height);
			}
			DrawOp::Save => ctx.save(),
			DrawOp::Restore => ctx.restore(),
			DrawOp::Translate(p) => {
				let _ = ctx.translate(p.x, p.y);
			}
			DrawOp::Scale(k) => {
				let _ = ctx.scale(*k, *k);
			}
			DrawOp::StrokeSegments { segments, stroke } => {
				apply_stroke(ctx, stroke);
				ctx.begin_path();
				for (a, b) in segments {
					ctx.move_to(a.x, a.y);
					ctx.line_to(b.x, b.y);
				}
				ctx.stroke();
				let _ = ctx.set_line_dash(&js_sys::Array::new());
			}
			DrawOp::FillCircles {
				centers,
				radius,
				color,
			} => {
				ctx.set_fill_style_str(color);
				ctx.begin_path();
				for c in centers {
					ctx.move_to(c.x + radius, c.y);
					let _ = ctx.arc(c.x, c.y, *radius, 0.0, 2.0 * PI);
				}
				ctx.fill();
			}
			DrawOp::Label(label) => draw_label(ctx, label),
		}
	}
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
	ctx.set_stroke_style_str(&stroke.color);
	ctx.set_line_width(stroke.width);
	ctx.set_line_cap("round");
	let dash = stroke
		.dash
		.iter()
		.map(|&d| JsValue::from_f64(d))
		.collect::<js_sys::Array>();
	let _ = ctx.set_line_dash(&dash);
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &LabelOp) {
	let LabelOp { center, radius, .. } = label;
	ctx.begin_path();
	let _ = ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&label.fill);
	ctx.fill();
	ctx.set_stroke_style_str(&label.border);
	ctx.set_line_width(label.border_width);
	ctx.stroke();

	ctx.set_fill_style_str(&label.text_color);
	ctx.set_font(&format!("{}px sans-serif", label.font_size));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&label.text, center.x, center.y);
}
