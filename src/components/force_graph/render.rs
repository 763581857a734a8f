//! Canvas rendering of a [`Frame`].
//!
//! Draw order is back to front: background, links, nodes, labels. The tooltip
//! is HTML and lives outside the canvas.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::focus::FocusState;
use super::theme::{self, Theme};
use super::visual::{Frame, LabelVisual, LinkVisual, NodeVisual};

/// Renders the complete frame to the canvas.
pub fn render(frame: &Frame, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(frame, ctx, theme);
	for link in &frame.links {
		draw_link(ctx, link);
	}
	for node in &frame.nodes {
		draw_node(ctx, node, theme);
	}
	for label in &frame.labels {
		draw_label(ctx, label, theme);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_background(frame: &Frame, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (frame.width, frame.height);
	let gradient = theme
		.background
		.use_gradient
		.then(|| ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8).ok())
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.set_global_alpha(1.0);
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkVisual) {
	if link.opacity <= 0.0 || link.width <= 0.0 {
		return;
	}
	ctx.set_global_alpha(link.opacity.min(1.0));
	ctx.set_stroke_style_str(&link.color);
	ctx.set_line_width(link.width);
	ctx.begin_path();
	ctx.move_to(link.x1, link.y1);
	ctx.line_to(link.x2, link.y2);
	ctx.stroke();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeVisual, theme: &Theme) {
	if node.radius <= 0.0 {
		return;
	}
	ctx.set_global_alpha(node.opacity.clamp(0.0, 1.0));
	ctx.set_fill_style_str(&theme::dimmed_css(&node.color, node.brightness));
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
	ctx.fill();

	let ring = &theme.node;
	if node.state == FocusState::Pinned && ring.focus_ring_width > 0.0 {
		ctx.set_stroke_style_str(&ring.focus_ring_color.to_css());
		ctx.set_line_width(ring.focus_ring_width);
		ctx.stroke();
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &LabelVisual, theme: &Theme) {
	if label.opacity <= 0.0 {
		return;
	}
	let style = &theme.node;
	ctx.set_global_alpha(label.opacity.clamp(0.0, 1.0));
	ctx.set_fill_style_str(&style.label_color.to_css());
	ctx.set_font(&format!("{}px {}", label.size, style.label_font));
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&label.text, label.x, label.y);
}
