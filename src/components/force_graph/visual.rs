//! Per-frame visual state.
//!
//! [`Frame::project`] turns the simulation, the exit scene and the options into
//! plain records; the renderer only draws what it is handed.

use super::config::{Dimming, GraphConfig, Options};
use super::focus::FocusState;
use super::reconcile::Scene;
use super::simulation::Simulation;

/// Gap between a node's edge and its label.
const LABEL_GAP: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub key: String,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: String,
	pub opacity: f64,
	/// Color multiplier; 1 is the node's own color.
	pub brightness: f64,
	pub state: FocusState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkVisual {
	pub key: String,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub width: f64,
	pub color: String,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelVisual {
	pub key: String,
	pub text: String,
	pub x: f64,
	pub y: f64,
	pub size: f64,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipVisual {
	pub html: String,
	/// Left edge relative to the surface.
	pub x: f64,
	/// Top edge relative to the surface.
	pub y: f64,
	pub opacity: f64,
}

/// Everything drawn in one frame, back to front: links, nodes, labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	pub width: f64,
	pub height: f64,
	pub links: Vec<LinkVisual>,
	pub nodes: Vec<NodeVisual>,
	pub labels: Vec<LabelVisual>,
	pub tooltip: Option<TooltipVisual>,
}

/// Opacity, brightness and label size for a focus state.
fn emphasis(state: FocusState, opts: &Options) -> (f64, f64, f64) {
	if state.is_focused() {
		return (opts.focus_opacity, 1.0, opts.focus_label_size);
	}
	match opts.dimming {
		Dimming::Opacity => (opts.unfocus_opacity, 1.0, opts.unfocus_label_size),
		Dimming::Brightness => (opts.focus_opacity, opts.unfocus_brightness, opts.unfocus_label_size),
	}
}

impl Frame {
	/// Projects live and exiting entities at `now_ms`. The tooltip is left
	/// empty for the caller to fill.
	pub fn project(sim: &Simulation, scene: &Scene, config: &GraphConfig, now_ms: f64) -> Self {
		let opts = &config.options;
		let mut frame = Frame {
			width: opts.width,
			height: opts.height,
			..Frame::default()
		};
		let nodes = sim.nodes();

		for exit in &scene.exiting_links {
			let fade = exit.transition.value(now_ms);
			let source = sim.node(&exit.source_key).map_or(exit.source_pos, |n| (n.x, n.y));
			let target = sim.node(&exit.target_key).map_or(exit.target_pos, |n| (n.x, n.y));
			frame.links.push(LinkVisual {
				key: exit.link.key.clone(),
				x1: source.0,
				y1: source.1,
				x2: target.0,
				y2: target.1,
				width: exit.link.width,
				color: config.link_color(&exit.link.data),
				opacity: fade,
			});
		}
		for link in sim.links() {
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let fade = link.enter.map_or(1.0, |e| e.value(now_ms));
			frame.links.push(LinkVisual {
				key: link.key.clone(),
				x1: s.x,
				y1: s.y,
				x2: t.x,
				y2: t.y,
				width: link.width * fade,
				color: config.link_color(&link.data),
				opacity: fade,
			});
		}

		for exit in &scene.exiting_nodes {
			let node = &exit.node;
			let scale = exit.transition.value(now_ms);
			let state = node.focus_state();
			let (opacity, brightness, size) = emphasis(state, opts);
			let radius = config.radius(&node.data) * scale;
			frame.nodes.push(NodeVisual {
				key: node.key.clone(),
				x: node.x,
				y: node.y,
				radius,
				color: config.node_color(&node.data),
				opacity,
				brightness,
				state,
			});
			if opts.show_labels {
				frame.labels.push(LabelVisual {
					key: node.key.clone(),
					text: node.data.label.clone().unwrap_or_else(|| node.key.clone()),
					x: node.x + radius + LABEL_GAP,
					y: node.y,
					size,
					opacity: opacity * scale,
				});
			}
		}
		for node in nodes {
			let grow = node.enter.map_or(1.0, |t| t.value(now_ms));
			let state = node.focus_state();
			let (opacity, brightness, size) = emphasis(state, opts);
			let radius = config.radius(&node.data) * grow;
			frame.nodes.push(NodeVisual {
				key: node.key.clone(),
				x: node.x,
				y: node.y,
				radius,
				color: config.node_color(&node.data),
				opacity,
				brightness,
				state,
			});
			if opts.show_labels {
				frame.labels.push(LabelVisual {
					key: node.key.clone(),
					text: node.data.label.clone().unwrap_or_else(|| node.key.clone()),
					x: node.x + radius + LABEL_GAP,
					y: node.y,
					size,
					opacity: opacity * grow,
				});
			}
		}

		frame
	}

	pub fn node(&self, key: &str) -> Option<&NodeVisual> {
		self.nodes.iter().rev().find(|n| n.key == key)
	}

	pub fn link(&self, key: &str) -> Option<&LinkVisual> {
		self.links.iter().rev().find(|l| l.key == key)
	}
}
