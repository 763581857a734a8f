//! Pointer interaction: hover, click-to-pin, drag and the tooltip.
//!
//! Node-level handlers (`hover_node`, `click_node`, `drag_*`) carry the
//! behavior. The `pointer_*` entry points hit-test surface coordinates and
//! dispatch to them, so a host without its own hit testing only forwards raw
//! pointer positions.

use std::collections::HashSet;

use log::debug;

use super::config::{GraphConfig, Options};
use super::focus;
use super::simulation::Simulation;
use super::transition::Transition;
use super::visual::TooltipVisual;

/// Fading HTML tooltip anchored near the pointer.
#[derive(Clone, Debug)]
pub struct Tooltip {
	pub html: String,
	pub x: f64,
	pub y: f64,
	fade: Transition,
}

impl Default for Tooltip {
	fn default() -> Self {
		Self {
			html: String::new(),
			x: 0.0,
			y: 0.0,
			fade: Transition::new(0.0, 0.0, 0.0, 0.0),
		}
	}
}

impl Tooltip {
	/// Places the tooltip at the pointer plus the configured offsets.
	pub fn move_to(&mut self, x: f64, y: f64, opts: &Options) {
		self.x = x + opts.tooltip_x_offset;
		self.y = y + opts.tooltip_y_offset;
	}

	pub fn show(&mut self, html: String, now_ms: f64, opts: &Options) {
		self.html = html;
		self.fade = self.fade.retarget(opts.tooltip_opacity, now_ms, opts.tooltip_fade_in);
	}

	pub fn hide(&mut self, now_ms: f64, opts: &Options) {
		self.fade = self.fade.retarget(0.0, now_ms, opts.tooltip_fade_out);
	}

	pub fn opacity(&self, now_ms: f64) -> f64 {
		self.fade.value(now_ms)
	}

	/// The tooltip as drawn at `now_ms`, `None` once fully faded out.
	pub fn visual(&self, now_ms: f64) -> Option<TooltipVisual> {
		let opacity = self.opacity(now_ms);
		if opacity <= 0.0 && self.fade.is_finished(now_ms) {
			return None;
		}
		Some(TooltipVisual {
			html: self.html.clone(),
			x: self.x,
			y: self.y,
			opacity,
		})
	}
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub key: String,
	/// Pointer position at press.
	pub press_x: f64,
	pub press_y: f64,
	/// Pointer minus node centre at press; kept while dragging.
	pub grab_dx: f64,
	pub grab_dy: f64,
	/// Set on the first move; a moved drag does not end in a click.
	pub moved: bool,
}

/// Routes pointer input to the focus machine, the simulation and the tooltip.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	pub tooltip: Tooltip,
	hovered: Option<String>,
	drag: Option<DragState>,
}

impl InteractionController {
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn drag(&self) -> Option<&DragState> {
		self.drag.as_ref()
	}

	/// Key of the topmost node within its radius plus `hit_padding` of `(x, y)`.
	pub fn hit_test(sim: &Simulation, config: &GraphConfig, x: f64, y: f64) -> Option<String> {
		let pad = config.options.hit_padding;
		sim.nodes()
			.iter()
			.rev()
			.find(|node| {
				let r = config.radius(&node.data) + pad;
				let (dx, dy) = (node.x - x, node.y - y);
				dx * dx + dy * dy <= r * r
			})
			.map(|node| node.key.clone())
	}

	/// Pointer entered node `key` at `(x, y)`: show its tooltip and focus it.
	pub fn hover_node(&mut self, sim: &mut Simulation, config: &GraphConfig, key: &str, x: f64, y: f64, now_ms: f64) {
		let Some(node) = sim.node(key) else {
			return;
		};
		let opts = &config.options;
		let html = config.tooltip_html(&node.data, key);
		self.tooltip.move_to(x, y, opts);
		self.tooltip.show(html, now_ms, opts);
		self.hovered = Some(key.to_string());
		focus::focus(sim, key, config);
	}

	/// Pointer left node `key`. A pinned node keeps its tooltip and focus.
	pub fn leave_node(&mut self, sim: &mut Simulation, config: &GraphConfig, key: &str, now_ms: f64) {
		if self.hovered.as_deref() == Some(key) {
			self.hovered = None;
		}
		let pinned = sim.node(key).is_some_and(|n| n.clicked);
		if !pinned {
			self.tooltip.hide(now_ms, &config.options);
			focus::unfocus(sim, key, config);
		}
	}

	/// Toggles the pin on `key`. Unpinning also hides the tooltip.
	pub fn click_node(&mut self, sim: &mut Simulation, config: &GraphConfig, key: &str, now_ms: f64) {
		if focus::toggle_pin(sim, key, config) == Some(false) {
			self.tooltip.hide(now_ms, &config.options);
		}
	}

	/// Pins `key` where it is and warms the simulation. `(x, y)` is the
	/// pointer at press.
	pub fn drag_start(&mut self, sim: &mut Simulation, config: &GraphConfig, key: &str, x: f64, y: f64) {
		let Some(node) = sim.node_mut(key) else {
			return;
		};
		node.fx = Some(node.x);
		node.fy = Some(node.y);
		let (grab_dx, grab_dy) = (x - node.x, y - node.y);
		sim.set_alpha_target(config.options.drag_alpha_target);
		sim.restart();
		self.drag = Some(DragState {
			key: key.to_string(),
			press_x: x,
			press_y: y,
			grab_dx,
			grab_dy,
			moved: false,
		});
		debug!("drag start on {key}");
	}

	/// Moves the dragged node with the pointer at `(x, y)`, keeping the grab
	/// offset; the tooltip follows the pointer.
	pub fn drag_move(&mut self, sim: &mut Simulation, config: &GraphConfig, x: f64, y: f64) {
		let Some(drag) = self.drag.as_mut() else {
			return;
		};
		let Some(node) = sim.node_mut(&drag.key) else {
			self.drag = None;
			return;
		};
		node.fx = Some(x - drag.grab_dx);
		node.fy = Some(y - drag.grab_dy);
		drag.moved = true;
		self.tooltip.move_to(x, y, &config.options);
	}

	/// Releases the pin and lets the simulation cool. Returns the finished drag.
	pub fn drag_end(&mut self, sim: &mut Simulation) -> Option<DragState> {
		let drag = self.drag.take()?;
		if let Some(node) = sim.node_mut(&drag.key) {
			node.fx = None;
			node.fy = None;
		}
		sim.set_alpha_target(0.0);
		Some(drag)
	}

	pub fn pointer_down(&mut self, sim: &mut Simulation, config: &GraphConfig, x: f64, y: f64) {
		if let Some(key) = Self::hit_test(sim, config, x, y) {
			self.drag_start(sim, config, &key, x, y);
		}
	}

	pub fn pointer_move(&mut self, sim: &mut Simulation, config: &GraphConfig, x: f64, y: f64, now_ms: f64) {
		if let Some(drag) = &self.drag {
			if drag.moved || (drag.press_x, drag.press_y) != (x, y) {
				self.drag_move(sim, config, x, y);
			}
			return;
		}
		let hit = Self::hit_test(sim, config, x, y);
		if hit == self.hovered {
			return;
		}
		if let Some(old) = self.hovered.take() {
			self.leave_node(sim, config, &old, now_ms);
		}
		if let Some(key) = hit {
			self.hover_node(sim, config, &key, x, y, now_ms);
		}
	}

	/// Ends a drag; a press that never moved counts as a click.
	pub fn pointer_up(&mut self, sim: &mut Simulation, config: &GraphConfig, now_ms: f64) {
		if let Some(drag) = self.drag_end(sim) {
			if !drag.moved {
				self.click_node(sim, config, &drag.key, now_ms);
			}
		}
	}

	pub fn pointer_leave_surface(&mut self, sim: &mut Simulation, config: &GraphConfig, now_ms: f64) {
		self.drag_end(sim);
		if let Some(old) = self.hovered.take() {
			self.leave_node(sim, config, &old, now_ms);
		}
	}

	/// Releases interaction state held by nodes outside `keep` before they
	/// leave the simulation: a hovered node is left, a pinned one unpinned and
	/// a dragged one dropped, so their neighbors return to their baseline.
	pub fn release_missing(&mut self, sim: &mut Simulation, config: &GraphConfig, keep: &HashSet<String>, now_ms: f64) {
		if self.drag.as_ref().is_some_and(|d| !keep.contains(&d.key)) {
			self.drag_end(sim);
		}
		if let Some(old) = self.hovered.clone().filter(|k| !keep.contains(k)) {
			self.leave_node(sim, config, &old, now_ms);
		}
		let pinned: Vec<String> = sim
			.nodes()
			.iter()
			.filter(|n| n.clicked && !keep.contains(&n.key))
			.map(|n| n.key.clone())
			.collect();
		for key in pinned {
			debug!("unpinning exiting node {key}");
			self.click_node(sim, config, &key, now_ms);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::focus::FocusState;
	use crate::components::force_graph::simulation::{Link, Node};
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	/// a(100,100) - b(200,100) - c(300,100)
	fn line() -> Simulation {
		let nodes = ["a", "b", "c"]
			.iter()
			.enumerate()
			.map(|(i, k)| Node::new(*k, GraphNode::new(*k), 100.0 * (i + 1) as f64, 100.0))
			.collect();
		let links = vec![
			Link::new("a-b", GraphLink::new("a", "b"), 0, 1, 0.5),
			Link::new("b-c", GraphLink::new("b", "c"), 1, 2, 0.5),
		];
		let mut sim = Simulation::new(1, 0.9);
		sim.set_data(nodes, links);
		sim
	}

	fn state(sim: &Simulation, key: &str) -> FocusState {
		sim.node(key).unwrap().focus_state()
	}

	#[test]
	fn hit_test_uses_radius_and_padding() {
		let config = GraphConfig::default();
		let sim = line();
		assert_eq!(InteractionController::hit_test(&sim, &config, 208.0, 100.0).as_deref(), Some("b"));
		assert_eq!(InteractionController::hit_test(&sim, &config, 210.0, 100.0), None);
		assert_eq!(InteractionController::hit_test(&sim, &config, 150.0, 150.0), None);
	}

	#[test]
	fn topmost_node_wins() {
		let config = GraphConfig::default();
		let mut sim = line();
		sim.nodes_mut()[2].x = 200.0;
		assert_eq!(InteractionController::hit_test(&sim, &config, 200.0, 100.0).as_deref(), Some("c"));
	}

	#[test]
	fn tooltip_fades_in_and_out() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();
		assert!(ui.tooltip.visual(0.0).is_none());

		ui.pointer_move(&mut sim, &config, 100.0, 100.0, 1000.0);
		assert_eq!(ui.hovered(), Some("a"));
		let shown = ui.tooltip.visual(1200.0).unwrap();
		assert_eq!(shown.opacity, 0.9);
		assert_eq!(shown.html, "a");
		assert_eq!((shown.x, shown.y), (116.0, 124.0));

		ui.pointer_move(&mut sim, &config, 150.0, 150.0, 2000.0);
		assert_eq!(ui.hovered(), None);
		assert!(ui.tooltip.opacity(2250.0) > 0.0);
		assert!(ui.tooltip.visual(2500.0).is_none());
	}

	#[test]
	fn hover_leave_scenario() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_move(&mut sim, &config, 200.0, 100.0, 0.0);
		for key in ["a", "b", "c"] {
			assert_eq!(state(&sim, key), FocusState::Transient);
		}
		ui.pointer_move(&mut sim, &config, 250.0, 150.0, 10.0);
		for key in ["a", "b", "c"] {
			assert_eq!(state(&sim, key), FocusState::Unfocused);
		}
		assert!(sim.links().iter().all(|l| l.width == 0.5));
	}

	#[test]
	fn click_pins_and_second_click_releases() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_move(&mut sim, &config, 100.0, 100.0, 0.0);
		ui.pointer_down(&mut sim, &config, 100.0, 100.0);
		ui.pointer_up(&mut sim, &config, 50.0);
		assert_eq!(state(&sim, "a"), FocusState::Pinned);

		ui.pointer_leave_surface(&mut sim, &config, 100.0);
		assert_eq!(state(&sim, "a"), FocusState::Pinned);
		assert_eq!(state(&sim, "b"), FocusState::Transient);
		assert_eq!(ui.tooltip.opacity(1000.0), 0.9);

		ui.pointer_move(&mut sim, &config, 100.0, 100.0, 2000.0);
		ui.pointer_down(&mut sim, &config, 100.0, 100.0);
		ui.pointer_up(&mut sim, &config, 2050.0);
		assert_eq!(state(&sim, "a"), FocusState::Unfocused);
		assert_eq!(state(&sim, "b"), FocusState::Unfocused);
		assert!(ui.tooltip.visual(3000.0).is_none());
	}

	#[test]
	fn drag_pins_position_and_suppresses_click() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_down(&mut sim, &config, 300.0, 100.0);
		assert_eq!(sim.alpha_target(), config.options.drag_alpha_target);
		assert!(sim.is_running());
		let c = sim.node("c").unwrap();
		assert_eq!((c.fx, c.fy), (Some(300.0), Some(100.0)));

		ui.pointer_move(&mut sim, &config, 320.0, 140.0, 10.0);
		let c = sim.node("c").unwrap();
		assert_eq!((c.fx, c.fy), (Some(320.0), Some(140.0)));
		assert!(ui.drag().unwrap().moved);

		ui.pointer_up(&mut sim, &config, 20.0);
		let c = sim.node("c").unwrap();
		assert_eq!((c.fx, c.fy), (None, None));
		assert_eq!(c.focus_state(), FocusState::Unfocused);
		assert_eq!(sim.alpha_target(), 0.0);
		assert!(ui.drag().is_none());
	}

	#[test]
	fn events_for_missing_nodes_are_ignored() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();
		ui.hover_node(&mut sim, &config, "ghost", 0.0, 0.0, 0.0);
		ui.click_node(&mut sim, &config, "ghost", 0.0);
		ui.drag_start(&mut sim, &config, "ghost", 0.0, 0.0);
		assert!(ui.hovered().is_none());
		assert!(ui.drag().is_none());
	}

	#[test]
	fn press_and_release_off_centre_is_a_click() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_down(&mut sim, &config, 102.0, 100.0);
		ui.pointer_move(&mut sim, &config, 102.0, 100.0, 10.0);
		let a = sim.node("a").unwrap();
		assert_eq!((a.fx, a.fy), (Some(100.0), Some(100.0)));
		assert!(!ui.drag().unwrap().moved);

		ui.pointer_up(&mut sim, &config, 20.0);
		assert_eq!(state(&sim, "a"), FocusState::Pinned);
	}

	#[test]
	fn drag_keeps_grab_offset() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_down(&mut sim, &config, 103.0, 98.0);
		ui.pointer_move(&mut sim, &config, 133.0, 128.0, 10.0);
		let a = sim.node("a").unwrap();
		assert_eq!((a.fx, a.fy), (Some(130.0), Some(130.0)));
		ui.pointer_up(&mut sim, &config, 20.0);
		assert_eq!(state(&sim, "a"), FocusState::Unfocused);
	}

	#[test]
	fn exiting_hovered_node_releases_its_neighbors() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.pointer_move(&mut sim, &config, 200.0, 100.0, 0.0);
		assert_eq!(state(&sim, "a"), FocusState::Transient);
		let keep: HashSet<String> = ["a", "c"].iter().map(|k| k.to_string()).collect();
		ui.release_missing(&mut sim, &config, &keep, 10.0);
		assert!(ui.hovered().is_none());
		for key in ["a", "b", "c"] {
			assert_eq!(state(&sim, key), FocusState::Unfocused);
		}
	}

	#[test]
	fn exiting_pinned_node_is_unpinned() {
		let config = GraphConfig::default();
		let mut sim = line();
		let mut ui = InteractionController::default();

		ui.click_node(&mut sim, &config, "c", 0.0);
		ui.pointer_down(&mut sim, &config, 300.0, 100.0);
		assert_eq!(state(&sim, "b"), FocusState::Transient);
		let keep: HashSet<String> = ["a", "b"].iter().map(|k| k.to_string()).collect();
		ui.release_missing(&mut sim, &config, &keep, 10.0);
		assert!(ui.drag().is_none());
		assert_eq!(state(&sim, "b"), FocusState::Unfocused);
		assert_eq!(state(&sim, "c"), FocusState::Unfocused);
		assert!(sim.links().iter().all(|l| l.focus_scale.is_none()));
	}
}
