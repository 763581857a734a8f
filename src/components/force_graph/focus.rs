//! Focus state machine: neighbor highlighting with click-to-pin.
//!
//! Hovering a node focuses it and its direct neighbors and widens every link
//! touching it. Leaving reverts the neighbors that are not pinned. Clicking
//! pins a node so that leaving it no longer reverts anything; a second click
//! unpins and reverts immediately.
//!
//! Link widening is multiplicative and the applied factor is stored on the
//! link. A link can't grow wider than the smaller endpoint's diameter, so the
//! factor is reduced when that cap would be exceeded and unfocus divides by
//! exactly what was applied.

use std::collections::HashSet;

use log::debug;

use super::config::GraphConfig;
use super::simulation::{Link, Simulation};

/// Per-node focus status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
	Unfocused,
	/// Focused by hover; reverts when the pointer leaves.
	Transient,
	/// Focused by click; survives the pointer leaving.
	Pinned,
}

impl FocusState {
	pub fn of(focused: bool, clicked: bool) -> Self {
		match (focused, clicked) {
			(_, true) => Self::Pinned,
			(true, false) => Self::Transient,
			(false, false) => Self::Unfocused,
		}
	}

	pub fn is_focused(self) -> bool {
		self != Self::Unfocused
	}
}

/// `idx` plus every node one link away from it.
pub fn neighbors(links: &[Link], idx: usize) -> HashSet<usize> {
	let mut set = HashSet::from([idx]);
	for link in links.iter().filter(|l| l.touches(idx)) {
		set.insert(link.other(idx));
	}
	set
}

/// Factor to widen `width` by without passing `max_width`, never below 1.
fn capped_factor(width: f64, factor: f64, max_width: f64) -> f64 {
	if width <= 0.0 {
		return 1.0;
	}
	(max_width / width).min(factor).max(1.0)
}

/// Focuses the node `key` and its neighbors. Returns `false` if no such node.
///
/// Nodes outside the neighborhood keep whatever state they had.
pub fn focus(sim: &mut Simulation, key: &str, config: &GraphConfig) -> bool {
	let Some(idx) = sim.index_of(key) else {
		debug!("focus: node {key} is gone");
		return false;
	};
	let hood = neighbors(sim.links(), idx);
	let factor = config.options.focus_stroke_factor();
	let (nodes, links) = sim.split_mut();

	for &i in &hood {
		nodes[i].focused = true;
	}
	for link in links.iter_mut().filter(|l| l.touches(idx)) {
		if link.focus_scale.is_some() {
			continue;
		}
		let max_width = 2.0
			* config
				.radius(&nodes[link.source].data)
				.min(config.radius(&nodes[link.target].data));
		let applied = capped_factor(link.width, factor, max_width);
		link.width *= applied;
		link.focus_scale = Some(applied);
	}
	true
}

/// Reverts the focus of `key`'s neighborhood. Pinned nodes are left alone,
/// and so are links whose other endpoint is pinned.
///
/// Returns `false` if the node is missing or itself pinned.
pub fn unfocus(sim: &mut Simulation, key: &str, _config: &GraphConfig) -> bool {
	let Some(idx) = sim.index_of(key) else {
		debug!("unfocus: node {key} is gone");
		return false;
	};
	let hood = neighbors(sim.links(), idx);
	let (nodes, links) = sim.split_mut();
	if nodes[idx].clicked {
		return false;
	}

	for &i in &hood {
		if !nodes[i].clicked {
			nodes[i].focused = false;
		}
	}
	for link in links.iter_mut().filter(|l| l.touches(idx)) {
		if nodes[link.other(idx)].clicked {
			continue;
		}
		if let Some(scale) = link.focus_scale.take() {
			link.width /= scale;
		}
	}
	true
}

/// Toggles the pin on `key`, returning the new pinned flag.
///
/// Pinning also focuses, so a pinned node is always focused. Unpinning runs
/// the unfocus transition straight away.
pub fn toggle_pin(sim: &mut Simulation, key: &str, config: &GraphConfig) -> Option<bool> {
	let node = sim.node_mut(key)?;
	node.clicked = !node.clicked;
	let (pinned, focused) = (node.clicked, node.focused);
	if pinned {
		if !focused {
			focus(sim, key, config);
		}
	} else {
		unfocus(sim, key, config);
	}
	Some(pinned)
}
