//! Keyed reconciliation of new node/link collections against the live ones.
//!
//! Every record is matched to the live entity with the same key:
//! - **updating** entities keep their simulated position, velocity, pinned
//!   position, focus flags and link widths, and only take the new record;
//! - **entering** entities are placed and grow/fade in over the transition;
//! - **exiting** entities leave the simulation at once and shrink/fade out in
//!   the [`Scene`] until their transition finishes.
//!
//! Labels follow their nodes one to one.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::Rng;
use rand::rngs::SmallRng;

use super::config::{Axis, GraphConfig, Options};
use super::geometry::{self, Bounds};
use super::simulation::{Link, Node, Simulation};
use super::transition::{RampHandle, Transition};
use super::types::{GraphLink, GraphNode};

/// Keys of one entity kind, split by how they were matched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
	pub entering: Vec<String>,
	pub updating: Vec<String>,
	pub exiting: Vec<String>,
}

/// Outcome of one [`reconcile`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
	pub nodes: Diff,
	pub links: Diff,
	pub labels: Diff,
	/// The energy ramp started for this update.
	pub ramp: RampHandle,
}

/// A node on its way out, frozen where it was when it left.
#[derive(Clone, Debug)]
pub struct ExitingNode {
	pub node: Node,
	/// Scale of radius and label opacity, 1 to 0.
	pub transition: Transition,
}

/// A link on its way out.
///
/// The endpoint keys let it follow endpoints that are still alive; the stored
/// positions are used for endpoints that left too.
#[derive(Clone, Debug)]
pub struct ExitingLink {
	pub link: Link,
	pub source_key: String,
	pub target_key: String,
	pub source_pos: (f64, f64),
	pub target_pos: (f64, f64),
	/// Stroke opacity, 1 to 0.
	pub transition: Transition,
}

/// Rendered entities that are no longer simulated.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub exiting_nodes: Vec<ExitingNode>,
	pub exiting_links: Vec<ExitingLink>,
}

impl Scene {
	/// Drops exit transitions that have finished at `now_ms`.
	pub fn purge(&mut self, now_ms: f64) {
		self.exiting_nodes.retain(|e| !e.transition.is_finished(now_ms));
		self.exiting_links.retain(|e| !e.transition.is_finished(now_ms));
	}

	pub fn is_empty(&self) -> bool {
		self.exiting_nodes.is_empty() && self.exiting_links.is_empty()
	}
}

/// Matches `nodes`/`links` against the simulation's live sets, swaps the new
/// sets in and starts the energy ramp.
///
/// Records without a usable key, duplicate keys (after the first) and links
/// with an endpoint outside `nodes` are skipped with a warning.
pub fn reconcile(
	sim: &mut Simulation,
	scene: &mut Scene,
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	config: &GraphConfig,
	now_ms: f64,
) -> Reconciliation {
	let opts = &config.options;
	let (old_nodes, old_links) = sim.take_data();

	let old_pos: HashMap<String, (f64, f64)> = old_nodes
		.iter()
		.map(|n| (n.key.clone(), (n.x, n.y)))
		.collect();
	let old_order: Vec<String> = old_nodes.iter().map(|n| n.key.clone()).collect();
	let mut previous: HashMap<String, Node> = old_nodes
		.into_iter()
		.map(|n| (n.key.clone(), n))
		.collect();

	let mut node_diff = Diff::default();
	let mut next_nodes = Vec::with_capacity(nodes.len());
	let mut seen = HashSet::new();
	for data in nodes {
		let Some(key) = data.key(&opts.node_ref_prop) else {
			warn!("skipping node without a `{}` key", opts.node_ref_prop);
			continue;
		};
		if !seen.insert(key.clone()) {
			warn!("duplicate node key {key}, keeping the first");
			continue;
		}
		match previous.remove(&key) {
			Some(mut node) => {
				node.data = data;
				node_diff.updating.push(key);
				next_nodes.push(node);
			}
			None => {
				let (x, y) = place(&data, config, sim.rng());
				let mut node = Node::new(key.clone(), data, x, y);
				node.enter = Some(Transition::new(0.0, 1.0, now_ms, opts.transition_time));
				node_diff.entering.push(key);
				next_nodes.push(node);
			}
		}
	}

	scene.exiting_nodes.retain(|e| !seen.contains(&e.node.key));
	for key in old_order {
		if let Some(node) = previous.remove(&key) {
			scene.exiting_nodes.push(ExitingNode {
				node,
				transition: Transition::new(1.0, 0.0, now_ms, opts.transition_time),
			});
			node_diff.exiting.push(key);
		}
	}

	let index: HashMap<&str, usize> = next_nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.key.as_str(), i))
		.collect();

	let old_link_order: Vec<String> = old_links.iter().map(|l| l.key.clone()).collect();
	let mut previous_links: HashMap<String, Link> = old_links
		.into_iter()
		.map(|l| (l.key.clone(), l))
		.collect();

	let mut link_diff = Diff::default();
	let mut next_links = Vec::with_capacity(links.len());
	let mut seen_links = HashSet::new();
	for data in links {
		let key = data.key();
		let (Some(&source), Some(&target)) = (
			index.get(data.source.as_str()),
			index.get(data.target.as_str()),
		) else {
			warn!("skipping link {key}: endpoint missing from the node set");
			continue;
		};
		if !seen_links.insert(key.clone()) {
			warn!("duplicate link key {key}, keeping the first");
			continue;
		}
		let base = data.thickness.unwrap_or(opts.unfocus_stroke_thickness);
		match previous_links.remove(&key) {
			Some(mut link) => {
				link.source = source;
				link.target = target;
				link.data = data;
				if link.focus_scale.is_none() {
					link.width = base;
				}
				link_diff.updating.push(key);
				next_links.push(link);
			}
			None => {
				let mut link = Link::new(key.clone(), data, source, target, base);
				link.enter = Some(Transition::new(0.0, 1.0, now_ms, opts.transition_time));
				link_diff.entering.push(key);
				next_links.push(link);
			}
		}
	}

	scene.exiting_links.retain(|e| !seen_links.contains(&e.link.key));
	for key in old_link_order {
		if let Some(link) = previous_links.remove(&key) {
			let source_key = link.data.source.clone();
			let target_key = link.data.target.clone();
			let source_pos = old_pos.get(&source_key).copied().unwrap_or_default();
			let target_pos = old_pos.get(&target_key).copied().unwrap_or_default();
			scene.exiting_links.push(ExitingLink {
				link,
				source_key,
				target_key,
				source_pos,
				target_pos,
				transition: Transition::new(1.0, 0.0, now_ms, opts.transition_time),
			});
			link_diff.exiting.push(key);
		}
	}

	debug!(
		"reconciled nodes +{} ~{} -{}, links +{} ~{} -{}",
		node_diff.entering.len(),
		node_diff.updating.len(),
		node_diff.exiting.len(),
		link_diff.entering.len(),
		link_diff.updating.len(),
		link_diff.exiting.len()
	);

	sim.set_data(next_nodes, next_links);
	let ramp = sim.start_ramp(now_ms, config);

	Reconciliation {
		labels: node_diff.clone(),
		nodes: node_diff,
		links: link_diff,
		ramp,
	}
}

/// Start position of an entering node.
///
/// Per axis: the caller's [`StartPosition`](super::config::StartPosition),
/// else the node's grid cell with jitter, else uniform random. The result is
/// clamped into the viewport.
pub fn place(node: &GraphNode, config: &GraphConfig, rng: &mut SmallRng) -> (f64, f64) {
	let opts = &config.options;
	let radius = config.radius(node);
	let bounds = Bounds::viewport(opts.width, opts.height, opts.top_offset);
	let grid = grid_anchor(node, opts, rng);

	let x = config
		.start_position(node, Axis::X)
		.or(grid.map(|(gx, _)| gx))
		.unwrap_or_else(|| uniform(rng, bounds.min_x + radius, bounds.max_x - radius));
	let y = config
		.start_position(node, Axis::Y)
		.or(grid.map(|(_, gy)| gy))
		.unwrap_or_else(|| uniform(rng, bounds.min_y + radius, bounds.max_y - radius));

	geometry::clamp(x, y, radius, &bounds)
}

/// Jittered centre of the node's grid cell, if it has one.
fn grid_anchor(node: &GraphNode, opts: &Options, rng: &mut SmallRng) -> Option<(f64, f64)> {
	let cell = node.grid?;
	let (cols, rows) = (opts.grid_columns.max(1), opts.grid_rows.max(1));
	let cell_w = opts.width / cols as f64;
	let cell_h = (opts.height - opts.top_offset) / rows as f64;
	let jx = opts.placement_jitter.min(cell_w / 2.0);
	let jy = opts.placement_jitter.min(cell_h / 2.0);

	let cx = ((cell.column % cols) as f64 + 0.5) * cell_w;
	let cy = opts.top_offset + ((cell.row % rows) as f64 + 0.5) * cell_h;
	Some((cx + uniform(rng, -jx, jx), cy + uniform(rng, -jy, jy)))
}

fn uniform(rng: &mut SmallRng, lo: f64, hi: f64) -> f64 {
	if hi > lo {
		rng.random_range(lo..=hi)
	} else {
		(lo + hi) / 2.0
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use rand::SeedableRng;

	use super::*;
	use crate::components::force_graph::focus;

	fn nodes(keys: &[&str]) -> Vec<GraphNode> {
		keys.iter().map(|k| GraphNode::new(*k)).collect()
	}

	fn links(pairs: &[(&str, &str)]) -> Vec<GraphLink> {
		pairs.iter().map(|&(s, t)| GraphLink::new(s, t)).collect()
	}

	fn keys(sim: &Simulation) -> Vec<&str> {
		sim.nodes().iter().map(|n| n.key.as_str()).collect()
	}

	fn setup() -> (Simulation, Scene, GraphConfig) {
		let config = GraphConfig::default();
		(Simulation::new(3, config.options.velocity_decay), Scene::default(), config)
	}

	#[test]
	fn diff_partitions_by_key() {
		let (mut sim, mut scene, config) = setup();
		reconcile(&mut sim, &mut scene, nodes(&["a", "b", "c"]), links(&[("a", "b")]), &config, 0.0);

		let r = reconcile(
			&mut sim,
			&mut scene,
			nodes(&["d", "c", "b"]),
			links(&[("b", "c"), ("c", "d")]),
			&config,
			100.0,
		);
		assert_eq!(r.nodes.entering, ["d"]);
		assert_eq!(r.nodes.updating, ["c", "b"]);
		assert_eq!(r.nodes.exiting, ["a"]);
		assert_eq!(r.labels, r.nodes);
		assert_eq!(r.links.entering, ["b-c", "c-d"]);
		assert!(r.links.updating.is_empty());
		assert_eq!(r.links.exiting, ["a-b"]);

		assert_eq!(keys(&sim), ["d", "c", "b"]);
		assert_eq!(scene.exiting_nodes.len(), 1);
		assert_eq!(scene.exiting_links.len(), 1);
	}

	#[test]
	fn retained_entities_keep_state() {
		let (mut sim, mut scene, config) = setup();
		reconcile(&mut sim, &mut scene, nodes(&["a", "b", "c"]), links(&[("a", "b"), ("b", "c")]), &config, 0.0);
		focus::focus(&mut sim, "b", &config);
		focus::toggle_pin(&mut sim, "b", &config);
		{
			let a = sim.node_mut("a").unwrap();
			a.x = 123.0;
			a.vx = 4.0;
			a.fx = Some(123.0);
		}
		let widths: Vec<f64> = sim.links().iter().map(|l| l.width).collect();

		reconcile(
			&mut sim,
			&mut scene,
			nodes(&["z", "c", "b", "a", "e"]),
			links(&[("e", "a"), ("b", "c"), ("a", "b")]),
			&config,
			50.0,
		);

		let a = sim.node("a").unwrap();
		assert_eq!((a.x, a.vx, a.fx), (123.0, 4.0, Some(123.0)));
		assert!(a.focused && !a.clicked);
		let b = sim.node("b").unwrap();
		assert!(b.focused && b.clicked);
		assert!(sim.node("c").unwrap().focused);
		assert!(!sim.node("z").unwrap().focused);

		let ab = sim.links().iter().find(|l| l.key == "a-b").unwrap();
		assert_eq!(ab.width, widths[0]);
		assert!(ab.focus_scale.is_some());
		let ends = (sim.nodes()[ab.source].key.as_str(), sim.nodes()[ab.target].key.as_str());
		assert_eq!(ends, ("a", "b"));
	}

	#[test]
	fn unresolvable_and_duplicate_records_are_skipped() {
		let (mut sim, mut scene, config) = setup();
		let mut input = nodes(&["a", "b", "a"]);
		input.push(GraphNode::default());
		let r = reconcile(
			&mut sim,
			&mut scene,
			input,
			links(&[("a", "b"), ("a", "ghost"), ("a", "b")]),
			&config,
			0.0,
		);
		assert_eq!(r.nodes.entering, ["a", "b"]);
		assert_eq!(r.links.entering, ["a-b"]);
		assert_eq!(sim.links().len(), 1);
	}

	#[test]
	fn typed_links_are_distinct() {
		let (mut sim, mut scene, config) = setup();
		let mut input = links(&[("a", "b")]);
		input.push(GraphLink::new("a", "b").with_type("weak"));
		let r = reconcile(&mut sim, &mut scene, nodes(&["a", "b"]), input, &config, 0.0);
		assert_eq!(r.links.entering, ["a-b", "a-b-weak"]);
	}

	#[test]
	fn exits_finish_and_reentry_cancels_exit() {
		let (mut sim, mut scene, config) = setup();
		reconcile(&mut sim, &mut scene, nodes(&["a", "b"]), links(&[("a", "b")]), &config, 0.0);
		reconcile(&mut sim, &mut scene, nodes(&["a"]), vec![], &config, 1000.0);
		assert_eq!(scene.exiting_nodes.len(), 1);
		assert_eq!(scene.exiting_links.len(), 1);

		scene.purge(1000.0 + config.options.transition_time / 2.0);
		assert!(!scene.is_empty());

		reconcile(&mut sim, &mut scene, nodes(&["a", "b"]), vec![], &config, 1200.0);
		assert!(scene.exiting_nodes.is_empty());
		assert_eq!(scene.exiting_links.len(), 1);

		scene.purge(1200.0 + config.options.transition_time);
		assert!(scene.is_empty());
	}

	#[test]
	fn entering_entities_start_transparent() {
		let (mut sim, mut scene, config) = setup();
		reconcile(&mut sim, &mut scene, nodes(&["a", "b"]), links(&[("a", "b")]), &config, 10.0);
		let link = &sim.links()[0];
		let fade = link.enter.unwrap();
		assert_eq!(fade.value(10.0), 0.0);
		assert_eq!(fade.value(10.0 + config.options.transition_time), 1.0);
		assert_eq!(link.width, config.options.unfocus_stroke_thickness);
		assert!(sim.nodes().iter().all(|n| n.enter.is_some()));
	}

	#[test]
	fn update_restarts_the_energy_ramp() {
		let (mut sim, mut scene, config) = setup();
		let first = reconcile(&mut sim, &mut scene, nodes(&["a"]), vec![], &config, 0.0).ramp;
		let second = reconcile(&mut sim, &mut scene, nodes(&["a"]), vec![], &config, 10.0).ramp;
		assert_ne!(first, second);
		assert_eq!(sim.ramp(), Some(second));
		assert!(sim.is_running());
	}

	#[test]
	fn placement_prefers_callback_then_grid_then_random() {
		let mut config = GraphConfig::new(Options {
			width: 400.0,
			height: 400.0,
			grid_columns: 4,
			grid_rows: 4,
			placement_jitter: 10.0,
			..Options::default()
		});
		let mut rng = SmallRng::seed_from_u64(9);

		let gridded = GraphNode::new("g").with_grid(1, 2);
		for _ in 0..20 {
			let (x, y) = place(&gridded, &config, &mut rng);
			assert!((140.0..=160.0).contains(&x), "x = {x}");
			assert!((240.0..=260.0).contains(&y), "y = {y}");
		}

		let free = GraphNode::new("f");
		for _ in 0..20 {
			let (x, y) = place(&free, &config, &mut rng);
			assert!(Bounds::viewport(400.0, 400.0, 0.0).contains(x, y, 5.0));
		}

		config.callbacks.start_position = Rc::new(|_: &GraphNode, axis: Axis| match axis {
			Axis::X => Some(33.0),
			Axis::Y => None,
		});
		let (x, y) = place(&gridded, &config, &mut rng);
		assert_eq!(x, 33.0);
		assert!((240.0..=260.0).contains(&y));

		config.callbacks.start_position = Rc::new(|_: &GraphNode, _: Axis| Some(-100.0));
		assert_eq!(place(&free, &config, &mut rng), (5.0, 5.0));
	}

	#[test]
	fn custom_key_property() {
		let mut config = GraphConfig::default();
		config.options.node_ref_prop = "name".into();
		let mut sim = Simulation::new(1, 0.9);
		let mut scene = Scene::default();
		let input = vec![
			GraphNode::default().with_prop("name", "x"),
			GraphNode::default().with_prop("name", "y"),
		];
		let r = reconcile(&mut sim, &mut scene, input, links(&[("x", "y")]), &config, 0.0);
		assert_eq!(r.nodes.entering, ["x", "y"]);
		assert_eq!(r.links.entering, ["x-y"]);
	}
}
