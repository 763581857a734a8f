//! Force-directed layout simulation.
//!
//! A velocity-Verlet style integrator in the manner of d3-force: forces add to
//! node velocities, velocities are damped by `velocity_decay`, and positions
//! advance by the damped velocity. The strength of every alpha-scaled force
//! follows `alpha`, which decays toward `alpha_target` each step; once it falls
//! below `alpha_min` the simulation stops until restarted.
//!
//! Per step, in order:
//! 1. link springs (per-link distance and stiffness),
//! 2. pairwise charge,
//! 3. centering on each axis,
//! 4. collision between overlapping padded radii,
//! 5. integration (pinned axes snap to `fx`/`fy`),
//! 6. boundary clamp.

use std::collections::HashMap;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::config::GraphConfig;
use super::focus::FocusState;
use super::geometry::{self, Bounds};
use super::transition::{EnergyRamp, RampHandle, Transition};
use super::types::{GraphLink, GraphNode};

/// A node bound to the simulation.
#[derive(Clone, Debug)]
pub struct Node {
	pub key: String,
	pub data: GraphNode,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x, set while dragged.
	pub fx: Option<f64>,
	/// Pinned y, set while dragged.
	pub fy: Option<f64>,
	pub focused: bool,
	/// Sticky focus toggled by clicking.
	pub clicked: bool,
	/// Radius grow-in (0 to 1) while entering.
	pub enter: Option<Transition>,
}

impl Node {
	pub fn new(key: impl Into<String>, data: GraphNode, x: f64, y: f64) -> Self {
		Self {
			key: key.into(),
			data,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			focused: false,
			clicked: false,
			enter: None,
		}
	}

	pub fn focus_state(&self) -> FocusState {
		FocusState::of(self.focused, self.clicked)
	}
}

/// A link bound to the simulation, its endpoints resolved to node indices.
#[derive(Clone, Debug)]
pub struct Link {
	pub key: String,
	pub data: GraphLink,
	pub source: usize,
	pub target: usize,
	/// Current stroke width.
	pub width: f64,
	/// Factor applied by the last focus, divided back out on unfocus.
	pub focus_scale: Option<f64>,
	/// Opacity/width fade-in (0 to 1) while entering.
	pub enter: Option<Transition>,
}

impl Link {
	pub fn new(key: impl Into<String>, data: GraphLink, source: usize, target: usize, width: f64) -> Self {
		Self {
			key: key.into(),
			data,
			source,
			target,
			width,
			focus_scale: None,
			enter: None,
		}
	}

	pub fn touches(&self, idx: usize) -> bool {
		self.source == idx || self.target == idx
	}

	/// The endpoint that is not `idx`.
	pub fn other(&self, idx: usize) -> usize {
		if self.source == idx { self.target } else { self.source }
	}
}

/// The simulation singleton of one graph instance.
///
/// Owns the live node and link sets. Data updates replace those sets in place
/// through [`Simulation::set_data`]; the instance itself is never rebuilt.
pub struct Simulation {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	alpha: f64,
	alpha_target: f64,
	velocity_decay: f64,
	running: bool,
	ramp: Option<EnergyRamp>,
	ramps_started: u64,
	rng: SmallRng,
}

impl Simulation {
	pub fn new(seed: u64, velocity_decay: f64) -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			index: HashMap::new(),
			alpha: 1.0,
			alpha_target: 0.0,
			velocity_decay,
			running: false,
			ramp: None,
			ramps_started: 0,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Replaces the live node and link sets.
	///
	/// Links whose endpoint indices are out of range are dropped.
	pub fn set_data(&mut self, nodes: Vec<Node>, mut links: Vec<Link>) {
		let n = nodes.len();
		links.retain(|link| {
			let ok = link.source < n && link.target < n;
			if !ok {
				warn!("dropping link {}: endpoint index out of range", link.key);
			}
			ok
		});
		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.key.clone(), i))
			.collect();
		self.nodes = nodes;
		self.links = links;
	}

	/// Hands the node and link sets to the caller, leaving both empty.
	pub fn take_data(&mut self) -> (Vec<Node>, Vec<Link>) {
		self.index.clear();
		(
			std::mem::take(&mut self.nodes),
			std::mem::take(&mut self.links),
		)
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn links_mut(&mut self) -> &mut [Link] {
		&mut self.links
	}

	/// Node and link slices borrowed mutably together.
	pub fn split_mut(&mut self) -> (&mut [Node], &mut [Link]) {
		(&mut self.nodes, &mut self.links)
	}

	pub fn index_of(&self, key: &str) -> Option<usize> {
		self.index.get(key).copied()
	}

	pub fn node(&self, key: &str) -> Option<&Node> {
		self.index_of(key).map(|i| &self.nodes[i])
	}

	pub fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
		let i = self.index_of(key)?;
		self.nodes.get_mut(i)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn velocity_decay(&self) -> f64 {
		self.velocity_decay
	}

	pub fn set_velocity_decay(&mut self, decay: f64) {
		self.velocity_decay = decay.clamp(0.0, 1.0);
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub(crate) fn rng(&mut self) -> &mut SmallRng {
		&mut self.rng
	}

	/// Starts an alpha ramp per the configured schedule, superseding any ramp
	/// still in flight.
	pub fn start_ramp(&mut self, now_ms: f64, config: &GraphConfig) -> RampHandle {
		let opts = &config.options;
		if let Some(old) = self.ramp.take() {
			debug!("superseding energy ramp {:?}", old.handle);
		}
		self.ramps_started += 1;
		let ramp = EnergyRamp::new(
			self.ramps_started,
			opts.ramp_start_alpha,
			opts.ramp_target_alpha,
			now_ms,
			opts.ramp_duration,
		);
		self.alpha = ramp.from;
		self.set_velocity_decay(opts.velocity_decay);
		self.ramp = Some(ramp);
		self.running = true;
		ramp.handle
	}

	/// Handle of the ramp in flight, if any.
	pub fn ramp(&self) -> Option<RampHandle> {
		self.ramp.map(|r| r.handle)
	}

	/// Stops the ramp identified by `handle`. Returns `false` when that ramp
	/// is no longer the active one.
	pub fn stop_ramp(&mut self, handle: RampHandle) -> bool {
		match self.ramp {
			Some(ramp) if ramp.handle == handle => {
				self.ramp = None;
				true
			}
			_ => false,
		}
	}

	/// Applies the active ramp at `now_ms`; stops it and settles the velocity
	/// decay once it has reached its target.
	pub fn advance_ramp(&mut self, now_ms: f64, config: &GraphConfig) {
		let Some(ramp) = self.ramp else {
			return;
		};
		self.alpha = ramp.alpha(now_ms);
		self.running = true;
		if ramp.fraction(now_ms) >= 1.0 {
			self.stop_ramp(ramp.handle);
			self.set_velocity_decay(config.options.settled_velocity_decay);
			debug!("energy ramp {:?} settled", ramp.handle);
		}
	}

	/// Advances one step if running; returns whether the simulation is still
	/// running afterwards.
	pub fn tick(&mut self, config: &GraphConfig) -> bool {
		if !self.running {
			return false;
		}
		self.step(config);
		if self.alpha < config.options.alpha_min && self.ramp.is_none() {
			self.running = false;
		}
		self.running
	}

	/// One integration step, whether or not the simulation is running.
	pub fn step(&mut self, config: &GraphConfig) {
		let opts = &config.options;
		self.alpha += (self.alpha_target - self.alpha) * opts.alpha_decay;

		let radii: Vec<f64> = self.nodes.iter().map(|n| config.radius(&n.data)).collect();
		let bounds = Bounds::viewport(opts.width, opts.height, opts.top_offset);

		apply_links(&mut self.nodes, &self.links, config, self.alpha, &mut self.rng);
		apply_charge(&mut self.nodes, opts.charge_strength, self.alpha, &mut self.rng);
		apply_centering(&mut self.nodes, bounds.center(), opts.centering_force, self.alpha);
		apply_collision(
			&mut self.nodes,
			&radii,
			opts.collision_padding,
			opts.collision_strength,
			&mut self.rng,
		);
		integrate(&mut self.nodes, self.velocity_decay);
		for (node, &r) in self.nodes.iter_mut().zip(&radii) {
			geometry::clamp_body(&mut node.x, &mut node.y, &mut node.vx, &mut node.vy, r, &bounds);
		}
	}

	/// Clamps every node into the viewport, zeroing velocity at the walls.
	pub fn clamp_all(&mut self, config: &GraphConfig) {
		let opts = &config.options;
		let bounds = Bounds::viewport(opts.width, opts.height, opts.top_offset);
		for node in &mut self.nodes {
			let r = config.radius(&node.data);
			geometry::clamp_body(&mut node.x, &mut node.y, &mut node.vx, &mut node.vy, r, &bounds);
		}
	}
}

/// Tiny random offset separating coincident points.
fn jiggle(rng: &mut SmallRng) -> f64 {
	(rng.random::<f64>() - 0.5) * 1e-6
}

fn apply_links(nodes: &mut [Node], links: &[Link], config: &GraphConfig, alpha: f64, rng: &mut SmallRng) {
	let mut degree = vec![0usize; nodes.len()];
	for link in links {
		degree[link.source] += 1;
		degree[link.target] += 1;
	}

	for link in links {
		let (s, t) = (link.source, link.target);
		if s == t {
			continue;
		}
		let params = config.link_params(&link.data);
		let (ds, dt) = (degree[s] as f64, degree[t] as f64);
		let strength = params.strength.unwrap_or(1.0 / ds.min(dt));
		let bias = ds / (ds + dt);

		let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
		let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
		if x == 0.0 {
			x = jiggle(rng);
		}
		if y == 0.0 {
			y = jiggle(rng);
		}
		let len = (x * x + y * y).sqrt();
		let l = (len - params.distance) / len * alpha * strength;
		let (x, y) = (x * l, y * l);

		nodes[t].vx -= x * bias;
		nodes[t].vy -= y * bias;
		nodes[s].vx += x * (1.0 - bias);
		nodes[s].vy += y * (1.0 - bias);
	}
}

fn apply_charge(nodes: &mut [Node], strength: f64, alpha: f64, rng: &mut SmallRng) {
	let n = nodes.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let mut x = nodes[j].x - nodes[i].x;
			let mut y = nodes[j].y - nodes[i].y;
			if x == 0.0 {
				x = jiggle(rng);
			}
			if y == 0.0 {
				y = jiggle(rng);
			}
			let mut l = x * x + y * y;
			// Below unit distance the square is replaced by its root.
			if l < 1.0 {
				l = l.sqrt();
			}
			let w = strength * alpha / l;
			nodes[i].vx += x * w;
			nodes[i].vy += y * w;
			nodes[j].vx -= x * w;
			nodes[j].vy -= y * w;
		}
	}
}

fn apply_centering(nodes: &mut [Node], (cx, cy): (f64, f64), strength: f64, alpha: f64) {
	let k = strength * alpha;
	for node in nodes {
		node.vx += (cx - node.x) * k;
		node.vy += (cy - node.y) * k;
	}
}

fn apply_collision(nodes: &mut [Node], radii: &[f64], padding: f64, strength: f64, rng: &mut SmallRng) {
	let n = nodes.len();
	for i in 0..n {
		let ri = radii[i] + padding;
		let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);
		for j in (i + 1)..n {
			let rj = radii[j] + padding;
			let r = ri + rj;
			let mut x = xi - nodes[j].x - nodes[j].vx;
			let mut y = yi - nodes[j].y - nodes[j].vy;
			let mut l = x * x + y * y;
			if l >= r * r {
				continue;
			}
			if x == 0.0 {
				x = jiggle(rng);
				l += x * x;
			}
			if y == 0.0 {
				y = jiggle(rng);
				l += y * y;
			}
			let len = l.sqrt();
			let k = (r - len) / len * strength;
			let (x, y) = (x * k, y * k);
			let share = rj * rj / (ri * ri + rj * rj);
			nodes[i].vx += x * share;
			nodes[i].vy += y * share;
			nodes[j].vx -= x * (1.0 - share);
			nodes[j].vy -= y * (1.0 - share);
		}
	}
}

fn integrate(nodes: &mut [Node], velocity_decay: f64) {
	let keep = 1.0 - velocity_decay;
	for node in nodes {
		match node.fx {
			Some(fx) => {
				node.x = fx;
				node.vx = 0.0;
			}
			None => {
				node.vx *= keep;
				node.x += node.vx;
			}
		}
		match node.fy {
			Some(fy) => {
				node.y = fy;
				node.vy = 0.0;
			}
			None => {
				node.vy *= keep;
				node.y += node.vy;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::Options;

	fn config() -> GraphConfig {
		GraphConfig::new(Options {
			width: 400.0,
			height: 300.0,
			..Options::default()
		})
	}

	fn sim_with(points: &[(f64, f64)], edges: &[(usize, usize)]) -> Simulation {
		let nodes = points
			.iter()
			.enumerate()
			.map(|(i, &(x, y))| Node::new(i.to_string(), GraphNode::new(i.to_string()), x, y))
			.collect();
		let links = edges
			.iter()
			.map(|&(s, t)| Link::new(format!("{s}-{t}"), GraphLink::new(s.to_string(), t.to_string()), s, t, 0.5))
			.collect();
		let mut sim = Simulation::new(7, 0.4);
		sim.set_data(nodes, links);
		sim
	}

	fn dist(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (p, q) = (&sim.nodes()[a], &sim.nodes()[b]);
		((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt()
	}

	#[test]
	fn charge_softens_below_unit_distance() {
		let mut nodes = vec![
			Node::new("a", GraphNode::new("a"), 0.0, 0.0),
			Node::new("b", GraphNode::new("b"), 0.5, 0.0),
		];
		let mut rng = SmallRng::seed_from_u64(1);
		apply_charge(&mut nodes, -30.0, 1.0, &mut rng);
		assert!((nodes[0].vx + 30.0).abs() < 1e-3);
		assert!((nodes[1].vx - 30.0).abs() < 1e-3);

		let mut far = vec![
			Node::new("a", GraphNode::new("a"), 0.0, 0.0),
			Node::new("b", GraphNode::new("b"), 2.0, 1.0),
		];
		apply_charge(&mut far, -30.0, 1.0, &mut rng);
		assert!((far[0].vx + 12.0).abs() < 1e-9);
		assert!((far[0].vy + 6.0).abs() < 1e-9);
	}

	#[test]
	fn nodes_stay_inside_bounds_with_top_offset() {
		let mut cfg = config();
		cfg.options.top_offset = 40.0;
		cfg.options.charge_strength = -5000.0;
		let points: Vec<_> = (0..25).map(|i| ((i * 37 % 400) as f64, (i * 53 % 300) as f64)).collect();
		let mut sim = sim_with(&points, &[(0, 1), (1, 2), (3, 4)]);
		sim.set_alpha(1.0);
		for _ in 0..300 {
			sim.step(&cfg);
			for node in sim.nodes() {
				assert!(node.x >= 5.0 && node.x <= 395.0, "x out of bounds: {}", node.x);
				assert!(node.y >= 45.0 && node.y <= 295.0, "y out of bounds: {}", node.y);
			}
		}
	}

	#[test]
	fn charge_pushes_nodes_apart() {
		let cfg = config();
		let mut sim = sim_with(&[(190.0, 150.0), (210.0, 150.0)], &[]);
		let before = dist(&sim, 0, 1);
		sim.set_alpha(1.0);
		sim.step(&cfg);
		assert!(dist(&sim, 0, 1) > before);
	}

	#[test]
	fn link_pulls_distant_pair_together() {
		let mut cfg = config();
		cfg.options.charge_strength = 0.0;
		cfg.options.centering_force = 0.0;
		let mut sim = sim_with(&[(20.0, 150.0), (380.0, 150.0)], &[(0, 1)]);
		let before = dist(&sim, 0, 1);
		sim.set_alpha(1.0);
		sim.step(&cfg);
		assert!(dist(&sim, 0, 1) < before);
	}

	#[test]
	fn per_link_distance_is_respected() {
		let mut cfg = config();
		cfg.options.charge_strength = 0.0;
		cfg.options.centering_force = 0.0;
		cfg.options.collision_strength = 0.0;
		cfg.callbacks.link_force = std::rc::Rc::new(|_: &GraphLink, _: &Options| {
			crate::components::force_graph::config::LinkParams {
				distance: 100.0,
				strength: Some(1.0),
			}
		});
		let mut sim = sim_with(&[(150.0, 150.0), (170.0, 150.0)], &[(0, 1)]);
		sim.set_alpha(1.0);
		for _ in 0..200 {
			sim.set_alpha(1.0);
			sim.step(&cfg);
		}
		assert!((dist(&sim, 0, 1) - 100.0).abs() < 1.0, "{}", dist(&sim, 0, 1));
	}

	#[test]
	fn coincident_nodes_separate() {
		let cfg = config();
		let mut sim = sim_with(&[(200.0, 150.0), (200.0, 150.0)], &[]);
		sim.set_alpha(1.0);
		for _ in 0..10 {
			sim.step(&cfg);
		}
		assert!(dist(&sim, 0, 1) > 1.0);
		assert!(sim.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn pinned_node_holds_position() {
		let cfg = config();
		let mut sim = sim_with(&[(100.0, 100.0), (110.0, 100.0)], &[(0, 1)]);
		sim.nodes_mut()[0].fx = Some(50.0);
		sim.nodes_mut()[0].fy = Some(60.0);
		sim.set_alpha(1.0);
		for _ in 0..20 {
			sim.step(&cfg);
		}
		let pinned = &sim.nodes()[0];
		assert_eq!((pinned.x, pinned.y), (50.0, 60.0));
		assert_eq!((pinned.vx, pinned.vy), (0.0, 0.0));
	}

	#[test]
	fn alpha_decays_until_the_simulation_stops() {
		let cfg = config();
		let mut sim = sim_with(&[(100.0, 100.0)], &[]);
		sim.restart();
		let mut steps = 0;
		while sim.tick(&cfg) {
			steps += 1;
			assert!(steps < 1000);
		}
		assert!(sim.alpha() < cfg.options.alpha_min);
		assert!(!sim.tick(&cfg));
	}

	#[test]
	fn alpha_target_keeps_simulation_warm() {
		let cfg = config();
		let mut sim = sim_with(&[(100.0, 100.0)], &[]);
		sim.set_alpha_target(0.3);
		sim.restart();
		for _ in 0..1000 {
			assert!(sim.tick(&cfg));
		}
		assert!((sim.alpha() - 0.3).abs() < 0.01);
	}

	#[test]
	fn new_ramp_supersedes_old_one() {
		let cfg = config();
		let mut sim = sim_with(&[(100.0, 100.0)], &[]);
		let first = sim.start_ramp(0.0, &cfg);
		let second = sim.start_ramp(500.0, &cfg);
		assert_ne!(first, second);
		assert!(!sim.stop_ramp(first));
		assert_eq!(sim.ramp(), Some(second));
		assert_eq!(sim.alpha(), cfg.options.ramp_start_alpha);
	}

	#[test]
	fn ramp_completion_settles_velocity_decay() {
		let mut cfg = config();
		cfg.options.velocity_decay = 0.4;
		cfg.options.settled_velocity_decay = 0.6;
		let mut sim = sim_with(&[(100.0, 100.0)], &[]);
		sim.start_ramp(0.0, &cfg);
		sim.advance_ramp(1000.0, &cfg);
		assert!(sim.ramp().is_some());
		assert_eq!(sim.velocity_decay(), 0.4);
		assert!(sim.alpha() > cfg.options.ramp_start_alpha);

		sim.advance_ramp(2000.0, &cfg);
		assert!(sim.ramp().is_none());
		assert_eq!(sim.alpha(), cfg.options.ramp_target_alpha);
		assert_eq!(sim.velocity_decay(), 0.6);
	}
}
