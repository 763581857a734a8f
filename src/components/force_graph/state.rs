//! Graph state and its public operations.
//!
//! [`DynamicGraph`] owns the configuration, the simulation (created on the
//! first update and reused afterwards), the exit scene and the interaction
//! controller. The component drives it with `frame(now)` from the animation
//! loop and with pointer events in between.

use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, error, info};
use serde_json::{Map, Value};

use super::config::{
	GraphConfig, LinkColor, LinkForce, NodeColor, NodeRadius, Options, StartPosition, TooltipContent,
};
use super::error::{GraphError, Result};
use super::interaction::InteractionController;
use super::reconcile::{self, Reconciliation, Scene};
use super::simulation::Simulation;
use super::types::{GraphData, GraphLink, GraphNode};
use super::visual::Frame;

/// One dynamic graph instance.
pub struct DynamicGraph {
	config: GraphConfig,
	sim: Option<Simulation>,
	scene: Scene,
	interaction: InteractionController,
}

impl Default for DynamicGraph {
	fn default() -> Self {
		Self::new(Options::default())
	}
}

impl DynamicGraph {
	pub fn new(options: Options) -> Self {
		Self::with_config(GraphConfig::new(options))
	}

	pub fn with_config(config: GraphConfig) -> Self {
		Self {
			config,
			sim: None,
			scene: Scene::default(),
			interaction: InteractionController::default(),
		}
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// The live simulation, once the first update has been made.
	pub fn simulation(&self) -> Option<&Simulation> {
		self.sim.as_ref()
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	/// Reconciles the rendered graph with `nodes` and `links`.
	///
	/// Both collections are required; a missing one is reported and nothing
	/// changes.
	pub fn update_vis(
		&mut self,
		nodes: Option<Vec<GraphNode>>,
		links: Option<Vec<GraphLink>>,
		now_ms: f64,
	) -> Result<Reconciliation> {
		let (nodes, links) = match (nodes, links) {
			(Some(nodes), Some(links)) => (nodes, links),
			(None, _) => return Err(report(GraphError::MissingCollection("nodes"))),
			(_, None) => return Err(report(GraphError::MissingCollection("links"))),
		};

		let opts = &self.config.options;
		let sim = self
			.sim
			.get_or_insert_with(|| Simulation::new(opts.seed, opts.velocity_decay));
		let keep: HashSet<String> = nodes.iter().filter_map(|n| n.key(&opts.node_ref_prop)).collect();
		self.interaction.release_missing(sim, &self.config, &keep, now_ms);
		let result = reconcile::reconcile(sim, &mut self.scene, nodes, links, &self.config, now_ms);
		info!(
			"graph updated: {} nodes, {} links",
			sim.nodes().len(),
			sim.links().len()
		);
		Ok(result)
	}

	pub fn update_data(&mut self, data: GraphData, now_ms: f64) -> Result<Reconciliation> {
		self.update_vis(Some(data.nodes), Some(data.links), now_ms)
	}

	pub fn options(&self) -> &Options {
		&self.config.options
	}

	/// Merges `updates` into the options. All or nothing.
	pub fn set_options(&mut self, updates: Map<String, Value>) -> Result<()> {
		self.config.options.merge(updates).map_err(report)
	}

	pub fn option(&self, name: &str) -> Result<Value> {
		self.config.options.get(name).map_err(report)
	}

	pub fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
		self.config.options.set(name, value).map_err(report)
	}

	pub fn set_node_color(&mut self, f: impl NodeColor + 'static) {
		self.config.callbacks.node_color = Rc::new(f);
	}

	pub fn set_link_color(&mut self, f: impl LinkColor + 'static) {
		self.config.callbacks.link_color = Rc::new(f);
	}

	pub fn set_node_radius(&mut self, f: impl NodeRadius + 'static) {
		self.config.callbacks.node_radius = Rc::new(f);
	}

	pub fn set_start_position(&mut self, f: impl StartPosition + 'static) {
		self.config.callbacks.start_position = Rc::new(f);
	}

	pub fn set_tooltip_content(&mut self, f: impl TooltipContent + 'static) {
		self.config.callbacks.tooltip_content = Rc::new(f);
	}

	pub fn set_link_force(&mut self, f: impl LinkForce + 'static) {
		self.config.callbacks.link_force = Rc::new(f);
	}

	/// Changes the viewport size; nodes are pulled inside on the next frame.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.config.options.width = width;
		self.config.options.height = height;
		if let Some(sim) = self.sim.as_mut() {
			sim.restart();
		}
		debug!("resized to {width}x{height}");
	}

	/// Advances ramp, simulation and transitions to `now_ms` and projects the
	/// result.
	pub fn frame(&mut self, now_ms: f64) -> Frame {
		let Some(sim) = self.sim.as_mut() else {
			return Frame {
				width: self.config.options.width,
				height: self.config.options.height,
				..Frame::default()
			};
		};

		sim.advance_ramp(now_ms, &self.config);
		sim.tick(&self.config);
		sim.clamp_all(&self.config);

		let mut frame = Frame::project(sim, &self.scene, &self.config, now_ms);
		frame.tooltip = self.interaction.tooltip.visual(now_ms);

		for node in sim.nodes_mut() {
			if node.enter.is_some_and(|t| t.is_finished(now_ms)) {
				node.enter = None;
			}
		}
		for link in sim.links_mut() {
			if link.enter.is_some_and(|t| t.is_finished(now_ms)) {
				link.enter = None;
			}
		}
		self.scene.purge(now_ms);
		frame
	}

	/// Whether another frame would change anything.
	pub fn is_animating(&self, now_ms: f64) -> bool {
		let Some(sim) = self.sim.as_ref() else {
			return false;
		};
		sim.is_running()
			|| !self.scene.is_empty()
			|| sim.nodes().iter().any(|n| n.enter.is_some())
			|| sim.links().iter().any(|l| l.enter.is_some())
			|| self.interaction.tooltip.visual(now_ms).is_some()
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.pointer_down(sim, &self.config, x, y);
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.pointer_move(sim, &self.config, x, y, now_ms);
		}
	}

	pub fn pointer_up(&mut self, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.pointer_up(sim, &self.config, now_ms);
		}
	}

	pub fn pointer_leave_surface(&mut self, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.pointer_leave_surface(sim, &self.config, now_ms);
		}
	}

	pub fn hover_node(&mut self, key: &str, x: f64, y: f64, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.hover_node(sim, &self.config, key, x, y, now_ms);
		}
	}

	pub fn leave_node(&mut self, key: &str, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.leave_node(sim, &self.config, key, now_ms);
		}
	}

	pub fn click_node(&mut self, key: &str, now_ms: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.click_node(sim, &self.config, key, now_ms);
		}
	}

	pub fn drag_start(&mut self, key: &str, x: f64, y: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.drag_start(sim, &self.config, key, x, y);
		}
	}

	pub fn drag_move(&mut self, x: f64, y: f64) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.drag_move(sim, &self.config, x, y);
		}
	}

	pub fn drag_end(&mut self) {
		if let Some(sim) = self.sim.as_mut() {
			self.interaction.drag_end(sim);
		}
	}
}

fn report(err: GraphError) -> GraphError {
	error!("{err}");
	err
}
