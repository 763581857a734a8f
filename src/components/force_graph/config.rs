//! Public configuration surface.
//!
//! Configuration is split in two:
//! - [`Options`]: plain named values, serializable, readable and writable by
//!   name through `serde_json::Value` (names are the camelCase keys, e.g.
//!   `transitionTime`, `nodeRefProp`).
//! - [`Callbacks`]: caller-overridable behavior, one trait per concern. Every
//!   trait is implemented for matching closures, so
//!   `graph.set_node_color(|n: &GraphNode| "tomato".to_string())` works.
//!
//! Nothing here is cached: callbacks are invoked each time a value is needed,
//! so swapping one takes effect on the next frame.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{GraphError, Result};
use super::types::{GraphLink, GraphNode};

/// How unfocused nodes are de-emphasized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimming {
	/// Lower the node's opacity to `unfocusOpacity`.
	#[default]
	Opacity,
	/// Darken the node's color to `unfocusBrightness`.
	Brightness,
}

/// Named tuning values. Field docs give the JSON name where it differs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	/// Pixels at the top of the viewport nodes may not enter.
	pub top_offset: f64,
	/// Enter/exit transition length in milliseconds.
	pub transition_time: f64,
	/// Strength of the pull toward the viewport centre, per axis.
	pub centering_force: f64,
	/// Node property holding the identity key.
	pub node_ref_prop: String,
	pub unfocus_opacity: f64,
	pub focus_opacity: f64,
	/// Base link stroke width (links may override with `thickness`).
	pub unfocus_stroke_thickness: f64,
	/// Focused stroke width; the ratio to the base width is the focus scale factor.
	pub focus_stroke_thickness: f64,
	/// Brightness of unfocused nodes when `dimming` is `brightness`.
	pub unfocus_brightness: f64,
	pub dimming: Dimming,
	/// Whether node labels are drawn.
	pub show_labels: bool,
	pub focus_label_size: f64,
	pub unfocus_label_size: f64,
	pub tooltip_x_offset: f64,
	pub tooltip_y_offset: f64,
	/// Tooltip opacity when shown.
	pub tooltip_opacity: f64,
	pub tooltip_fade_in: f64,
	pub tooltip_fade_out: f64,
	/// Default link rest length.
	pub link_distance: f64,
	/// Pairwise charge; negative values repel.
	pub charge_strength: f64,
	/// Extra spacing added to each radius for collision.
	pub collision_padding: f64,
	/// Fraction of an overlap corrected per step.
	pub collision_strength: f64,
	/// Velocity decay used while the energy ramp runs.
	pub velocity_decay: f64,
	/// Velocity decay once the ramp has finished.
	pub settled_velocity_decay: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha at the start of the energy ramp after a data update.
	pub ramp_start_alpha: f64,
	/// Alpha reached at the end of the energy ramp.
	pub ramp_target_alpha: f64,
	/// Ramp length in milliseconds.
	pub ramp_duration: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Grid used to place entering nodes that carry a `grid` cell.
	pub grid_columns: u32,
	pub grid_rows: u32,
	/// Maximum random offset from a placement anchor, in pixels.
	pub placement_jitter: f64,
	/// Extra pixels around a node that still count as a hit.
	pub hit_padding: f64,
	/// Seed for placement jitter and coincident-node jiggle.
	pub seed: u64,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			width: 960.0,
			height: 600.0,
			top_offset: 0.0,
			transition_time: 750.0,
			centering_force: 0.005,
			node_ref_prop: "id".to_string(),
			unfocus_opacity: 0.4,
			focus_opacity: 0.95,
			unfocus_stroke_thickness: 0.5,
			focus_stroke_thickness: 5.0,
			unfocus_brightness: 0.5,
			dimming: Dimming::Opacity,
			show_labels: false,
			focus_label_size: 14.0,
			unfocus_label_size: 10.0,
			tooltip_x_offset: 16.0,
			tooltip_y_offset: 24.0,
			tooltip_opacity: 0.9,
			tooltip_fade_in: 200.0,
			tooltip_fade_out: 500.0,
			link_distance: 10.0,
			charge_strength: -500.0,
			collision_padding: 5.0,
			collision_strength: 0.7,
			velocity_decay: 0.9,
			settled_velocity_decay: 0.9,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			ramp_start_alpha: 0.05,
			ramp_target_alpha: 0.4,
			ramp_duration: 2000.0,
			drag_alpha_target: 0.3,
			grid_columns: 4,
			grid_rows: 4,
			placement_jitter: 50.0,
			hit_padding: 4.0,
			seed: 0x5eed,
		}
	}
}

impl Options {
	/// Preset with labels and brightness-based dimming.
	///
	/// Looser collision padding and a lighter decay that tightens once the
	/// energy ramp ends, with a stronger centering pull.
	pub fn labelled() -> Self {
		Self {
			centering_force: 0.05,
			dimming: Dimming::Brightness,
			show_labels: true,
			link_distance: 30.0,
			charge_strength: -300.0,
			collision_padding: 2.0,
			collision_strength: 0.5,
			velocity_decay: 0.4,
			settled_velocity_decay: 0.6,
			top_offset: 40.0,
			..Self::default()
		}
	}

	/// Base-to-focus stroke ratio applied to links touching a focused node.
	pub fn focus_stroke_factor(&self) -> f64 {
		if self.unfocus_stroke_thickness > 0.0 {
			(self.focus_stroke_thickness / self.unfocus_stroke_thickness).max(1.0)
		} else {
			1.0
		}
	}

	/// Reads one option by its JSON name.
	pub fn get(&self, name: &str) -> Result<Value> {
		let Value::Object(mut all) = serde_json::to_value(self)? else {
			return Err(GraphError::UnknownOption(name.to_string()));
		};
		all.remove(name)
			.ok_or_else(|| GraphError::UnknownOption(name.to_string()))
	}

	/// Writes one option by its JSON name.
	pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
		let mut update = Map::new();
		update.insert(name.to_string(), value);
		self.merge(update).map_err(|e| match e {
			GraphError::Options(source) => GraphError::InvalidOption {
				name: name.to_string(),
				source,
			},
			other => other,
		})
	}

	/// Overlays `updates` on the current values.
	///
	/// Either every update is applied or none is: unknown names and values of
	/// the wrong type leave `self` untouched.
	pub fn merge(&mut self, updates: Map<String, Value>) -> Result<()> {
		let Value::Object(mut all) = serde_json::to_value(&*self)? else {
			return Ok(());
		};
		for (name, value) in updates {
			if !all.contains_key(&name) {
				return Err(GraphError::UnknownOption(name));
			}
			all.insert(name, value);
		}
		*self = serde_json::from_value(Value::Object(all))?;
		Ok(())
	}
}

/// Axis selector for [`StartPosition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

/// Fill color of a node.
pub trait NodeColor {
	fn node_color(&self, node: &GraphNode) -> String;
}

/// Stroke color of a link.
pub trait LinkColor {
	fn link_color(&self, link: &GraphLink) -> String;
}

/// Radius of a node in pixels.
pub trait NodeRadius {
	fn node_radius(&self, node: &GraphNode) -> f64;
}

/// Caller placement of an entering node on one axis; `None` defers to grid or
/// random placement.
pub trait StartPosition {
	fn start_position(&self, node: &GraphNode, axis: Axis) -> Option<f64>;
}

/// HTML shown in the tooltip of a hovered node.
pub trait TooltipContent {
	fn tooltip_html(&self, node: &GraphNode, key: &str) -> String;
}

/// Rest distance and stiffness of a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkParams {
	pub distance: f64,
	/// `None` uses the degree-based default `1 / min(deg(source), deg(target))`.
	pub strength: Option<f64>,
}

/// Per-link physical parameters, typically keyed on `link_type`.
pub trait LinkForce {
	fn link_params(&self, link: &GraphLink, options: &Options) -> LinkParams;
}

impl<F: Fn(&GraphNode) -> String> NodeColor for F {
	fn node_color(&self, node: &GraphNode) -> String {
		self(node)
	}
}

impl<F: Fn(&GraphLink) -> String> LinkColor for F {
	fn link_color(&self, link: &GraphLink) -> String {
		self(link)
	}
}

impl<F: Fn(&GraphNode) -> f64> NodeRadius for F {
	fn node_radius(&self, node: &GraphNode) -> f64 {
		self(node)
	}
}

impl<F: Fn(&GraphNode, Axis) -> Option<f64>> StartPosition for F {
	fn start_position(&self, node: &GraphNode, axis: Axis) -> Option<f64> {
		self(node, axis)
	}
}

impl<F: Fn(&GraphNode, &str) -> String> TooltipContent for F {
	fn tooltip_html(&self, node: &GraphNode, key: &str) -> String {
		self(node, key)
	}
}

impl<F: Fn(&GraphLink, &Options) -> LinkParams> LinkForce for F {
	fn link_params(&self, link: &GraphLink, options: &Options) -> LinkParams {
		self(link, options)
	}
}

/// Uses the node's own `color` field, else sky blue.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNodeColor;

impl NodeColor for DefaultNodeColor {
	fn node_color(&self, node: &GraphNode) -> String {
		node.color.clone().unwrap_or_else(|| "skyblue".to_string())
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLinkColor;

impl LinkColor for DefaultLinkColor {
	fn link_color(&self, _link: &GraphLink) -> String {
		"white".to_string()
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNodeRadius;

impl NodeRadius for DefaultNodeRadius {
	fn node_radius(&self, _node: &GraphNode) -> f64 {
		5.0
	}
}

/// Never places; every node falls through to grid or random placement.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStartPosition;

impl StartPosition for NoStartPosition {
	fn start_position(&self, _node: &GraphNode, _axis: Axis) -> Option<f64> {
		None
	}
}

/// Shows the node key.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyTooltip;

impl TooltipContent for KeyTooltip {
	fn tooltip_html(&self, _node: &GraphNode, key: &str) -> String {
		key.to_string()
	}
}

/// Same distance for every link, degree-based strength.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformLinkForce;

impl LinkForce for UniformLinkForce {
	fn link_params(&self, _link: &GraphLink, options: &Options) -> LinkParams {
		LinkParams {
			distance: options.link_distance,
			strength: None,
		}
	}
}

/// Caller-overridable behavior.
#[derive(Clone)]
pub struct Callbacks {
	pub node_color: Rc<dyn NodeColor>,
	pub link_color: Rc<dyn LinkColor>,
	pub node_radius: Rc<dyn NodeRadius>,
	pub start_position: Rc<dyn StartPosition>,
	pub tooltip_content: Rc<dyn TooltipContent>,
	pub link_force: Rc<dyn LinkForce>,
}

impl Default for Callbacks {
	fn default() -> Self {
		Self {
			node_color: Rc::new(DefaultNodeColor),
			link_color: Rc::new(DefaultLinkColor),
			node_radius: Rc::new(DefaultNodeRadius),
			start_position: Rc::new(NoStartPosition),
			tooltip_content: Rc::new(KeyTooltip),
			link_force: Rc::new(UniformLinkForce),
		}
	}
}

impl fmt::Debug for Callbacks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callbacks").finish_non_exhaustive()
	}
}

/// Options plus callbacks: everything the engine reads while running.
#[derive(Clone, Debug, Default)]
pub struct GraphConfig {
	pub options: Options,
	pub callbacks: Callbacks,
}

impl GraphConfig {
	pub fn new(options: Options) -> Self {
		Self {
			options,
			callbacks: Callbacks::default(),
		}
	}

	/// Radius of `node`, never negative.
	pub fn radius(&self, node: &GraphNode) -> f64 {
		self.callbacks.node_radius.node_radius(node).max(0.0)
	}

	pub fn node_color(&self, node: &GraphNode) -> String {
		self.callbacks.node_color.node_color(node)
	}

	pub fn link_color(&self, link: &GraphLink) -> String {
		self.callbacks.link_color.link_color(link)
	}

	pub fn start_position(&self, node: &GraphNode, axis: Axis) -> Option<f64> {
		self.callbacks.start_position.start_position(node, axis)
	}

	pub fn tooltip_html(&self, node: &GraphNode, key: &str) -> String {
		self.callbacks.tooltip_content.tooltip_html(node, key)
	}

	pub fn link_params(&self, link: &GraphLink) -> LinkParams {
		self.callbacks.link_force.link_params(link, &self.options)
	}
}
