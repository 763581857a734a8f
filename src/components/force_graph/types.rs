//! Graph data structures supplied by the caller.

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// Reads a node key that may be written as a string or a number.
fn key_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(n.to_string()),
		other => Err(de::Error::custom(format!("expected a string or number key, got {other}"))),
	}
}

/// A node record as supplied by the caller.
///
/// The identity of a node is read from the property named by
/// `Options::node_ref_prop` (`"id"` unless reconfigured), so the key lives in
/// [`GraphNode::props`] together with any other caller fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Optional display label. Falls back to the node key when rendering labels.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// Optional group name, available to color callbacks.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<String>,
	/// Optional grid cell used for reproducible start placement.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub grid: Option<GridCell>,
	/// Every other field of the record, including the identity field.
	#[serde(flatten)]
	pub props: Map<String, Value>,
}

impl GraphNode {
	/// Creates a node whose `"id"` property is `id`.
	pub fn new(id: impl Into<String>) -> Self {
		let mut props = Map::new();
		props.insert("id".to_string(), Value::String(id.into()));
		Self {
			props,
			..Self::default()
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_grid(mut self, column: u32, row: u32) -> Self {
		self.grid = Some(GridCell { column, row });
		self
	}

	/// Sets an arbitrary property on the record.
	pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	/// Identity key read from property `ref_prop`.
	///
	/// Strings are used verbatim and numbers by their decimal text; any other
	/// value (or a missing property) means the node has no usable key. The
	/// typed text fields `label`, `color` and `group` can serve as keys too.
	pub fn key(&self, ref_prop: &str) -> Option<String> {
		match ref_prop {
			"label" => return self.label.clone(),
			"color" => return self.color.clone(),
			"group" => return self.group.clone(),
			_ => {}
		}
		match self.props.get(ref_prop)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		}
	}
}

/// Column/row pair placing a node in a coarse grid over the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
	pub column: u32,
	pub row: u32,
}

/// An edge between two nodes, referring to them by key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node key.
	#[serde(alias = "sourceId", deserialize_with = "key_text")]
	pub source: String,
	/// Target node key.
	#[serde(alias = "targetId", deserialize_with = "key_text")]
	pub target: String,
	/// Optional discriminator used by link force and color callbacks.
	#[serde(default, alias = "linkType", skip_serializing_if = "Option::is_none")]
	pub link_type: Option<String>,
	/// Optional base stroke width, overriding `unfocusStrokeThickness`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thickness: Option<f64>,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			..Self::default()
		}
	}

	pub fn with_type(mut self, link_type: impl Into<String>) -> Self {
		self.link_type = Some(link_type.into());
		self
	}

	/// Identity key: `source-target`, suffixed with `-link_type` when typed.
	pub fn key(&self) -> String {
		match &self.link_type {
			Some(kind) => format!("{}-{}-{}", self.source, self.target, kind),
			None => format!("{}-{}", self.source, self.target),
		}
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
