//! dynamic-graph: an incrementally updated force-directed graph.
//!
//! This crate provides a WASM-based graph visualization whose data can be
//! swapped at any time: nodes that survive an update keep their layout, new
//! ones grow in and removed ones fade out. Hovering highlights a node's
//! neighborhood, clicking pins it and dragging repositions it.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	DynamicGraph, DynamicGraphCanvas, GraphData, GraphError, GraphLink, GraphNode, Options,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("dynamic-graph: logging initialized");
}

/// Parses the JSON body of the `<script>` element with the given id.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("dynamic-graph: failed to parse #{id}: {e}");
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let data: GraphData = load_script_json("graph-data")?;
	info!(
		"dynamic-graph: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Some(data)
}

/// Load options from a script element with id="graph-options".
/// Missing fields keep their defaults; `{"preset": "labelled"}` starts from
/// the labelled preset instead.
fn load_options() -> Options {
	let Some(serde_json::Value::Object(mut map)) = load_script_json("graph-options") else {
		return Options::default();
	};
	let mut options = match map.remove("preset").as_ref().and_then(|p| p.as_str()) {
		Some("labelled") => Options::labelled(),
		_ => Options::default(),
	};
	if let Err(e) = options.merge(map) {
		warn!("dynamic-graph: ignoring graph options: {e}");
	}
	options
}

/// Main application component.
/// Loads graph data and options from the DOM and renders the graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let options = load_options();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Dynamic Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<DynamicGraphCanvas data=graph_signal options=options fullscreen=true />
			<div class="graph-overlay">
				<h1>"Dynamic Graph"</h1>
				<p class="subtitle">"Hover to highlight neighbors. Click to pin. Drag nodes to reposition."</p>
			</div>
		</div>
	}
}
