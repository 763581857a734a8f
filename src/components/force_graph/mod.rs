//! Incrementally updated force-directed graph.
//!
//! The engine is plain Rust and does not touch the DOM:
//! - [`DynamicGraph`] reconciles new node/link collections by key, so nodes
//!   that survive an update keep their position, velocity and focus;
//! - a d3-style force simulation (links, charge, centering, collision) keeps
//!   every node inside the viewport;
//! - hovering highlights a node's neighborhood and clicking pins it;
//! - every frame is projected into a [`Frame`] of draw records.
//!
//! [`DynamicGraphCanvas`] is the Leptos front end: it drives the engine from
//! `requestAnimationFrame`, forwards mouse events and draws on a 2D canvas.
//!
//! # Example
//!
//! ```ignore
//! use dynamic_graph::{DynamicGraphCanvas, GraphData, GraphLink, GraphNode, Options};
//!
//! let data = RwSignal::new(GraphData {
//!     nodes: vec![GraphNode::new("a").with_label("Node A"), GraphNode::new("b")],
//!     links: vec![GraphLink::new("a", "b")],
//! });
//!
//! view! { <DynamicGraphCanvas data=data options=Options::labelled() fullscreen=true /> }
//! ```

mod component;
pub mod config;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod interaction;
pub mod reconcile;
mod render;
pub mod simulation;
mod state;
pub mod theme;
pub mod transition;
mod types;
pub mod visual;

pub use component::DynamicGraphCanvas;
pub use config::{Axis, Callbacks, Dimming, GraphConfig, LinkParams, Options};
pub use error::GraphError;
pub use reconcile::{Diff, Reconciliation};
pub use state::DynamicGraph;
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode, GridCell};
pub use visual::Frame;
