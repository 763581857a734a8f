//! Leptos component wrapping the dynamic graph canvas.
//!
//! The component creates an HTML canvas element plus an HTML tooltip overlay
//! and wires mouse events to the graph's pointer handlers. An animation loop
//! runs via `requestAnimationFrame`, advancing the graph and drawing each frame.
//! Whenever the `data` signal changes the graph is reconciled with the new
//! nodes and links.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::config::Options;
use super::render;
use super::state::DynamicGraph;
use super::theme::Theme;
use super::types::GraphData;
use super::visual::TooltipVisual;

/// Bundles the graph with its drawing surface and theme.
struct GraphContext {
	graph: DynamicGraph,
	canvas: HtmlCanvasElement,
	theme: Theme,
	/// Set by input and data changes; forces a redraw on the next frame.
	dirty: bool,
}

/// Milliseconds from the page's high-resolution clock.
fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Canvas-local pointer position of a mouse event.
fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top())
}

fn tooltip_style(tooltip: Option<&TooltipVisual>) -> String {
	match tooltip {
		Some(t) => format!(
			"position: absolute; pointer-events: none; left: {}px; top: {}px; opacity: {};",
			t.x, t.y, t.opacity
		),
		None => "position: absolute; pointer-events: none; display: none;".to_string(),
	}
}

/// Renders an interactive dynamic graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; each change is reconciled
/// against what is on screen, so retained nodes keep their positions. The
/// component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn DynamicGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = Options::default())] options: Options,
	#[prop(default = Theme::default())] theme: Theme,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let tooltip = RwSignal::new(None::<TooltipVisual>);
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((options.width, options.height))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.filter(|w| *w > 0.0)
						.unwrap_or(options.width)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.filter(|h| *h > 0.0)
						.unwrap_or(options.height)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx,
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			error!("2d context has an unexpected type");
			return;
		};

		let mut graph = DynamicGraph::new(Options {
			width: w,
			height: h,
			..options.clone()
		});
		let _ = graph.update_data(data.get_untracked(), now_ms());
		*context_init.borrow_mut() = Some(GraphContext {
			graph,
			canvas: canvas.clone(),
			theme: theme.clone(),
			dirty: true,
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.graph.resize(nw, nh);
					c.dirty = true;
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let now = now_ms();
				if c.dirty || c.graph.is_animating(now) {
					let frame = c.graph.frame(now);
					render::render(&frame, &ctx, &c.theme);
					if tooltip.with_untracked(|t| *t != frame.tooltip) {
						tooltip.set(frame.tooltip);
					}
					c.dirty = false;
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_data = context.clone();
	Effect::new(move |_| {
		let next = data.get();
		if let Some(ref mut c) = *context_data.borrow_mut() {
			let _ = c.graph.update_data(next, now_ms());
			c.dirty = true;
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(ref mut c) = *context_md.borrow_mut() {
			let (x, y) = local_position(&c.canvas, &ev);
			c.graph.pointer_down(x, y);
			c.dirty = true;
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			let (x, y) = local_position(&c.canvas, &ev);
			c.graph.pointer_move(x, y, now_ms());
			c.dirty = true;
			let cursor = match (c.graph.interaction().drag(), c.graph.interaction().hovered()) {
				(Some(_), _) => "grabbing",
				(None, Some(_)) => "pointer",
				(None, None) => "default",
			};
			let _ = web_sys::HtmlElement::style(&c.canvas).set_property("cursor", cursor);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.graph.pointer_up(now_ms());
			c.dirty = true;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.graph.pointer_leave_surface(now_ms());
			c.dirty = true;
			let _ = web_sys::HtmlElement::style(&c.canvas).set_property("cursor", "default");
		}
	};

	view! {
		<div class="dynamic-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="dynamic-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block;"
			/>
			<div
				class="dynamic-graph-tooltip"
				style=move || tooltip.with(|t| tooltip_style(t.as_ref()))
				inner_html=move || tooltip.with(|t| t.as_ref().map(|t| t.html.clone()).unwrap_or_default())
			/>
		</div>
	}
}
