use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, HtmlInputElement, HtmlTextAreaElement,
	KeyboardEvent, MessageEvent, MouseEvent, ResizeObserver, WheelEvent, Window,
};

use super::canvas;
use super::config::{ConfigStore, LocalStorageStore, MemoryStore, StyleConfig, seed_defaults};
use super::legend::{self, LegendEntry, Swatch};
use super::message::HostMessage;
use super::state::{Command, LabelKind, LabelVisibility, PreviewState, canvas_size};
use super::transform::Point;

/// Window-level listeners kept alive for the component's lifetime.
#[derive(Default)]
struct Listeners {
	resize: Option<Closure<dyn FnMut()>>,
	message: Option<Closure<dyn FnMut(MessageEvent)>>,
	keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
	mousemove: Option<Closure<dyn FnMut(MouseEvent)>>,
	mouseup: Option<Closure<dyn FnMut(MouseEvent)>>,
	/// Watches the container and legend boxes.
	observer: Option<ResizeObserver>,
	observed: Option<Closure<dyn FnMut(js_sys::Array)>>,
}

impl Listeners {
	fn window_callbacks(&self) -> [(&'static str, Option<&js_sys::Function>); 5] {
		[
			("resize", self.resize.as_ref().map(|c| c.as_ref().unchecked_ref())),
			("message", self.message.as_ref().map(|c| c.as_ref().unchecked_ref())),
			("keydown", self.keydown.as_ref().map(|c| c.as_ref().unchecked_ref())),
			("mousemove", self.mousemove.as_ref().map(|c| c.as_ref().unchecked_ref())),
			("mouseup", self.mouseup.as_ref().map(|c| c.as_ref().unchecked_ref())),
		]
	}
}

impl Drop for Listeners {
	fn drop(&mut self) {
		if let Some(observer) = &self.observer {
			observer.disconnect();
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		for (event, cb) in self.window_callbacks() {
			if let Some(cb) = cb {
				let _ = window.remove_event_listener_with_callback(event, cb);
			}
		}
		if self.observed.is_some() {
			debug!("FOLD preview listeners detached");
		}
	}
}

/// Reads the stored style, persisting any default keys the store lacks.
fn initial_config() -> StyleConfig {
	match LocalStorageStore::open() {
		Some(mut store) => seed_and_load(&mut store),
		None => {
			warn!("localStorage unavailable, style changes will not persist");
			seed_and_load(&mut MemoryStore::default())
		}
	}
}

fn seed_and_load(store: &mut impl ConfigStore) -> StyleConfig {
	let written = seed_defaults(store);
	if !written.is_empty() {
		debug!("persisted {} default style keys", written.len());
	}
	store.load()
}

/// Keys typed into form fields are text, not commands.
fn is_text_entry(target: Option<EventTarget>) -> bool {
	target.is_some_and(|t| {
		t.dyn_ref::<HtmlTextAreaElement>().is_some() || t.dyn_ref::<HtmlInputElement>().is_some()
	})
}

/// Inline style of the face-label toggle: hidden rather than unchecked without faces.
fn face_toggle_style(has_faces: bool) -> &'static str {
	if has_faces { "" } else { "display: none;" }
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn decode_message(ev: &MessageEvent) -> Option<HostMessage> {
	let data = ev.data();
	let json = match data.as_string() {
		Some(text) => text,
		None => js_sys::JSON::stringify(&data).ok().map(String::from)?,
	};
	HostMessage::from_json(&json)
		.map_err(|err| debug!("{err}"))
		.ok()
}

/// Interactive FOLD crease-pattern preview.
///
/// Documents arrive either from `source` (every change is an update) or from
/// host `message` events on the window.
#[component]
pub fn FoldPreview(#[prop(optional, into)] source: Option<Signal<String>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let controls_ref = NodeRef::<leptos::html::Div>::new();
	let legend_ref = NodeRef::<leptos::html::Div>::new();

	let state = Rc::new(RefCell::new(PreviewState::new(800.0, 800.0, initial_config())));
	let ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Listeners>> = Rc::new(RefCell::new(Listeners::default()));

	// Reactive mirrors of the parts of `state` the markup depends on.
	let error = RwSignal::new(None::<String>);
	let entries = RwSignal::new(Vec::<LegendEntry>::new());
	let has_faces = RwSignal::new(false);
	let labels = RwSignal::new(LabelVisibility::default());
	let zoom = RwSignal::new(1.0_f64);

	// Repaints when asked to, then refreshes the overlay either way.
	let update = {
		let (state, ctx) = (state.clone(), ctx.clone());
		move |redraw: bool| {
			let s = state.borrow();
			if redraw {
				if let Some(ctx) = ctx.borrow().as_ref() {
					canvas::paint(ctx, &s.render());
				}
			}
			error.set(s.error.clone());
			has_faces.set(s.has_faces());
			labels.set(s.labels);
			zoom.set(s.transform.zoom);
			entries.set(legend::build(&s.config, s.document.as_ref()));
		}
	};

	let apply = {
		let (state, update) = (state.clone(), update.clone());
		move |message: HostMessage| {
			let redraw = state.borrow_mut().apply(message);
			update(redraw);
		}
	};

	let command = {
		let (state, update) = (state.clone(), update.clone());
		move |command: Command| {
			state.borrow_mut().command(command);
			update(true);
		}
	};

	let toggle = {
		let (state, update) = (state.clone(), update.clone());
		move |kind: LabelKind, on: bool| {
			state.borrow_mut().set_label(kind, on);
			update(true);
		}
	};

	let resize = {
		let (state, update) = (state.clone(), update.clone());
		move || {
			let Some(container) = container_ref.get_untracked() else {
				return;
			};
			let height_of = |el: Option<web_sys::HtmlDivElement>| {
				el.map(|el| el.client_height() as f64).unwrap_or(0.0)
			};
			let (w, h) = canvas_size(
				container.client_width() as f64,
				container.client_height() as f64,
				height_of(controls_ref.get_untracked()),
				height_of(legend_ref.get_untracked()),
			);
			if let Some(canvas) = canvas_ref.get_untracked() {
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
			}
			let redraw = state.borrow_mut().resize(w, h);
			update(redraw);
		}
	};

	if let Some(source) = source {
		let apply = apply.clone();
		Effect::new(move |_| {
			apply(HostMessage::Update {
				content: Value::String(source.get()),
				config: None,
			});
		});
	}

	let (ctx_init, listeners_init) = (ctx.clone(), listeners.clone());
	let (state_init, update_init, apply_init, command_init, resize_init) = (
		state.clone(),
		update.clone(),
		apply.clone(),
		command.clone(),
		resize.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if ctx_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};
		let context = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(context) = context else {
			warn!("2d canvas context unavailable");
			return;
		};
		*ctx_init.borrow_mut() = Some(context);

		let mut l = listeners_init.borrow_mut();

		let on_resize = resize_init.clone();
		l.resize = Some(Closure::new(move || on_resize()));

		let on_message = apply_init.clone();
		l.message = Some(Closure::new(move |ev: MessageEvent| {
			if let Some(message) = decode_message(&ev) {
				on_message(message);
			}
		}));

		let on_key = command_init.clone();
		l.keydown = Some(Closure::new(move |ev: KeyboardEvent| {
			if is_text_entry(ev.target()) || ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
				return;
			}
			if let Some(command) = Command::from_key(&ev.key()) {
				on_key(command);
			}
		}));

		let (state_mm, update_mm) = (state_init.clone(), update_init.clone());
		l.mousemove = Some(Closure::new(move |ev: MouseEvent| {
			let moved = state_mm
				.borrow_mut()
				.drag_to(ev.client_x() as f64, ev.client_y() as f64);
			if moved {
				update_mm(true);
			}
		}));

		let state_mu = state_init.clone();
		l.mouseup = Some(Closure::new(move |_: MouseEvent| {
			state_mu.borrow_mut().end_drag();
		}));

		for (event, cb) in l.window_callbacks() {
			if let Some(cb) = cb {
				let _ = window.add_event_listener_with_callback(event, cb);
			}
		}

		// The legend wraps and gains entries after mount; its height feeds the canvas size.
		let on_box_resize = resize_init.clone();
		let observed: Closure<dyn FnMut(js_sys::Array)> =
			Closure::new(move |_: js_sys::Array| on_box_resize());
		match ResizeObserver::new(observed.as_ref().unchecked_ref()) {
			Ok(observer) => {
				if let Some(container) = container_ref.get_untracked() {
					observer.observe(&container);
				}
				if let Some(legend) = legend_ref.get_untracked() {
					observer.observe(&legend);
				}
				l.observer = Some(observer);
				l.observed = Some(observed);
			}
			Err(err) => warn!("ResizeObserver unavailable: {err:?}"),
		}
		drop(l);

		resize_init();
		info!("FOLD preview mounted");
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		ev.prevent_default();
		state_md
			.borrow_mut()
			.begin_drag(ev.client_x() as f64, ev.client_y() as f64);
	};

	let (state_wh, update_wh) = (state.clone(), update.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let anchor = local_position(&canvas, &ev);
		let zoomed = state_wh.borrow_mut().wheel(anchor, ev.delta_y());
		if zoomed {
			update_wh(true);
		}
	};

	let (zoom_in, zoom_out, reset, fit) = (
		command.clone(),
		command.clone(),
		command.clone(),
		command.clone(),
	);
	let (toggle_vertex, toggle_edge, toggle_face) = (toggle.clone(), toggle.clone(), toggle);
	let face_toggle = move || face_toggle_style(has_faces.get());

	view! {
		<div node_ref=container_ref class="fold-preview" style="position: relative; height: 100%; padding: 0 20px; overflow: hidden;">
			<div node_ref=controls_ref class="controls">
				<button class="btn" on:click=move |_| zoom_in(Command::ZoomIn)>"Zoom In (+)"</button>
				<button class="btn" on:click=move |_| zoom_out(Command::ZoomOut)>"Zoom Out (-)"</button>
				<button class="btn" on:click=move |_| reset(Command::Reset)>"Reset Zoom (R)"</button>
				<button class="btn" on:click=move |_| fit(Command::FitToView)>"Fit to View (F)"</button>
				<span class="zoom-level">{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
				<label>
					<input
						type="checkbox"
						prop:checked=move || labels.get().vertices
						on:change=move |ev| toggle_vertex(LabelKind::Vertex, event_target_checked(&ev))
					/>
					"Vertex Labels"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || labels.get().edges
						on:change=move |ev| toggle_edge(LabelKind::Edge, event_target_checked(&ev))
					/>
					"Edge Labels"
				</label>
				<label class="face-toggle" style=face_toggle>
					<input
						type="checkbox"
						prop:checked=move || labels.get().faces
						on:change=move |ev| toggle_face(LabelKind::Face, event_target_checked(&ev))
					/>
					"Face Labels"
				</label>
			</div>
			<canvas
				node_ref=canvas_ref
				class="fold-preview-canvas"
				on:mousedown=on_mousedown
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div node_ref=legend_ref class="legend">
				{move || {
					entries
						.get()
						.into_iter()
						.map(|entry| {
							view! {
								<div class="legend-item">
									{swatch(&entry)}
									{entry.name}
								</div>
							}
						})
						.collect_view()
				}}
			</div>
			<div class="error" style="position: absolute; bottom: 0; left: 20px; right: 20px;">
				{move || error.get().unwrap_or_default()}
			</div>
		</div>
	}
}

fn swatch(entry: &LegendEntry) -> AnyView {
	match &entry.swatch {
		Swatch::Line(stroke) => view! {
			<svg width="28" height="12" class="legend-swatch">
				<line
					x1="2"
					y1="6"
					x2="26"
					y2="6"
					stroke=stroke.color.clone()
					stroke-width=stroke.width.to_string()
					stroke-dasharray=entry.dash_array()
					stroke-linecap="round"
				/>
			</svg>
		}
		.into_any(),
		Swatch::Label {
			fill,
			border,
			border_width,
			radius,
			text,
			text_color,
			font_size,
		} => {
			let size = (2.0 * (radius + border_width)).ceil();
			let c = (size / 2.0).to_string();
			view! {
				<svg width=size.to_string() height=size.to_string() class="legend-swatch">
					<circle
						cx=c.clone()
						cy=c.clone()
						r=radius.to_string()
						fill=fill.clone()
						stroke=border.clone()
						stroke-width=border_width.to_string()
					/>
					<text
						x=c.clone()
						y=c
						text-anchor="middle"
						dominant-baseline="central"
						font-size=font_size.to_string()
						fill=text_color.clone()
					>
						{*text}
					</text>
				</svg>
			}
			.into_any()
		}
	}
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
	use leptos::mount::mount_to;
	use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
	use web_sys::{Element, HtmlElement, KeyboardEventInit};

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	const NO_FACES: &str = r#"{"vertices_coords":[[0,0],[1,0],[1,1]],"edges_vertices":[[0,1],[1,2]]}"#;
	const WITH_FACES: &str =
		r#"{"vertices_coords":[[0,0],[1,0],[1,1]],"edges_vertices":[[0,1]],"faces_vertices":[[0,1,2]]}"#;

	fn host() -> HtmlElement {
		let document = document();
		let host: HtmlElement = document
			.create_element("div")
			.unwrap()
			.dyn_into()
			.unwrap();
		host.set_attribute("style", "width: 840px; height: 700px;").unwrap();
		document.body().unwrap().append_child(&host).unwrap();
		host
	}

	fn first(host: &HtmlElement, selector: &str) -> Element {
		host.query_selector(selector).unwrap().unwrap()
	}

	async fn settle() {
		for _ in 0..4 {
			leptos::task::tick().await;
		}
	}

	#[wasm_bindgen_test]
	async fn face_toggle_is_hidden_until_faces_arrive() {
		let host = host();
		let source = RwSignal::new(NO_FACES.to_owned());
		let _mounted = mount_to(host.clone(), move || view! { <FoldPreview source=source /> });
		settle().await;

		let toggle = first(&host, "label.face-toggle");
		assert_eq!(toggle.get_attribute("style").as_deref(), Some("display: none;"));

		source.set(WITH_FACES.to_owned());
		settle().await;
		let style = toggle.get_attribute("style").unwrap_or_default();
		assert!(!style.contains("display: none"));
	}

	fn key(key: &str) -> KeyboardEvent {
		let init = KeyboardEventInit::new();
		init.set_key(key);
		init.set_bubbles(true);
		KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap()
	}

	#[wasm_bindgen_test]
	async fn keys_typed_into_inputs_are_not_commands() {
		let host = host();
		let input = document().create_element("input").unwrap();
		host.append_child(&input).unwrap();
		let source = RwSignal::new(NO_FACES.to_owned());
		let _mounted = mount_to(host.clone(), move || view! { <FoldPreview source=source /> });
		settle().await;

		let zoom_level = || first(&host, ".zoom-level").text_content().unwrap_or_default();
		input.dispatch_event(&key("-")).unwrap();
		settle().await;
		assert_eq!(zoom_level(), "100%");

		window().dispatch_event(&key("-")).unwrap();
		settle().await;
		assert_eq!(zoom_level(), "80%");
	}

	#[wasm_bindgen_test]
	async fn canvas_fills_container_less_chrome() {
		let host = host();
		let source = RwSignal::new(NO_FACES.to_owned());
		let _mounted = mount_to(host.clone(), move || view! { <FoldPreview source=source /> });
		settle().await;

		let canvas: HtmlCanvasElement = first(&host, "canvas").dyn_into().unwrap();
		let controls = first(&host, ".controls").client_height() as u32;
		assert_eq!(canvas.width(), 800);
		assert!(canvas.height() > 0);
		assert!(canvas.height() <= 700 - controls);
	}
}
