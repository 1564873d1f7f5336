use leptos::prelude::*;
use log::warn;

use crate::components::fold_preview::FoldPreview;
use crate::components::fold_preview::format::{DEFAULT_TAB_SIZE, MAX_TAB_SIZE, pretty};

/// A square base with both diagonals and its four triangular faces.
const SAMPLE: &str = r#"{
  "file_spec": 1.1,
  "file_creator": "fold-preview",
  "vertices_coords": [[0, 0], [1, 0], [1, 1], [0, 1], [0.5, 0.5]],
  "edges_vertices": [[0, 1], [1, 2], [2, 3], [3, 0], [0, 4], [1, 4], [2, 4], [3, 4]],
  "edges_assignment": ["B", "B", "B", "B", "M", "V", "M", "V"],
  "faces_vertices": [[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]]
}"#;

/// Live JSON editor beside the diagram
#[component]
pub fn Preview() -> impl IntoView {
	let text = RwSignal::new(SAMPLE.to_owned());
	let tab_size = RwSignal::new(DEFAULT_TAB_SIZE);
	let format_error = RwSignal::new(None::<String>);

	let format = move |_: leptos::ev::MouseEvent| match pretty(&text.get_untracked(), tab_size.get_untracked()) {
		Ok(formatted) => {
			format_error.set(None);
			text.set(formatted);
		}
		Err(err) => {
			warn!("{err}");
			format_error.set(Some(err.to_string()));
		}
	};

	view! {
		<div class="preview-page" style="display: flex; height: 100vh;">
			<div class="editor-pane" style="display: flex; flex-direction: column; width: 40%;">
				<div class="controls">
					<button class="btn" on:click=format>"Format"</button>
					<label>
						"Indent "
						<input
							type="number"
							min="0"
							max=MAX_TAB_SIZE.to_string()
							prop:value=move || tab_size.get().to_string()
							on:change=move |ev| {
								if let Ok(n) = event_target_value(&ev).parse::<usize>() {
									tab_size.set(n.min(MAX_TAB_SIZE));
								}
							}
						/>
					</label>
					<span class="error">{move || format_error.get().unwrap_or_default()}</span>
				</div>
				<textarea
					spellcheck="false"
					style="flex: 1; font-family: monospace;"
					prop:value=move || text.get()
					on:input=move |ev| text.set(event_target_value(&ev))
				/>
			</div>
			<div class="diagram-pane" style="flex: 1;">
				<FoldPreview source=text />
			</div>
		</div>
	}
}
