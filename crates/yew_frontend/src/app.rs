//! Main application component

use crate::api::{self, AnalyzeResponse, ApiFailure, ServerConfig};
use crate::components::results::{FailureView, Results};
use crate::components::upload::{UploadForm, UploadRequest};
use yew::prelude::*;

/// What the main panel is showing
#[derive(Clone, PartialEq, Debug)]
pub enum ViewState {
    Idle,
    Running,
    Done(AnalyzeResponse),
    Failed(ApiFailure),
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_state(ServerConfig::default);
    let view = use_state(|| ViewState::Idle);

    {
        let config = config.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::fetch_config().await {
                    Ok(loaded) => config.set(loaded),
                    Err(e) => gloo::console::error!(format!("Failed to load server config: {}", e)),
                }
            });
            || ()
        });
    }

    let on_submit = {
        let view = view.clone();
        Callback::from(move |request: UploadRequest| {
            let view = view.clone();
            view.set(ViewState::Running);
            wasm_bindgen_futures::spawn_local(async move {
                let result =
                    api::analyze(&request.file, &request.api_key, &request.language).await;
                match result {
                    Ok(outcome) => view.set(ViewState::Done(outcome)),
                    Err(failure) => view.set(ViewState::Failed(failure)),
                }
            });
        })
    };

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{ "Food AI & Recipe Generator" }</h1>
                <p>{ "Upload an image of food, and we'll tell you what it is and suggest some recipes." }</p>
            </header>
            <main class="app-main">
                <UploadForm
                    require_key={!config.server_key_configured}
                    languages={config.languages.clone()}
                    default_language={config.default_language.clone()}
                    busy={*view == ViewState::Running}
                    {on_submit}
                />
                {
                    match &*view {
                        ViewState::Idle => html! {},
                        ViewState::Running => html! {
                            <p class="spinner">{ "Analyzing image and generating recipes..." }</p>
                        },
                        ViewState::Done(outcome) => html! { <Results outcome={outcome.clone()} /> },
                        ViewState::Failed(failure) => html! { <FailureView failure={failure.clone()} /> },
                    }
                }
            </main>
        </div>
    }
}
