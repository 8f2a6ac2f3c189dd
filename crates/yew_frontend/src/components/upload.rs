//! Image upload form

use crate::api::{can_submit, is_accepted_file, language_label};
use web_sys::{Event, File, HtmlInputElement, HtmlSelectElement, Url};
use yew::prelude::*;

/// What the form hands to the app on submit
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub file: File,
    pub api_key: String,
    pub language: String,
}

#[derive(Properties, PartialEq)]
pub struct UploadProps {
    /// No key on the server, so the user must type one
    pub require_key: bool,
    /// A request is in flight
    pub busy: bool,
    /// Language codes offered by the server
    pub languages: Vec<String>,
    pub default_language: String,
    pub on_submit: Callback<UploadRequest>,
}

#[function_component(UploadForm)]
pub fn upload_form(props: &UploadProps) -> Html {
    let file = use_state(|| None::<File>);
    let preview = use_state(|| None::<String>);
    let notice = use_state(|| None::<String>);
    let api_key = use_state(String::new);
    // Unset until the user picks one, so a late-loading server default still applies
    let picked_language = use_state(|| None::<String>);
    let language = (*picked_language)
        .clone()
        .unwrap_or_else(|| props.default_language.clone());

    let on_file_change = {
        let file = file.clone();
        let preview = preview.clone();
        let notice = notice.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let selected = input.files().and_then(|list| list.get(0));

            if let Some(old) = (*preview).as_ref() {
                let _ = Url::revoke_object_url(old);
            }

            match selected {
                Some(f) if !is_accepted_file(&f.name()) => {
                    notice.set(Some("Please choose a JPG, JPEG or PNG image.".to_string()));
                    file.set(None);
                    preview.set(None);
                }
                Some(f) if f.size() == 0.0 => {
                    notice.set(Some("The selected file is empty.".to_string()));
                    file.set(None);
                    preview.set(None);
                }
                Some(f) => {
                    preview.set(Url::create_object_url_with_blob(&f).ok());
                    notice.set(None);
                    file.set(Some(f));
                }
                None => {
                    file.set(None);
                    preview.set(None);
                }
            }
        })
    };

    let on_key_input = {
        let api_key = api_key.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            api_key.set(input.value());
        })
    };

    let on_language_change = {
        let picked_language = picked_language.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            picked_language.set(Some(select.value()));
        })
    };

    let enabled = !props.busy && can_submit(file.is_some(), &api_key, !props.require_key);

    let on_click = {
        let file = file.clone();
        let api_key = api_key.clone();
        let language = language.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(f) = (*file).clone() {
                on_submit.emit(UploadRequest {
                    file: f,
                    api_key: (*api_key).clone(),
                    language: language.clone(),
                });
            }
        })
    };

    html! {
        <div class="upload-component">
            <h2>{ "Upload a photo of your dish" }</h2>
            <input
                type="file"
                accept=".jpg,.jpeg,.png,image/jpeg,image/png"
                onchange={on_file_change}
                data-testid="file-input"
            />
            if let Some(message) = (*notice).clone() {
                <p class="notice" data-testid="file-notice">{ message }</p>
            }
            if let Some(url) = (*preview).clone() {
                <img class="preview" src={url} alt="Uploaded image" />
            }

            <div class="settings">
                <label>
                    { "Google API key" }
                    <input
                        type="password"
                        placeholder={if props.require_key { "Required" } else { "Optional (server key configured)" }}
                        value={(*api_key).clone()}
                        oninput={on_key_input}
                        data-testid="api-key"
                    />
                </label>
                <label>
                    { "Language" }
                    <select onchange={on_language_change}>
                        { for props.languages.iter().map(|code| html! {
                            <option value={code.clone()} selected={*code == language}>
                                { language_label(code) }
                            </option>
                        })}
                    </select>
                </label>
            </div>

            if props.require_key && api_key.trim().is_empty() {
                <p class="warning">{ "Please enter your Google API key to use the application." }</p>
            }

            <button disabled={!enabled} onclick={on_click} data-testid="submit-button">
                { if props.busy { "Analyzing..." } else { "Identify Food & Get Recipes" } }
            </button>
        </div>
    }
}
