use console_error_panic_hook::set_once;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, BlobPropertyBag, Event, HtmlAnchorElement, HtmlInputElement, Url};

use controller::{ViewUpdate, Viewer, ViewerError, ViewerLocation};
use formats::{QueryParams, SAVED_STATE_FILE_NAME};
use tracing::{debug, error, info};

mod fetch;
mod gui;
mod logging;
mod renderer;

use gui::Gui;
use renderer::JsRenderer;

/// Element the renderer draws into.
const RENDER_CONTAINER: &str = "three";

struct App {
    viewer: Viewer<JsRenderer>,
    gui: Gui,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Runs `action` against the viewer and refreshes the widgets it touched.
/// Returns `None` before the viewer has started.
pub(crate) fn dispatch<T>(action: impl FnOnce(&mut Viewer<JsRenderer>) -> T) -> Option<T> {
    APP.with(|app_ref| {
        let mut app = app_ref.borrow_mut();
        let app = app.as_mut()?;
        let out = action(&mut app.viewer);
        let updates = app.viewer.drain_updates();
        app.gui.apply(&app.viewer, &updates);
        if updates.iter().any(|u| u.is_full_rebuild())
            && let Some(url) = app.gui.stale_distance_url(&app.viewer)
        {
            refresh_distance_range(url);
        }
        Some(out)
    })
}

/// Fetches the section distance range from `url` and rebuilds the panel
/// with it, unless the section has changed server in the meantime.
fn refresh_distance_range(url: String) {
    debug!(url, "fetching section distance range");
    spawn_local(async move {
        let range = fetch::fetch_distance_range(&url).await;
        APP.with(|app_ref| {
            if let Some(app) = app_ref.borrow_mut().as_mut()
                && app.gui.set_distance_range(&url, range)
            {
                app.gui.apply(&app.viewer, &[ViewUpdate::Rebuild]);
            }
        });
    });
}

pub(crate) fn alert(msg: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(msg);
    }
}

fn report(err: &ViewerError) {
    error!(%err, "viewer error");
    alert(&err.to_string());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    logging::init();
    Ok(())
}

/// Reads the page URL, fetches the configuration and brings up the viewer.
#[wasm_bindgen]
pub fn open_viewer() {
    spawn_local(async move {
        if let Err(err) = open_viewer_inner().await {
            report(&err);
        }
    });
}

async fn open_viewer_inner() -> Result<(), ViewerError> {
    if !renderer::webgl_available() {
        return Err(ViewerError::UnsupportedEnvironment);
    }
    let href = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();
    let params = QueryParams::parse(&href);
    let location = ViewerLocation::from_params(&params)?;
    let config = fetch::fetch_config(&location.config_path).await?;

    let renderer = JsRenderer::create(RENDER_CONTAINER).map_err(|err| {
        error!(?err, "renderer creation failed");
        ViewerError::UnsupportedEnvironment
    })?;
    let (mut viewer, param_error) = Viewer::start(renderer, &params, location, config);
    if let Some(err) = param_error {
        report(&ViewerError::from(err));
    }
    let help_file = viewer.state().help_file.clone();

    let Some(doc) = gui::document() else {
        return Ok(());
    };
    let mut gui = Gui::default();
    gui.bind_page(&doc);
    let updates = viewer.drain_updates();
    gui.apply(&viewer, &updates);
    let distance_url = gui.stale_distance_url(&viewer);
    info!(title = viewer.state().display_title(), "viewer ready");
    APP.with(|app| *app.borrow_mut() = Some(App { viewer, gui }));
    if let Some(url) = distance_url {
        refresh_distance_range(url);
    }

    if let Some(url) = help_file
        && let Some(body) = fetch::fetch_help(&url).await
    {
        APP.with(|app| {
            if let Some(app) = app.borrow_mut().as_mut() {
                app.gui.set_help(&doc, Some(&body));
            }
        });
    }
    Ok(())
}

/// Offers the current state as a `state.json` download.
pub(crate) fn save_state() {
    let Some(saved) = dispatch(|v| v.save_state_json()) else {
        return;
    };
    let json = match saved {
        Ok(json) => json,
        Err(err) => {
            error!(%err, "state serialisation failed");
            alert(&format!("Unable to save state: {err}"));
            return;
        }
    };
    if let Err(err) = download(&json) {
        error!(?err, "state download failed");
    }
}

fn download(json: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let opts = BlobPropertyBag::new();
    opts.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let doc = gui::document().ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor = doc
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(SAVED_STATE_FILE_NAME);
    anchor.click();
    Url::revoke_object_url(&url)
}

/// `change` handler of the state file input.
pub(crate) fn load_state(ev: Event) {
    let Some(input) = ev
        .target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    let file = input.files().and_then(|files| files.get(0));
    // Picking the same file again must fire another change.
    input.set_value("");
    let Some(file) = file else {
        return;
    };
    spawn_local(async move {
        let text = match JsFuture::from(file.text()).await {
            Ok(text) => text.as_string().unwrap_or_default(),
            Err(err) => {
                error!(?err, "state file read failed");
                return;
            }
        };
        if let Some(Err(err)) = dispatch(|v| v.load_state_json(&text)) {
            report(&err);
        }
    });
}
