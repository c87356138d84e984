use controller::ViewerError;
use formats::{DocumentError, parse_distance_range, parse_state};
use gloo_net::http::Request;
use scene::ApplicationState;
use tracing::warn;

async fn fetch_text(url: &str) -> Result<String, gloo_net::Error> {
    let resp = Request::get(url).send().await?;
    if !resp.ok() {
        return Err(gloo_net::Error::GlooError(format!(
            "{url}: HTTP {}",
            resp.status()
        )));
    }
    resp.text().await
}

pub async fn fetch_config(url: &str) -> Result<ApplicationState, ViewerError> {
    let text = fetch_text(url)
        .await
        .map_err(|e| ViewerError::ConfigFetch(format!("Unable to read configuration file. {e}")))?;
    parse_state(&text).map_err(|e| match e {
        DocumentError::Parse(_) => {
            ViewerError::ConfigFetch(format!("Invalid configuration file provided. {e}"))
        }
        other => ViewerError::ConfigFetch(other.to_string()),
    })
}

/// Section distance range from the image server, `None` when the server
/// cannot be reached or answers with something unexpected.
pub async fn fetch_distance_range(url: &str) -> Option<(f64, f64)> {
    match fetch_text(url).await {
        Ok(body) => {
            let range = parse_distance_range(&body);
            if range.is_none() {
                warn!(url, "unreadable distance range");
            }
            range
        }
        Err(err) => {
            warn!(url, %err, "distance range request failed");
            None
        }
    }
}

/// Body of the application help file, if it could be fetched.
pub async fn fetch_help(url: &str) -> Option<String> {
    fetch_text(url)
        .await
        .inspect_err(|err| warn!(url, %err, "help file request failed"))
        .ok()
}
