//! Offline helpers behind the `modelview` command: everything the browser
//! viewer derives from a configuration and a query string, computed
//! without a browser.

use std::fmt::Write as _;
use std::path::Path;

use controller::{Viewer, ViewerLocation};
use formats::{ParamError, QueryParams, apply_url_params, build_share_url, load_state_file};
use render::{
    RecordingRenderer, RenderCommand, distance_range_url, section_base_url, section_texture_url,
};
use scene::{ApplicationState, CategoryIndex};

/// A configuration with the query parameters applied.
pub struct Loaded {
    /// The file as read, before the query was applied.
    pub config: ApplicationState,
    pub state: ApplicationState,
    pub param_error: Option<ParamError>,
}

/// Decodes `query` into `config` the way the viewer does at startup.
pub fn apply_query(config: ApplicationState, query: &str) -> Loaded {
    let params = QueryParams::from_query(query);
    let mut state = config.clone();
    let param_error = apply_url_params(&mut state, &params).err();
    state.normalize();
    Loaded {
        config,
        state,
        param_error,
    }
}

pub fn load(config: &Path, query: &str) -> Result<Loaded, String> {
    let state = load_state_file(config).map_err(|e| format!("{}: {e}", config.display()))?;
    Ok(apply_query(state, query))
}

pub fn check_report(loaded: &Loaded) -> String {
    let state = &loaded.state;
    let mut out = String::new();
    let _ = writeln!(out, "title: {}", state.display_title());
    let _ = writeln!(
        out,
        "model: {} ({}, {})",
        state.model.name,
        state.model.color,
        if state.model_visible { "visible" } else { "hidden" }
    );
    let _ = writeln!(out, "domains: {}", state.model.domains.len());
    let categories = CategoryIndex::build(state);
    for (cat, members) in categories.iter() {
        let name = state
            .domain_selectors
            .get(cat)
            .map(|s| s.name.as_str())
            .unwrap_or("");
        let names: Vec<&str> = members
            .iter()
            .map(|&i| state.model.domains[i].name.as_str())
            .collect();
        let _ = writeln!(out, "  [{cat}] {name}: {}", names.join(", "));
    }
    let _ = writeln!(
        out,
        "sectioning: {}",
        if state.sectioning { "on" } else { "off" }
    );
    if let Some(err) = &loaded.param_error {
        let _ = writeln!(out, "warning: {err}");
    }
    out
}

/// Share URL using the configured home view as the live view.
pub fn share_url(base_url: &str, config_path: &str, state: &ApplicationState) -> String {
    build_share_url(base_url, config_path, state, &state.model.camera_home)
}

/// Image server URLs for the active section: base, distance range and
/// texture. Empty without sectioning or without a server.
pub fn section_urls(state: &ApplicationState) -> Vec<(&'static str, String)> {
    let Some(sec) = state.active_section() else {
        return Vec::new();
    };
    [
        ("base", section_base_url(sec)),
        ("distance-range", distance_range_url(sec)),
        ("texture", section_texture_url(state)),
    ]
    .into_iter()
    .filter_map(|(label, url)| url.map(|u| (label, u)))
    .collect()
}

pub fn describe(cmd: &RenderCommand) -> String {
    match cmd {
        RenderCommand::Add(obj) => format!("add {obj:?}"),
        RenderCommand::Update(obj) => format!("update {obj:?}"),
        RenderCommand::Remove(name) => format!("remove {name}"),
        RenderCommand::SetCamera {
            center,
            near,
            far,
            position,
        } => format!(
            "camera center={:?} near={near} far={far} position={:?}",
            center.to_array(),
            position.to_array()
        ),
        RenderCommand::SetHome { position, up } => format!(
            "home position={:?} up={:?}",
            position.to_array(),
            up.to_array()
        ),
        RenderCommand::GoHome => "go-home".to_string(),
        RenderCommand::BoundingVertices { url, voxel_size } => {
            format!("bounding-vertices {url} voxel={:?}", voxel_size.to_array())
        }
        RenderCommand::ClearColor(c) => format!("clear-color {c:#08x}"),
    }
}

/// Renderer calls the viewer makes at startup.
pub fn render_plan(
    config: ApplicationState,
    query: &str,
    location: ViewerLocation,
) -> (Vec<RenderCommand>, Option<ParamError>) {
    let params = QueryParams::from_query(query);
    let (viewer, err) = Viewer::start(RecordingRenderer::new(), &params, location, config);
    (viewer.renderer().commands().to_vec(), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::parse_state;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"{
        "title": "Mouse",
        "sectioning": true,
        "domain_sel": [{"name": "Organs"}],
        "model": {
            "name": "mouse",
            "color": "ffeedd",
            "domains": [
                {"name": "Heart", "color": "ff0000", "visible": true, "cat": [0], "iip3d_idx": 3},
                {"name": "Liver", "color": "00ff00", "cat": [0]}
            ],
            "section": {"iip3dsrv": "http://srv/fcgi", "wlzobj": "/m.wlz", "visible": true}
        }
    }"#;

    fn config() -> ApplicationState {
        parse_state(CONFIG).expect("parse")
    }

    #[test]
    fn report_lists_categories_and_warnings() {
        let loaded = apply_query(config(), "model=ffeedd,t&home=1,2");
        let report = check_report(&loaded);
        assert!(report.contains("title: Mouse"));
        assert!(report.contains("  [0] Organs: Heart, Liver"));
        assert!(report.contains("warning: Failed to parse url for home"));
    }

    #[test]
    fn query_is_applied_before_urls_are_built() {
        let loaded = apply_query(config(), "section=5,90,0,1,2,3");
        let urls = section_urls(&loaded.state);
        assert_eq!(
            urls[0],
            (
                "base",
                "http://srv/fcgi?wlz=/m.wlz&mod=zeta&fxp=1,2,3&pit=90&yaw=0&dst=5".to_string()
            )
        );
        assert_eq!(urls.len(), 3);
        assert!(urls[2].1.ends_with("&cvt=png"));
    }

    #[test]
    fn no_section_urls_without_sectioning() {
        let loaded = apply_query(config(), "sectioning=false");
        assert!(section_urls(&loaded.state).is_empty());
    }

    #[test]
    fn share_url_uses_configured_home() {
        let state = config();
        let url = share_url("http://h/v.html", "c.json", &state);
        assert!(url.starts_with("http://h/v.html?config=c.json&model=ffeedd,t"));
        assert!(url.contains("&home=0,0,0,1,1000,0,0,10,0,1,0"));
    }

    #[test]
    fn plan_starts_from_unmodified_config() {
        let loaded = apply_query(config(), "model=123456,f");
        assert_eq!(loaded.config.model.color, "ffeedd");
        assert_eq!(loaded.state.model.color, "123456");
        let (cmds, err) = render_plan(loaded.config, "model=123456,f", ViewerLocation::default());
        assert!(err.is_none());
        assert!(!cmds.is_empty());
    }

    #[test]
    fn plan_ends_at_home() {
        let (cmds, err) = render_plan(config(), "background=16", ViewerLocation::default());
        assert!(err.is_none());
        assert_eq!(cmds.first(), Some(&RenderCommand::ClearColor(16)));
        assert_eq!(cmds.last(), Some(&RenderCommand::GoHome));
        assert_eq!(describe(&RenderCommand::ClearColor(16)), "clear-color 0x000010");
    }
}
