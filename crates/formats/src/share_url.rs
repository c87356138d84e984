//! Share-view URLs.
//!
//! ```text
//! <base>?config=<path>
//!       &model=<hex>,<t|f>
//!       &domains=<idx>,<hex>,<t|f>(,<idx>,<hex>,<t|f>)*
//!       &home=<cx>,<cy>,<cz>,<near>,<far>,<px>,<py>,<pz>,<ux>,<uy>,<uz>
//!       &section=<dst>,<pit>,<yaw>,<fx>,<fy>,<fz>       (sectioning only)
//! ```
//!
//! Decoding applies `debug`, `model`, `domains`, `home`, `sectioning` and
//! `section` in that order and stops at the first malformed parameter;
//! anything applied before the failure stays applied. Numbers are read by
//! their leading numeric prefix, so `1.0` is domain 1 and a trailing
//! `#fragment` on the last value is ignored.

use std::fmt;

use foundation::{
    is_hex6, parse_float_prefix, parse_int_prefix, sanitize_hex, sensible_float_str,
};
use scene::{ApplicationState, CameraHome};
use tracing::warn;

use crate::query::{QueryParams, parse_flag};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Model,
    Domains,
    Home,
    Section,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::Model => "model",
            ParamKind::Domains => "domains",
            ParamKind::Home => "home",
            ParamKind::Section => "section",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParamError {
    pub kind: ParamKind,
}

impl ParamError {
    fn new(kind: ParamKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse url for {}", self.kind)
    }
}

impl std::error::Error for ParamError {}

fn flag_str(v: bool) -> &'static str {
    if v { "t" } else { "f" }
}

fn join_floats(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| sensible_float_str(*v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Builds the share URL for the current state.
///
/// `view` is the renderer's live camera (centre, clip planes, position and
/// up vector), which is what the recipient's home view becomes.
pub fn build_share_url(
    base_url: &str,
    config_path: &str,
    state: &ApplicationState,
    view: &CameraHome,
) -> String {
    let mut url = format!("{base_url}?config={config_path}");

    url.push_str(&format!(
        "&model={},{}",
        state.model.color,
        flag_str(state.model_visible)
    ));

    if !state.model.domains.is_empty() {
        let triplets: Vec<String> = state
            .model
            .domains
            .iter()
            .enumerate()
            .map(|(idx, dom)| format!("{idx},{},{}", dom.color, flag_str(dom.visible)))
            .collect();
        url.push_str("&domains=");
        url.push_str(&triplets.join(","));
    }

    let home = [
        view.center[0],
        view.center[1],
        view.center[2],
        view.near,
        view.far,
        view.position[0],
        view.position[1],
        view.position[2],
        view.up[0],
        view.up[1],
        view.up[2],
    ];
    url.push_str("&home=");
    url.push_str(&join_floats(&home));

    if let Some(sec) = state.active_section() {
        let fields = [
            sec.distance,
            sec.pitch,
            sec.yaw,
            sec.focus_point[0],
            sec.focus_point[1],
            sec.focus_point[2],
        ];
        url.push_str("&section=");
        url.push_str(&join_floats(&fields));
    }

    url
}

fn parse_floats(value: &str, expected: usize, kind: ParamKind) -> Result<Vec<f64>, ParamError> {
    let fields: Vec<&str> = value.split(',').collect();
    if fields.len() != expected {
        return Err(ParamError::new(kind));
    }
    fields
        .iter()
        .map(|f| parse_float_prefix(f).ok_or(ParamError::new(kind)))
        .collect()
}

/// Applies recognised URL parameters to `state`.
pub fn apply_url_params(
    state: &mut ApplicationState,
    params: &QueryParams,
) -> Result<(), ParamError> {
    if let Some(v) = params.get("debug") {
        state.debug = parse_flag(v);
    }

    if let Some(v) = params.get("model") {
        let fields: Vec<&str> = v.split(',').collect();
        let [color, visible] = fields.as_slice() else {
            return Err(ParamError::new(ParamKind::Model));
        };
        state.model.color = sanitize_hex(color);
        state.model_visible = parse_flag(visible);
    }

    if let Some(v) = params.get("domains") {
        apply_domains(state, v)?;
    }

    if let Some(v) = params.get("home") {
        let h = parse_floats(v, 11, ParamKind::Home)?;
        state.model.camera_home = CameraHome {
            center: [h[0], h[1], h[2]],
            near: h[3],
            far: h[4],
            position: [h[5], h[6], h[7]],
            up: [h[8], h[9], h[10]],
        };
    }

    if let Some(v) = params.get("sectioning") {
        state.sectioning = v == "true";
    }

    if let Some(v) = params.get("section") {
        apply_section(state, v)?;
    }

    Ok(())
}

/// Only the field count is checked. With sectioning on, each field that
/// reads as a number replaces the matching section value; the rest keep
/// their current value.
fn apply_section(state: &mut ApplicationState, value: &str) -> Result<(), ParamError> {
    let fields: Vec<&str> = value.split(',').collect();
    let [dst, pit, yaw, fx, fy, fz] = fields.as_slice() else {
        return Err(ParamError::new(ParamKind::Section));
    };
    let Some(sec) = state.active_section_mut() else {
        return Ok(());
    };
    let [px, py, pz] = &mut sec.focus_point;
    let targets = [
        (dst, &mut sec.distance),
        (pit, &mut sec.pitch),
        (yaw, &mut sec.yaw),
        (fx, px),
        (fy, py),
        (fz, pz),
    ];
    for (field, target) in targets {
        match parse_float_prefix(field) {
            Some(v) => *target = v,
            None => warn!(field = *field, "ignoring non-numeric section field"),
        }
    }
    Ok(())
}

fn apply_domains(state: &mut ApplicationState, value: &str) -> Result<(), ParamError> {
    let fields: Vec<&str> = value.split(',').collect();
    if fields.len() % 3 != 0 {
        return Err(ParamError::new(ParamKind::Domains));
    }

    let domains = &mut state.model.domains;
    let count = domains.len();
    for triplet in fields.chunks_exact(3) {
        let index = parse_int_prefix(triplet[0]);
        let color = sanitize_hex(triplet[1]);
        let visible = parse_flag(triplet[2]);
        let Some(index) = index else {
            return Err(ParamError::new(ParamKind::Domains));
        };
        if !is_hex6(&color) {
            return Err(ParamError::new(ParamKind::Domains));
        }
        // Index 0 is never updated from a URL.
        match usize::try_from(index) {
            Ok(i) if i > 0 && i < count => {
                let dom = &mut domains[i];
                dom.color = color;
                dom.visible = visible;
            }
            _ => warn!(index, domains = count, "skipping out of range domain index"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ParamKind, apply_url_params, build_share_url};
    use crate::document::parse_state;
    use crate::document::tests::CONFIG;
    use crate::query::QueryParams;
    use pretty_assertions::assert_eq;
    use scene::{ApplicationState, CameraHome};

    fn state() -> ApplicationState {
        parse_state(CONFIG).expect("parse config")
    }

    fn apply(s: &mut ApplicationState, query: &str) -> Result<(), super::ParamError> {
        apply_url_params(s, &QueryParams::from_query(query))
    }

    #[test]
    fn encodes_all_parameters() {
        let s = state();
        let view = CameraHome {
            center: [0.1234567, 0.0, -2.0],
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 10.0],
            up: [0.0, 1.0, 0.0],
        };
        let url = build_share_url("http://host/v.html", "cfg.json", &s, &view);
        assert_eq!(
            url,
            "http://host/v.html?config=cfg.json\
             &model=aabbcc,t\
             &domains=0,ff0000,t,1,00ff00,f,2,0000ff,t\
             &home=0.123457,0,-2,1,1000,0,0,10,0,1,0\
             &section=10,90,45,100,200,300"
        );
    }

    #[test]
    fn section_omitted_without_sectioning() {
        let mut s = state();
        s.sectioning = false;
        let url = build_share_url("b", "c", &s, &CameraHome::default());
        assert!(!url.contains("&section="));
    }

    #[test]
    fn round_trip_restores_encoded_fields() {
        let original = state();
        let view = CameraHome {
            center: [1.5, -2.25, 3.0],
            near: 0.25,
            far: 4000.0,
            position: [10.0, 20.0, 30.5],
            up: [0.0, 0.0, 1.0],
        };
        let url = build_share_url("http://h/v", "cfg.json", &original, &view);

        let mut target = state();
        target.model.color = "123456".to_string();
        target.model_visible = false;
        target.model.domains[1].color = "abcdef".to_string();
        target.model.domains[1].visible = true;
        target.model.domains[2].visible = false;
        target.model.camera_home = CameraHome::default();
        if let Some(sec) = target.model.section.as_mut() {
            sec.distance = 0.0;
            sec.focus_point = [0.0, 0.0, 0.0];
        }

        apply_url_params(&mut target, &QueryParams::parse(&url)).expect("decode");
        assert_eq!(target.model.color, original.model.color);
        assert_eq!(target.model_visible, original.model_visible);
        assert_eq!(target.model.domains, original.model.domains);
        assert_eq!(target.model.camera_home, view);
        assert_eq!(target.model.section, original.model.section);
    }

    #[test]
    fn model_color_is_sanitised_not_rejected() {
        let mut s = state();
        apply(&mut s, "model=ghijkl,t").expect("sanitise only");
        assert_eq!(s.model.color, "");
        assert!(s.model_visible);

        apply(&mut s, "model=%23FF00AA,f").expect("sanitise only");
        assert_eq!(s.model.color, "23ff00aa");
        assert!(!s.model_visible);
    }

    #[test]
    fn model_field_count_aborts() {
        let mut s = state();
        let err = apply(&mut s, "model=ff0000&home=0,0,0,1,1000,0,0,10,0,1,0").unwrap_err();
        assert_eq!(err.kind, ParamKind::Model);
        assert_eq!(err.to_string(), "Failed to parse url for model");
        assert_eq!(s.model.color, "aabbcc");
    }

    #[test]
    fn domains_update_listed_indices() {
        let mut s = state();
        apply(&mut s, "domains=1,ff00aa,t,2,00ff00,f").expect("decode");
        assert_eq!(s.model.domains[1].color, "ff00aa");
        assert!(s.model.domains[1].visible);
        assert_eq!(s.model.domains[2].color, "00ff00");
        assert!(!s.model.domains[2].visible);
    }

    #[test]
    fn domains_skip_index_zero_and_out_of_range() {
        let mut s = state();
        apply(&mut s, "domains=0,111111,f,3,222222,t,-1,333333,t").expect("decode");
        assert_eq!(s.model.domains[0].color, "ff0000");
        assert!(s.model.domains[0].visible);
        assert!(s.model.domains.iter().all(|d| d.color != "222222"));
    }

    #[test]
    fn domains_reject_bad_index_color_or_length() {
        let mut s = state();
        assert_eq!(
            apply(&mut s, "domains=x,ff0000,t").unwrap_err().kind,
            ParamKind::Domains
        );
        assert_eq!(
            apply(&mut s, "domains=1,ff00,t").unwrap_err().kind,
            ParamKind::Domains
        );
        assert_eq!(
            apply(&mut s, "domains=1,ff0000,t,2").unwrap_err().kind,
            ParamKind::Domains
        );
    }

    #[test]
    fn domains_before_bad_triplet_stay_applied() {
        let mut s = state();
        let err = apply(&mut s, "domains=1,abcdef,t,2,zz,t").unwrap_err();
        assert_eq!(err.kind, ParamKind::Domains);
        assert_eq!(s.model.domains[1].color, "abcdef");
        assert_eq!(s.model.domains[2].color, "0000ff");
    }

    #[test]
    fn home_sets_all_camera_fields() {
        let mut s = state();
        apply(&mut s, "home=0,0,0,1,1000,0,0,10,0,1,0").expect("decode");
        assert_eq!(
            s.model.camera_home,
            CameraHome {
                center: [0.0, 0.0, 0.0],
                near: 1.0,
                far: 1000.0,
                position: [0.0, 0.0, 10.0],
                up: [0.0, 1.0, 0.0],
            }
        );
    }

    #[test]
    fn home_is_atomic() {
        let mut s = state();
        s.model.camera_home.near = 7.0;
        let err = apply(&mut s, "home=0,0,0,1,1000,0,0,10,0,1,zero").unwrap_err();
        assert_eq!(err.kind, ParamKind::Home);
        assert_eq!(s.model.camera_home.near, 7.0);
        let err = apply(&mut s, "home=0,0,0,1").unwrap_err();
        assert_eq!(err.kind, ParamKind::Home);
    }

    #[test]
    fn error_stops_later_parameters() {
        let mut s = state();
        let err = apply(&mut s, "home=1,2&sectioning=false&debug=t").unwrap_err();
        assert_eq!(err.kind, ParamKind::Home);
        // debug runs first, sectioning after home never ran.
        assert!(s.debug);
        assert!(s.sectioning);
    }

    #[test]
    fn sectioning_requires_literal_true() {
        let mut s = state();
        apply(&mut s, "sectioning=True").expect("decode");
        assert!(!s.sectioning);
        apply(&mut s, "sectioning=true").expect("decode");
        assert!(s.sectioning);
    }

    #[test]
    fn section_applies_only_to_existing_section() {
        let mut s = state();
        apply(&mut s, "section=1,2,3,4,5,6").expect("decode");
        let sec = s.model.section.as_ref().expect("section");
        assert_eq!((sec.distance, sec.pitch, sec.yaw), (1.0, 2.0, 3.0));
        assert_eq!(sec.focus_point, [4.0, 5.0, 6.0]);

        let mut s = state();
        s.model.section = None;
        apply(&mut s, "section=1,2,3,4,5,6").expect("decode");
        assert!(s.model.section.is_none());

        let mut s = state();
        apply(&mut s, "sectioning=false&section=9,9,9,9,9,9").expect("decode");
        assert_eq!(s.model.section.as_ref().map(|sec| sec.distance), Some(10.0));
    }

    #[test]
    fn section_field_count_aborts() {
        let mut s = state();
        let err = apply(&mut s, "section=1,2,3").unwrap_err();
        assert_eq!(err.kind, ParamKind::Section);
    }

    #[test]
    fn domain_indices_read_leading_integer() {
        let mut s = state();
        apply(&mut s, "domains=1.0,abcdef,t,02,123456,f").expect("decode");
        assert_eq!(s.model.domains[1].color, "abcdef");
        assert!(s.model.domains[1].visible);
        assert_eq!(s.model.domains[2].color, "123456");
        assert!(!s.model.domains[2].visible);
    }

    #[test]
    fn browser_href_with_fragment_decodes() {
        let mut s = state();
        let href = "http://host/v.html?config=cfg.json&model=ff0000,t\
                    &home=0,0,0,1,1000,0,0,10,0,1,0#frag";
        apply_url_params(&mut s, &QueryParams::parse(href)).expect("decode");
        assert_eq!(s.model.color, "ff0000");
        assert_eq!(s.model.camera_home.up, [0.0, 1.0, 0.0]);
        assert_eq!(s.model.camera_home.position, [0.0, 0.0, 10.0]);
    }

    #[test]
    fn home_fields_read_numeric_prefix() {
        let mut s = state();
        apply(&mut s, "home=0,0,0,1,1000px,0,0,10.5abc,0,1,0").expect("decode");
        assert_eq!(s.model.camera_home.far, 1000.0);
        assert_eq!(s.model.camera_home.position[2], 10.5);
    }

    #[test]
    fn section_values_ignored_while_sectioning_off() {
        let mut s = state();
        apply(
            &mut s,
            "sectioning=f&section=a,b,c,d,e,f&home=0,0,0,1,1000,0,0,10,0,1,0",
        )
        .expect("decode");
        assert!(!s.sectioning);
        assert_eq!(s.model.camera_home.far, 1000.0);
        assert_eq!(s.model.section.as_ref().map(|sec| sec.distance), Some(10.0));
    }

    #[test]
    fn non_numeric_section_fields_keep_current_value() {
        let mut s = state();
        apply(&mut s, "section=5,x,7px,1,2,3").expect("decode");
        let sec = s.model.section.as_ref().expect("section");
        assert_eq!((sec.distance, sec.pitch, sec.yaw), (5.0, 90.0, 7.0));
        assert_eq!(sec.focus_point, [1.0, 2.0, 3.0]);
    }
}
