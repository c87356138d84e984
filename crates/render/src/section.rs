//! URLs understood by the section image server.

use foundation::{format_number, hex_to_u32, rgba_components};
use scene::{ApplicationState, Section};

/// Texture quality requested for section images.
const TEXTURE_QUALITY: u32 = 50;
const MODEL_ALPHA: u8 = 255;
const DOMAIN_ALPHA: u8 = 192;

/// `<server>?wlz=<object>&mod=zeta&fxp=<x>,<y>,<z>&pit=<p>&yaw=<y>&dst=<d>`,
/// or `None` without both a server and an object.
pub fn section_base_url(sec: &Section) -> Option<String> {
    let server = sec.image_server_url.as_deref().filter(|s| !s.is_empty())?;
    let object = sec.object_id.as_deref().filter(|s| !s.is_empty())?;
    let [x, y, z] = sec.focus_point;
    Some(format!(
        "{server}?wlz={object}&mod=zeta&fxp={},{},{}&pit={}&yaw={}&dst={}",
        format_number(x),
        format_number(y),
        format_number(z),
        format_number(sec.pitch),
        format_number(sec.yaw),
        format_number(sec.distance),
    ))
}

pub fn distance_range_url(sec: &Section) -> Option<String> {
    section_base_url(sec).map(|base| format!("{base}&OBJ=Wlz-distance-range"))
}

/// Texture image URL for the active section: the model selection, optional
/// gamma mapping, then one selection per visible labelled domain when domain
/// sections are shown.
pub fn section_texture_url(state: &ApplicationState) -> Option<String> {
    let sec = state.active_section()?;
    let mut url = section_base_url(sec)?;

    url.push_str(&format!(
        "&qlt={TEXTURE_QUALITY}&sel=0,{}",
        rgba_components(hex_to_u32(&state.model.color), MODEL_ALPHA)
    ));

    if sec.map {
        url.push_str(&format!(
            "&map=gamma,{},{},0,255,{}",
            format_number(sec.map_vmin),
            format_number(sec.map_vmax),
            format_number(sec.map_gamma),
        ));
    }

    if state.domain_sections_visible {
        for dom in &state.model.domains {
            if let (true, Some(idx)) = (dom.visible, dom.iip3d_index) {
                url.push_str(&format!(
                    "&sel={idx},{}",
                    rgba_components(hex_to_u32(&dom.color), DOMAIN_ALPHA)
                ));
            }
        }
    }

    url.push_str("&cvt=png");
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::{distance_range_url, section_base_url, section_texture_url};
    use formats::parse_state;
    use pretty_assertions::assert_eq;
    use scene::{ApplicationState, Section};

    fn sectioned_state() -> ApplicationState {
        let mut s: ApplicationState = parse_state(
            r#"{
                "sectioning": true,
                "domain_sections_visible": true,
                "model": {
                    "color": "102030",
                    "domains": [
                        {"name": "a", "color": "ff0000", "visible": true, "iip3d_idx": 4},
                        {"name": "b", "color": "00ff00", "visible": false, "iip3d_idx": 5},
                        {"name": "c", "color": "0000ff", "visible": true}
                    ],
                    "section": {"dst": -12.5, "pit": 90, "yaw": 0, "fxp": [1, 2, 3],
                                "iip3dsrv": "http://srv/fcgi-bin/iip3d", "wlzobj": "/d/m.wlz"}
                }
            }"#,
        )
        .expect("parse");
        s.normalize();
        s
    }

    #[test]
    fn base_url_needs_server_and_object() {
        let s = sectioned_state();
        let sec = s.model.section.as_ref().expect("section");
        assert_eq!(
            section_base_url(sec).as_deref(),
            Some("http://srv/fcgi-bin/iip3d?wlz=/d/m.wlz&mod=zeta&fxp=1,2,3&pit=90&yaw=0&dst=-12.5")
        );
        assert!(distance_range_url(sec).is_some_and(|u| u.ends_with("&OBJ=Wlz-distance-range")));
        assert_eq!(section_base_url(&Section::default()), None);
    }

    #[test]
    fn texture_url_lists_model_and_visible_labelled_domains() {
        let s = sectioned_state();
        let url = section_texture_url(&s).expect("texture");
        assert!(url.ends_with("&qlt=50&sel=0,16,32,48,255&sel=4,255,0,0,192&cvt=png"));
    }

    #[test]
    fn texture_url_includes_gamma_map_when_enabled() {
        let mut s = sectioned_state();
        s.domain_sections_visible = false;
        if let Some(sec) = s.model.section.as_mut() {
            sec.map = true;
            sec.map_vmin = 10.0;
            sec.map_vmax = 200.0;
            sec.map_gamma = 0.5;
        }
        let url = section_texture_url(&s).expect("texture");
        assert!(url.ends_with("&sel=0,16,32,48,255&map=gamma,10,200,0,255,0.5&cvt=png"));
    }

    #[test]
    fn no_texture_without_sectioning() {
        let mut s = sectioned_state();
        s.sectioning = false;
        assert_eq!(section_texture_url(&s), None);
    }
}
