//! Configuration documents and saved-state files.
//!
//! Both are JSON serialisations of `ApplicationState`; a configuration is
//! just the state a session starts from.

use std::fmt;
use std::fs;
use std::path::Path;

use scene::ApplicationState;

/// File name offered when the user saves the current state.
pub const SAVED_STATE_FILE_NAME: &str = "state.json";

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(err) => write!(f, "I/O error: {err}"),
            DocumentError::Parse(err) => write!(f, "invalid state document: {err}"),
            DocumentError::Serialize(err) => write!(f, "failed to serialise state: {err}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io(err) => Some(err),
            DocumentError::Parse(err) | DocumentError::Serialize(err) => Some(err),
        }
    }
}

pub fn parse_state(text: &str) -> Result<ApplicationState, DocumentError> {
    serde_json::from_str(text).map_err(DocumentError::Parse)
}

/// Pretty JSON with two-space indentation, as offered for download.
pub fn save_state(state: &ApplicationState) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(state).map_err(DocumentError::Serialize)
}

pub fn load_state_file(path: impl AsRef<Path>) -> Result<ApplicationState, DocumentError> {
    let payload = fs::read_to_string(path).map_err(DocumentError::Io)?;
    parse_state(&payload)
}

pub fn save_state_file(
    path: impl AsRef<Path>,
    state: &ApplicationState,
) -> Result<(), DocumentError> {
    let payload = save_state(state)?;
    fs::write(path, payload).map_err(DocumentError::Io)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{DocumentError, load_state_file, parse_state, save_state, save_state_file};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    pub(crate) const CONFIG: &str = r#"{
        "title": "Embryo",
        "info": "Stage 12",
        "model_visible": true,
        "domain_surfaces_visible": true,
        "sectioning": true,
        "model_obj_dir": "obj",
        "domain_obj_dir": "obj/dom",
        "domain_sel": [{"name": "All", "visible": true}],
        "model": {
            "name": "embryo",
            "color": "aabbcc",
            "opacity": 0.5,
            "surface": "embryo.vtk",
            "camera_home": {"cen": [0, 0, 0], "near": 1, "far": 1000,
                            "pos": [0, 0, 10], "up": [0, 1, 0]},
            "domains": [
                {"name": "Heart", "color": "ff0000", "visible": true, "obj": "heart.vtk", "cat": [0]},
                {"name": "Gut", "color": "00ff00", "visible": false, "obj": "gut.vtk", "cat": [0]},
                {"name": "Brain", "color": "0000ff", "visible": true, "obj": "null", "cat": [0],
                 "iip3d_idx": 7}
            ],
            "section": {"dst": 10, "pit": 90, "yaw": 45, "fxp": [100, 200, 300],
                        "voxelsz": [2, 2, 2], "iip3dsrv": "http://iip/fcgi", "wlzobj": "/data/e.wlz",
                        "visible": true, "map": true, "map_vmin": 10, "map_vmax": 200,
                        "map_vgamma": 1.5}
        }
    }"#;

    fn temp_path(label: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("modelview_{label}_{}.json", std::process::id()));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn saved_state_round_trips() {
        let state = parse_state(CONFIG).expect("parse config");
        let text = save_state(&state).expect("save");
        let back = parse_state(&text).expect("reload");
        assert_eq!(back, state);
    }

    #[test]
    fn saved_state_file_round_trips() {
        let state = parse_state(CONFIG).expect("parse config");
        let path = temp_path("roundtrip");
        save_state_file(&path, &state).expect("write");
        let back = load_state_file(&path).expect("read");
        assert_eq!(back, state);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_non_state_documents() {
        let err = parse_state("null").expect_err("null is not a state");
        assert!(matches!(err, DocumentError::Parse(_)));
        assert!(parse_state("{\"title\": \"no model\"}").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_state_file(temp_path("missing")).expect_err("missing");
        assert!(matches!(err, DocumentError::Io(_)));
    }
}
