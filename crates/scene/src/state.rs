//! The application state tree.
//!
//! One `ApplicationState` drives both the GUI widgets and the renderer's
//! scene graph. Field names follow the Rust side; the serde renames keep
//! the JSON keys used by deployed configuration and saved-state files.

use std::collections::BTreeSet;

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

fn default_voxel_size() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_map_vmax() -> f64 {
    255.0
}

fn default_map_gamma() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub help_file: Option<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_true")]
    pub model_visible: bool,
    #[serde(default)]
    pub domain_surfaces_visible: bool,
    #[serde(default)]
    pub domain_sections_visible: bool,
    /// When false the section sub-state is inert.
    #[serde(default)]
    pub sectioning: bool,
    pub model: Model,
    #[serde(rename = "domain_sel", default)]
    pub domain_selectors: Vec<DomainCategory>,
    #[serde(default)]
    pub model_obj_dir: String,
    #[serde(default)]
    pub domain_obj_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub name: String,
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub surface: String,
    #[serde(default)]
    pub camera_home: CameraHome,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraHome {
    #[serde(rename = "cen")]
    pub center: [f64; 3],
    pub near: f64,
    pub far: f64,
    #[serde(rename = "pos")]
    pub position: [f64; 3],
    pub up: [f64; 3],
}

impl Default for CameraHome {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 10.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

impl CameraHome {
    pub fn center(&self) -> Vec3 {
        self.center.into()
    }

    pub fn position(&self) -> Vec3 {
        self.position.into()
    }

    pub fn up(&self) -> Vec3 {
        self.up.into()
    }
}

/// How a domain's mesh is drawn. Anything other than `"surface"` in a
/// configuration file draws as a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainMode {
    #[default]
    Point,
    Surface,
}

impl From<String> for DomainMode {
    fn from(s: String) -> Self {
        if s == "surface" {
            DomainMode::Surface
        } else {
            DomainMode::Point
        }
    }
}

impl From<DomainMode> for String {
    fn from(mode: DomainMode) -> Self {
        match mode {
            DomainMode::Point => "point".to_string(),
            DomainMode::Surface => "surface".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub mode: DomainMode,
    /// Mesh asset relative to `domain_obj_dir`. Configuration files spell
    /// "no mesh" as the string `"null"`.
    #[serde(default, deserialize_with = "deserialize_asset")]
    pub obj: Option<String>,
    /// Indices into `ApplicationState::domain_selectors`.
    #[serde(rename = "cat", default)]
    pub categories: BTreeSet<usize>,
    /// Label index of this domain on the section image server.
    #[serde(rename = "iip3d_idx", default, skip_serializing_if = "Option::is_none")]
    pub iip3d_index: Option<i64>,
}

fn deserialize_asset<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty() && s != "null"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCategory {
    pub name: String,
    /// Whether the category's domain list is open in the GUI.
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub sel_idx: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "dst", default)]
    pub distance: f64,
    #[serde(rename = "pit", default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(rename = "flip", default)]
    pub flipped: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(rename = "fxp", default)]
    pub focus_point: [f64; 3],
    #[serde(rename = "voxelsz", default = "default_voxel_size")]
    pub voxel_size: [f64; 3],
    #[serde(rename = "iip3dsrv", default)]
    pub image_server_url: Option<String>,
    #[serde(rename = "wlzobj", default)]
    pub object_id: Option<String>,
    /// Apply gamma mapping to section grey values.
    #[serde(default)]
    pub map: bool,
    #[serde(default)]
    pub map_vmin: f64,
    #[serde(default = "default_map_vmax")]
    pub map_vmax: f64,
    #[serde(rename = "map_vgamma", default = "default_map_gamma")]
    pub map_gamma: f64,
    #[serde(default)]
    pub clipping: bool,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            distance: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            flipped: false,
            visible: false,
            focus_point: [0.0, 0.0, 0.0],
            voxel_size: default_voxel_size(),
            image_server_url: None,
            object_id: None,
            map: false,
            map_vmin: 0.0,
            map_vmax: default_map_vmax(),
            map_gamma: default_map_gamma(),
            clipping: false,
        }
    }
}

impl Section {
    /// Sets the lower map bound, clamped so it never exceeds the upper one.
    /// Returns the value actually stored.
    pub fn set_map_vmin(&mut self, v: f64) -> f64 {
        self.map_vmin = v.min(self.map_vmax);
        self.map_vmin
    }

    /// Sets the upper map bound, clamped so it never drops below the lower
    /// one. Returns the value actually stored.
    pub fn set_map_vmax(&mut self, v: f64) -> f64 {
        self.map_vmax = v.max(self.map_vmin);
        self.map_vmax
    }
}

impl ApplicationState {
    /// Fills in defaults that depend on other fields. Runs after URL
    /// parameters are applied at startup and on every whole-state replace.
    ///
    /// This is the only place a `Section` is created from nothing.
    pub fn normalize(&mut self) {
        if self.sectioning && self.model.section.is_none() {
            self.model.section = Some(Section::default());
        }
    }

    /// The section sub-state, only when sectioning is enabled.
    pub fn active_section(&self) -> Option<&Section> {
        if self.sectioning {
            self.model.section.as_ref()
        } else {
            None
        }
    }

    pub fn active_section_mut(&mut self) -> Option<&mut Section> {
        if self.sectioning {
            self.model.section.as_mut()
        } else {
            None
        }
    }

    /// A domain surface is drawn only when both the domain and the global
    /// domain-surface toggle are on.
    pub fn domain_surface_visible(&self, domain_index: usize) -> bool {
        self.domain_surfaces_visible
            && self
                .model
                .domains
                .get(domain_index)
                .is_some_and(|d| d.visible)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn display_info(&self) -> &str {
        self.info.as_deref().unwrap_or("")
    }
}
