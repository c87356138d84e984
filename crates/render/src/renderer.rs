//! The contract the viewer core holds with the 3D rendering library.
//!
//! The core only ever talks to the renderer through [`Renderer`]; scene
//! objects are addressed by name.

use foundation::math::Vec3;
use scene::CameraHome;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    Phong,
    Point,
    Section,
}

/// Plane `normal · p + constant = 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub constant: f64,
}

impl ClipPlane {
    /// Plane through three points, normal by the right-hand rule.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (b - a).cross(c - a).normalize();
        if normal == Vec3::ZERO {
            return None;
        }
        Some(Self {
            normal,
            constant: -normal.dot(a),
        })
    }

    /// Same plane, facing the other way.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            constant: -self.constant,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clipping {
    Off,
    Plane(ClipPlane),
}

/// A scene object description. Used whole when adding an object and as a
/// partial update (unset fields untouched) when updating one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneObject {
    pub name: String,
    pub mode: Option<RenderMode>,
    pub path: Option<String>,
    pub color: Option<u32>,
    pub visible: Option<bool>,
    pub transparent: Option<bool>,
    pub opacity: Option<f64>,
    pub clipping: Option<Clipping>,
    pub vertices: Option<Vec<Vec3>>,
    pub texture: Option<String>,
}

impl SceneObject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = Some(transparent);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn clipping(mut self, clipping: Clipping) -> Self {
        self.clipping = Some(clipping);
        self
    }

    pub fn vertices(mut self, vertices: Vec<Vec3>) -> Self {
        self.vertices = Some(vertices);
        self
    }

    pub fn texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// Overlays every set field of `update` onto `self`.
    pub fn merge(&mut self, update: SceneObject) {
        let SceneObject {
            name: _,
            mode,
            path,
            color,
            visible,
            transparent,
            opacity,
            clipping,
            vertices,
            texture,
        } = update;
        self.mode = mode.or(self.mode);
        self.path = path.or(self.path.take());
        self.color = color.or(self.color);
        self.visible = visible.or(self.visible);
        self.transparent = transparent.or(self.transparent);
        self.opacity = opacity.or(self.opacity);
        self.clipping = clipping.or(self.clipping.take());
        self.vertices = vertices.or(self.vertices.take());
        self.texture = texture.or(self.texture.take());
    }
}

pub trait Renderer {
    fn add_scene_object(&mut self, spec: SceneObject);

    /// Updates of unknown objects are ignored.
    fn update_scene_object(&mut self, update: SceneObject);

    fn remove_scene_object(&mut self, name: &str);

    fn set_camera(&mut self, center: Vec3, near: f64, far: f64, position: Vec3);

    fn set_home(&mut self, position: Vec3, up: Vec3);

    fn go_home(&mut self);

    /// Corner vertices of the section plane served at `url`, scaled by the
    /// voxel size.
    fn bounding_vertices(&mut self, url: &str, voxel_size: Vec3) -> Vec<Vec3>;

    fn clip_plane_from_vertices(&self, vertices: &[Vec3]) -> Option<ClipPlane> {
        match vertices {
            [a, b, c, ..] => ClipPlane::from_points(*a, *b, *c),
            _ => None,
        }
    }

    /// The live camera, expressed the same way as a home view.
    fn current_view(&self) -> CameraHome;

    /// Renderer clear colour as `0xRRGGBB`.
    fn set_clear_color(&mut self, _color: u32) {}
}
