//! Binding to the page's MARender/three.js renderer.

use foundation::math::Vec3;
use js_sys::{Array, Float64Array, Object, Reflect};
use render::{Clipping, RenderMode, Renderer, SceneObject};
use scene::CameraHome;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
function mv_vec(a, i) {
    return new THREE.Vector3(a[i], a[i + 1], a[i + 2]);
}

function mv_spec(spec) {
    const out = Object.assign({}, spec);
    if (spec.mode !== undefined) {
        out.mode = {
            phong: MARenderMode.PHONG,
            point: MARenderMode.POINT,
            section: MARenderMode.SECTION,
        }[spec.mode];
    }
    if (spec.vertices !== undefined) {
        const v = [];
        for (let i = 0; i + 2 < spec.vertices.length; i += 3) {
            v.push(mv_vec(spec.vertices, i));
        }
        out.vertices = v;
    }
    if (spec.clipping !== undefined) {
        out.clipping = (spec.clipping === null) ? null :
            new THREE.Plane(mv_vec(spec.clipping, 0), spec.clipping[3]);
    }
    return out;
}

export function mv_webgl_available() {
    try {
        const c = document.createElement('canvas');
        return !!(window.WebGLRenderingContext &&
                  (c.getContext('webgl') || c.getContext('experimental-webgl')));
    } catch (e) {
        return false;
    }
}

export function mv_create(container_id) {
    const container = document.getElementById(container_id);
    const ren = new MARenderer(window, container);
    ren.init();
    ren.setLocalClipping(true);
    ren.win.removeEventListener('keypress', ren._keyPressed);
    ren.setHomeOnLoad = false;
    ren.animate();
    return ren;
}

export function mv_add(ren, spec) { ren.addModel(mv_spec(spec)); }
export function mv_update(ren, spec) { ren.updateModel(mv_spec(spec)); }
export function mv_remove(ren, name) { ren.removeModel(name); }

export function mv_set_camera(ren, c, near, far, p) {
    ren.setCamera(mv_vec(c, 0), near, far, mv_vec(p, 0));
}

export function mv_set_home(ren, p, u) {
    ren.setHome(mv_vec(p, 0), mv_vec(u, 0));
}

export function mv_go_home(ren) {
    ren.setCamera();
    ren.goHome();
}

export function mv_bb_vertices(ren, url, voxel) {
    const out = [];
    for (const v of ren.getIIP3DBBVertices(url, mv_vec(voxel, 0))) {
        out.push(v.x, v.y, v.z);
    }
    return new Float64Array(out);
}

export function mv_current_view(ren) {
    const c = ren.center, p = ren.camera.position, u = ren.camera.up;
    return new Float64Array([c.x, c.y, c.z, ren.nearPlane, ren.farPlane,
                             p.x, p.y, p.z, u.x, u.y, u.z]);
}

export function mv_set_clear_color(ren, color) {
    ren.renderer.setClearColor(color, 1);
}
")]
extern "C" {
    fn mv_webgl_available() -> bool;
    #[wasm_bindgen(catch)]
    fn mv_create(container_id: &str) -> Result<JsValue, JsValue>;
    fn mv_add(ren: &JsValue, spec: &JsValue);
    fn mv_update(ren: &JsValue, spec: &JsValue);
    fn mv_remove(ren: &JsValue, name: &str);
    fn mv_set_camera(ren: &JsValue, center: &[f64], near: f64, far: f64, position: &[f64]);
    fn mv_set_home(ren: &JsValue, position: &[f64], up: &[f64]);
    fn mv_go_home(ren: &JsValue);
    fn mv_bb_vertices(ren: &JsValue, url: &str, voxel_size: &[f64]) -> Float64Array;
    fn mv_current_view(ren: &JsValue) -> Float64Array;
    fn mv_set_clear_color(ren: &JsValue, color: u32);
}

pub fn webgl_available() -> bool {
    mv_webgl_available()
}

/// [`Renderer`] backed by a MARenderer instance living in the page.
pub struct JsRenderer {
    ren: JsValue,
}

impl JsRenderer {
    /// Creates the renderer inside the element `container_id`.
    pub fn create(container_id: &str) -> Result<Self, JsValue> {
        Ok(Self {
            ren: mv_create(container_id)?,
        })
    }
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    // Reflect::set on a plain object cannot fail.
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

fn mode_name(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Phong => "phong",
        RenderMode::Point => "point",
        RenderMode::Section => "section",
    }
}

fn flatten(points: &[Vec3]) -> Vec<f64> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

/// Only the fields that are set end up on the JS object, so the same
/// conversion serves both add and partial update.
fn to_js(obj: &SceneObject) -> JsValue {
    let out = Object::new();
    set(&out, "name", &JsValue::from_str(&obj.name));
    if let Some(mode) = obj.mode {
        set(&out, "mode", &JsValue::from_str(mode_name(mode)));
    }
    if let Some(path) = &obj.path {
        set(&out, "path", &JsValue::from_str(path));
    }
    if let Some(color) = obj.color {
        set(&out, "color", &JsValue::from(color));
    }
    if let Some(visible) = obj.visible {
        set(&out, "visible", &JsValue::from_bool(visible));
    }
    if let Some(transparent) = obj.transparent {
        set(&out, "transparent", &JsValue::from_bool(transparent));
    }
    if let Some(opacity) = obj.opacity {
        set(&out, "opacity", &JsValue::from_f64(opacity));
    }
    if let Some(clipping) = &obj.clipping {
        let value = match clipping {
            Clipping::Off => JsValue::NULL,
            Clipping::Plane(p) => {
                let n = p.normal;
                Array::of4(
                    &JsValue::from_f64(n.x),
                    &JsValue::from_f64(n.y),
                    &JsValue::from_f64(n.z),
                    &JsValue::from_f64(p.constant),
                )
                .into()
            }
        };
        set(&out, "clipping", &value);
    }
    if let Some(vertices) = &obj.vertices {
        set(
            &out,
            "vertices",
            &Float64Array::from(flatten(vertices).as_slice()).into(),
        );
    }
    if let Some(texture) = &obj.texture {
        set(&out, "texture", &JsValue::from_str(texture));
    }
    out.into()
}

impl Renderer for JsRenderer {
    fn add_scene_object(&mut self, spec: SceneObject) {
        mv_add(&self.ren, &to_js(&spec));
    }

    fn update_scene_object(&mut self, update: SceneObject) {
        mv_update(&self.ren, &to_js(&update));
    }

    fn remove_scene_object(&mut self, name: &str) {
        mv_remove(&self.ren, name);
    }

    fn set_camera(&mut self, center: Vec3, near: f64, far: f64, position: Vec3) {
        mv_set_camera(
            &self.ren,
            &center.to_array(),
            near,
            far,
            &position.to_array(),
        );
    }

    fn set_home(&mut self, position: Vec3, up: Vec3) {
        mv_set_home(&self.ren, &position.to_array(), &up.to_array());
    }

    fn go_home(&mut self) {
        mv_go_home(&self.ren);
    }

    fn bounding_vertices(&mut self, url: &str, voxel_size: Vec3) -> Vec<Vec3> {
        mv_bb_vertices(&self.ren, url, &voxel_size.to_array())
            .to_vec()
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect()
    }

    fn current_view(&self) -> CameraHome {
        let v = mv_current_view(&self.ren).to_vec();
        if v.len() != 11 {
            return CameraHome::default();
        }
        CameraHome {
            center: [v[0], v[1], v[2]],
            near: v[3],
            far: v[4],
            position: [v[5], v[6], v[7]],
            up: [v[8], v[9], v[10]],
        }
    }

    fn set_clear_color(&mut self, color: u32) {
        mv_set_clear_color(&self.ren, color);
    }
}
