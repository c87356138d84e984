//! Pushes application state into the renderer.
//!
//! Two kinds of sync exist. [`RenderBridge::rebuild`] tears the scene down
//! and recreates it from the whole state, costing one add per domain. Every
//! other method touches only the objects a single edit affects.

use foundation::hex_to_u32;
use scene::{ApplicationState, DomainMode};
use tracing::debug;

use crate::renderer::{Clipping, RenderMode, Renderer, SceneObject};
use crate::section::{section_base_url, section_texture_url};

pub const MODEL_OBJECT: &str = "model_surface";
pub const SECTION_OBJECT: &str = "section";

/// Opacity of a domain that does not set its own.
pub const DEFAULT_DOMAIN_OPACITY: f64 = 0.1;
/// Opacity of the section plane once it has been positioned.
pub const SECTION_OPACITY: f64 = 0.5;

pub fn domain_object_name(index: usize) -> String {
    format!("domain{index}")
}

fn asset_path(dir: &str, file: &str) -> String {
    format!("{dir}/{file}")
}

/// Remembers which objects it has added so a rebuild can remove them.
#[derive(Debug, Default)]
pub struct RenderBridge {
    model_added: bool,
    section_added: bool,
    domain_objects: usize,
}

impl RenderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full resync: camera, home view, model surface, section plane and
    /// every domain, then moves the camera home.
    pub fn rebuild<R: Renderer + ?Sized>(&mut self, state: &ApplicationState, r: &mut R) {
        self.clear(r);

        let home = &state.model.camera_home;
        r.set_camera(home.center(), home.near, home.far, home.position());
        r.set_home(home.position(), home.up());

        let model = &state.model;
        r.add_scene_object(
            SceneObject::named(MODEL_OBJECT)
                .mode(RenderMode::Phong)
                .path(asset_path(&state.model_obj_dir, &model.surface))
                .color(hex_to_u32(&model.color))
                .visible(state.model_visible)
                .transparent(true)
                .clipping(Clipping::Off)
                .opacity(model.opacity),
        );
        self.model_added = true;

        if let Some(sec) = state.active_section() {
            let mut spec = SceneObject::named(SECTION_OBJECT)
                .mode(RenderMode::Section)
                .transparent(true)
                .opacity(model.opacity)
                .visible(sec.visible);
            if let Some(url) = section_base_url(sec) {
                spec = spec.vertices(r.bounding_vertices(&url, sec.voxel_size.into()));
            }
            if let Some(tex) = section_texture_url(state) {
                spec = spec.texture(tex);
            }
            r.add_scene_object(spec);
            self.section_added = true;
        }

        self.update_model(state, r);

        for idx in 0..model.domains.len() {
            self.set_domain(state, r, idx);
        }
        self.domain_objects = model.domains.len();

        self.go_home(state, r);
        debug!(domains = self.domain_objects, "scene rebuilt");
    }

    fn clear<R: Renderer + ?Sized>(&mut self, r: &mut R) {
        if self.model_added {
            r.remove_scene_object(MODEL_OBJECT);
        }
        if self.section_added {
            r.remove_scene_object(SECTION_OBJECT);
        }
        for idx in 0..self.domain_objects {
            r.remove_scene_object(&domain_object_name(idx));
        }
        self.model_added = false;
        self.section_added = false;
        self.domain_objects = 0;
    }

    pub fn go_home<R: Renderer + ?Sized>(&self, state: &ApplicationState, r: &mut R) {
        let home = &state.model.camera_home;
        r.set_camera(home.center(), home.near, home.far, home.position());
        r.go_home();
    }

    /// Model colour, visibility and opacity, then the section.
    pub fn update_model<R: Renderer + ?Sized>(&self, state: &ApplicationState, r: &mut R) {
        let model = &state.model;
        r.update_scene_object(
            SceneObject::named(MODEL_OBJECT)
                .color(hex_to_u32(&model.color))
                .visible(state.model_visible)
                .transparent(true)
                .opacity(model.opacity),
        );
        self.update_section(state, r);
    }

    /// Repositions and retextures the section plane and sets or clears the
    /// clip plane on the model surface. Does nothing without sectioning.
    pub fn update_section<R: Renderer + ?Sized>(&self, state: &ApplicationState, r: &mut R) {
        let Some(sec) = state.active_section() else {
            return;
        };

        if !sec.visible {
            r.update_scene_object(
                SceneObject::named(SECTION_OBJECT)
                    .visible(false)
                    .transparent(true),
            );
            r.update_scene_object(
                SceneObject::named(MODEL_OBJECT)
                    .clipping(Clipping::Off)
                    .transparent(true),
            );
            return;
        }

        let vertices = match section_base_url(sec) {
            Some(url) => r.bounding_vertices(&url, sec.voxel_size.into()),
            None => Vec::new(),
        };
        let plane = r
            .clip_plane_from_vertices(&vertices)
            .map(|p| if sec.flipped { p.flipped() } else { p });

        let mut update = SceneObject::named(SECTION_OBJECT)
            .transparent(true)
            .visible(true)
            .opacity(SECTION_OPACITY)
            .vertices(vertices);
        if let Some(tex) = section_texture_url(state) {
            update = update.texture(tex);
        }
        r.update_scene_object(update);

        let clipping = match plane {
            Some(p) if sec.clipping => Clipping::Plane(p),
            _ => Clipping::Off,
        };
        r.update_scene_object(
            SceneObject::named(MODEL_OBJECT)
                .clipping(clipping)
                .transparent(true),
        );
    }

    /// Drops and, when it should be drawn, re-adds the domain's mesh; then
    /// applies the targeted domain update.
    pub fn set_domain<R: Renderer + ?Sized>(
        &self,
        state: &ApplicationState,
        r: &mut R,
        index: usize,
    ) {
        let Some(dom) = state.model.domains.get(index) else {
            return;
        };
        let name = domain_object_name(index);
        r.remove_scene_object(&name);

        if let Some(obj) = &dom.obj
            && state.domain_surface_visible(index)
        {
            let mode = match dom.mode {
                DomainMode::Surface => RenderMode::Phong,
                DomainMode::Point => RenderMode::Point,
            };
            r.add_scene_object(
                SceneObject::named(name)
                    .mode(mode)
                    .path(asset_path(&state.domain_obj_dir, obj))
                    .color(hex_to_u32(&dom.color))
                    .visible(true)
                    .transparent(true)
                    .opacity(dom.opacity.unwrap_or(DEFAULT_DOMAIN_OPACITY)),
            );
        }

        self.update_domain(state, r, index);
    }

    /// Domain colour, visibility and opacity, then the section (whose
    /// texture lists visible domains).
    pub fn update_domain<R: Renderer + ?Sized>(
        &self,
        state: &ApplicationState,
        r: &mut R,
        index: usize,
    ) {
        let Some(dom) = state.model.domains.get(index) else {
            return;
        };
        let mut update = SceneObject::named(domain_object_name(index))
            .color(hex_to_u32(&dom.color))
            .visible(state.domain_surface_visible(index))
            .transparent(true);
        if let Some(op) = dom.opacity {
            update = update.opacity(op);
        }
        r.update_scene_object(update);
        self.update_section(state, r);
    }

    pub fn update_all_domains<R: Renderer + ?Sized>(&self, state: &ApplicationState, r: &mut R) {
        for idx in 0..state.model.domains.len() {
            self.update_domain(state, r, idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DOMAIN_OPACITY, MODEL_OBJECT, RenderBridge, SECTION_OBJECT};
    use crate::recording::{RecordingRenderer, RenderCommand};
    use crate::renderer::{Clipping, RenderMode, Renderer};
    use foundation::math::Vec3;
    use formats::parse_state;
    use pretty_assertions::assert_eq;
    use scene::ApplicationState;

    fn state() -> ApplicationState {
        let mut s = parse_state(
            r#"{
                "model_obj_dir": "m",
                "domain_obj_dir": "d",
                "domain_surfaces_visible": true,
                "sectioning": true,
                "model": {
                    "color": "ffffff",
                    "opacity": 0.8,
                    "surface": "body.stl",
                    "camera_home": {"cen": [1, 1, 1], "near": 2, "far": 200,
                                    "pos": [0, 0, 50], "up": [0, 1, 0]},
                    "domains": [
                        {"name": "a", "color": "ff0000", "visible": true, "obj": "a.stl", "mode": "surface"},
                        {"name": "b", "color": "00ff00", "visible": false, "obj": "b.stl"},
                        {"name": "c", "color": "0000ff", "visible": true, "obj": "null"}
                    ],
                    "section": {"visible": true, "clipping": true,
                                "iip3dsrv": "http://s/iip", "wlzobj": "o.wlz"}
                }
            }"#,
        )
        .expect("parse");
        s.normalize();
        s
    }

    fn renderer() -> RecordingRenderer {
        RecordingRenderer::new().with_section_vertices(vec![
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(1.0, 0.0, 5.0),
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::new(1.0, 1.0, 5.0),
        ])
    }

    #[test]
    fn rebuild_adds_model_section_and_drawn_domains() {
        let s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);

        let names: Vec<&str> = r.object_names().collect();
        assert_eq!(names, vec!["domain0", MODEL_OBJECT, SECTION_OBJECT]);

        let model = r.object(MODEL_OBJECT).expect("model");
        assert_eq!(model.path.as_deref(), Some("m/body.stl"));
        assert_eq!(model.mode, Some(RenderMode::Phong));
        assert!(matches!(model.clipping, Some(Clipping::Plane(_))));

        let dom = r.object("domain0").expect("domain0");
        assert_eq!(dom.path.as_deref(), Some("d/a.stl"));
        assert_eq!(dom.opacity, Some(DEFAULT_DOMAIN_OPACITY));

        assert_eq!(r.commands().last(), Some(&RenderCommand::GoHome));
        assert_eq!(r.current_view().position, [0.0, 0.0, 50.0]);
    }

    #[test]
    fn second_rebuild_removes_previous_objects() {
        let s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);
        r.take_commands();
        bridge.rebuild(&s, &mut r);
        let removed: Vec<_> = r
            .commands()
            .iter()
            .take(5)
            .filter_map(|c| match c {
                RenderCommand::Remove(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec![MODEL_OBJECT, SECTION_OBJECT, "domain0", "domain1", "domain2"]);
        assert_eq!(r.object_names().count(), 3);
    }

    #[test]
    fn flipped_section_negates_clip_plane() {
        let mut s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);
        let Some(Clipping::Plane(before)) = r.object(MODEL_OBJECT).and_then(|m| m.clipping.clone())
        else {
            panic!("expected clip plane");
        };

        if let Some(sec) = s.model.section.as_mut() {
            sec.flipped = true;
        }
        bridge.update_section(&s, &mut r);
        let Some(Clipping::Plane(after)) = r.object(MODEL_OBJECT).and_then(|m| m.clipping.clone())
        else {
            panic!("expected clip plane");
        };
        assert_eq!(after, before.flipped());
    }

    #[test]
    fn hidden_section_clears_clipping() {
        let mut s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);
        if let Some(sec) = s.model.section.as_mut() {
            sec.visible = false;
        }
        bridge.update_section(&s, &mut r);
        assert_eq!(r.object(SECTION_OBJECT).and_then(|o| o.visible), Some(false));
        assert_eq!(
            r.object(MODEL_OBJECT).and_then(|o| o.clipping.clone()),
            Some(Clipping::Off)
        );
    }

    #[test]
    fn targeted_domain_update_touches_one_domain() {
        let mut s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);
        r.take_commands();

        s.model.domains[0].color = "123456".to_string();
        bridge.update_domain(&s, &mut r, 0);
        let touched: Vec<&str> = r
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Update(o) | RenderCommand::Add(o) => Some(o.name.as_str()),
                _ => None,
            })
            .collect();
        assert!(touched.contains(&"domain0"));
        assert!(!touched.iter().any(|n| *n == "domain1" || *n == "domain2"));
        assert_eq!(r.object("domain0").and_then(|o| o.color), Some(0x123456));
    }

    #[test]
    fn showing_a_domain_adds_its_mesh() {
        let mut s = state();
        let mut r = renderer();
        let mut bridge = RenderBridge::new();
        bridge.rebuild(&s, &mut r);
        assert!(r.object("domain1").is_none());
        s.model.domains[1].visible = true;
        bridge.set_domain(&s, &mut r, 1);
        let dom = r.object("domain1").expect("domain1 added");
        assert_eq!(dom.mode, Some(RenderMode::Point));
    }
}
