use std::collections::BTreeMap;

use foundation::math::Vec3;
use scene::CameraHome;

use crate::renderer::{Renderer, SceneObject};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Add(SceneObject),
    Update(SceneObject),
    Remove(String),
    SetCamera {
        center: Vec3,
        near: f64,
        far: f64,
        position: Vec3,
    },
    SetHome {
        position: Vec3,
        up: Vec3,
    },
    GoHome,
    BoundingVertices {
        url: String,
        voxel_size: Vec3,
    },
    ClearColor(u32),
}

/// A [`Renderer`] that records every call and keeps a merged view of the
/// live scene objects. Used by tests and by the command-line tools to show
/// what a front end would draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
    objects: BTreeMap<String, SceneObject>,
    view: CameraHome,
    home: (Vec3, Vec3),
    section_vertices: Vec<Vec3>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices returned by every `bounding_vertices` call.
    pub fn with_section_vertices(mut self, vertices: Vec<Vec3>) -> Self {
        self.section_vertices = vertices;
        self
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.get(name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.keys().map(String::as_str)
    }

    /// Moves the live camera, as user interaction with the canvas would.
    pub fn set_view(&mut self, view: CameraHome) {
        self.view = view;
    }
}

impl Renderer for RecordingRenderer {
    fn add_scene_object(&mut self, spec: SceneObject) {
        self.objects.insert(spec.name.clone(), spec.clone());
        self.commands.push(RenderCommand::Add(spec));
    }

    fn update_scene_object(&mut self, update: SceneObject) {
        if let Some(obj) = self.objects.get_mut(&update.name) {
            obj.merge(update.clone());
        }
        self.commands.push(RenderCommand::Update(update));
    }

    fn remove_scene_object(&mut self, name: &str) {
        self.objects.remove(name);
        self.commands.push(RenderCommand::Remove(name.to_string()));
    }

    fn set_camera(&mut self, center: Vec3, near: f64, far: f64, position: Vec3) {
        self.view.center = center.into();
        self.view.near = near;
        self.view.far = far;
        self.view.position = position.into();
        self.commands.push(RenderCommand::SetCamera {
            center,
            near,
            far,
            position,
        });
    }

    fn set_home(&mut self, position: Vec3, up: Vec3) {
        self.home = (position, up);
        self.commands.push(RenderCommand::SetHome { position, up });
    }

    fn go_home(&mut self) {
        self.view.position = self.home.0.into();
        self.view.up = self.home.1.into();
        self.commands.push(RenderCommand::GoHome);
    }

    fn bounding_vertices(&mut self, url: &str, voxel_size: Vec3) -> Vec<Vec3> {
        self.commands.push(RenderCommand::BoundingVertices {
            url: url.to_string(),
            voxel_size,
        });
        self.section_vertices.clone()
    }

    fn current_view(&self) -> CameraHome {
        self.view
    }

    fn set_clear_color(&mut self, color: u32) {
        self.commands.push(RenderCommand::ClearColor(color));
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordingRenderer, RenderCommand};
    use crate::renderer::{Renderer, SceneObject};
    use foundation::math::Vec3;

    #[test]
    fn tracks_live_objects() {
        let mut r = RecordingRenderer::new();
        r.add_scene_object(SceneObject::named("a").color(0xff));
        r.update_scene_object(SceneObject::named("a").visible(false));
        r.update_scene_object(SceneObject::named("ghost").visible(true));
        assert_eq!(r.object("a").and_then(|o| o.visible), Some(false));
        assert!(r.object("ghost").is_none());
        r.remove_scene_object("a");
        assert_eq!(r.object_names().count(), 0);
        assert_eq!(r.commands().len(), 4);
    }

    #[test]
    fn go_home_moves_view_to_home() {
        let mut r = RecordingRenderer::new();
        r.set_camera(Vec3::ZERO, 1.0, 100.0, Vec3::new(0.0, 0.0, 50.0));
        r.set_home(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 1.0, 0.0));
        r.go_home();
        let v = r.current_view();
        assert_eq!(v.position, [0.0, 0.0, 20.0]);
        assert_eq!(v.far, 100.0);
        assert_eq!(r.take_commands().last(), Some(&RenderCommand::GoHome));
        assert!(r.commands().is_empty());
    }
}
