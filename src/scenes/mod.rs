mod cube;
mod materials;

use std::path::PathBuf;

use clap::ValueEnum;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::params::{ControlParams, Panel};
use crate::scene::{NodeId, Scene};

pub use cube::create_cube_scene;
pub use materials::create_materials_scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SceneKind {
    /// Textured cube with a hemisphere light
    Cube,
    /// Sphere, plane and torus sharing one material
    #[default]
    Materials,
}

/// Which of the material variants the materials scene puts on its meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MaterialChoice {
    Basic,
    Normal,
    Matcap,
    Lambert,
    Phong,
    Toon,
    #[default]
    Standard,
    /// Shiny standard material reflecting the environment cube map
    Env,
}

/// Everything a scene builder hands to the render loop
pub struct SceneSetup {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub params: ControlParams,
    pub panel: Panel,
    /// Nodes spun by the "rotate objects" toggle
    pub animated: Vec<NodeId>,
    pub title: &'static str,
}

pub fn create_scene(kind: SceneKind, material: MaterialChoice, aspect: f32) -> SceneSetup {
    log::info!("Loading scene: {:?}", kind);
    match kind {
        SceneKind::Cube => create_cube_scene(aspect),
        SceneKind::Materials => create_materials_scene(material, aspect),
    }
}

/// Asset path relative to the assets root
pub(crate) fn asset(relative: &str) -> PathBuf {
    PathBuf::from("textures").join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_kind_parses_from_cli_names() {
        assert_eq!(SceneKind::from_str("cube", true), Ok(SceneKind::Cube));
        assert_eq!(SceneKind::from_str("materials", true), Ok(SceneKind::Materials));
        assert_eq!(MaterialChoice::from_str("env", true), Ok(MaterialChoice::Env));
        assert!(SceneKind::from_str("tunnel", true).is_err());
    }

    #[test]
    fn test_every_scene_starts_settled() {
        for kind in [SceneKind::Cube, SceneKind::Materials] {
            let setup = create_scene(kind, MaterialChoice::default(), 4.0 / 3.0);
            assert_eq!(setup.camera.aspect, 4.0 / 3.0);
            assert!(!setup.params.rotate_objects);
            assert!(setup.controls.enable_damping);
            assert_eq!(setup.controls.auto_rotate_speed, 1.0);
        }
    }
}
