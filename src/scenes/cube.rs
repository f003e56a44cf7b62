use glam::Vec3;

use super::{asset, SceneSetup};
use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::{camera_folder, Axis, Binding, Control, ControlParams, Folder, Panel, Range};
use crate::scene::{Light, Material, MaterialKind, Node, NodeKind, Scene};
use crate::textures::TextureDesc;

/// A pixel-art textured cube under a hemisphere light
pub fn create_cube_scene(aspect: f32) -> SceneSetup {
    let mut scene = Scene::new();

    let color_texture = scene
        .textures
        .load(TextureDesc::color(asset("minecraft.png")).nearest());

    let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
    let material = scene.add_material(
        Material::new("cube", MaterialKind::Phong).with_map(color_texture),
    );

    let axes = scene.add(Node::new("axes", NodeKind::AxesHelper { size: 3.0 }));
    let cube = scene.add_mesh("cube", geometry, material);
    let light = scene.add(
        Node::new(
            "hemisphere light",
            NodeKind::Light(Light::Hemisphere {
                sky: Color::from_hex(0xffffff),
                ground: Color::from_hex(0x080820),
                intensity: 1.5,
            }),
        )
        .at(Vec3::new(2.0, 0.0, 0.0)),
    );

    let mut camera = PerspectiveCamera::new(50.0, aspect);
    camera.position = Vec3::new(0.0, 0.0, 3.0);
    camera.look_at(Vec3::ZERO);

    let mut controls = OrbitControls::new(Vec3::ZERO);
    controls.auto_rotate = true;
    controls.auto_rotate_speed = 1.0;
    controls.enable_damping = true;

    let params = ControlParams {
        color: scene.material(material).map_or(Color::WHITE, |m| m.color),
        ..ControlParams::default()
    };

    let position = Range::new(-3.0, 3.0, 0.01);
    let panel = Panel::new(250.0)
        .with(
            Folder::new("Position", false)
                .with(Control::slider("x", Binding::Position(cube, Axis::X), position))
                .with(Control::slider("y", Binding::Position(cube, Axis::Y), position))
                .with(Control::slider("z", Binding::Position(cube, Axis::Z), position)),
        )
        .with(
            Folder::new("Visibility", true)
                .with(Control::color("color", material))
                .with(Control::toggle("visible", Binding::Visible(cube)))
                .with(Control::slider(
                    "light intensity",
                    Binding::LightIntensity(light),
                    Range::new(0.0, 10.0, 0.1),
                ))
                .with(Control::toggle("wireframe", Binding::Wireframe(material)))
                .with(Control::toggle("Axes Helper", Binding::Visible(axes))),
        )
        .with(camera_folder());

    SceneSetup {
        scene,
        camera,
        controls,
        params,
        panel,
        animated: Vec::new(),
        title: "Cube",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::{Filter, TextureSource};

    #[test]
    fn test_cube_scene_contents() {
        let setup = create_cube_scene(1.5);
        let scene = &setup.scene;

        let cube = scene.node(scene.find("cube").unwrap()).unwrap();
        let material = scene.material(cube.material().unwrap()).unwrap();
        assert_eq!(material.kind, MaterialKind::Phong);
        assert!(!material.wireframe);

        let map = scene.textures.get(material.textures.map.unwrap()).unwrap();
        assert_eq!(map.filter, Filter::Nearest);
        assert_eq!(map.source, TextureSource::Image(asset("minecraft.png")));

        let light = scene.node(scene.find("hemisphere light").unwrap()).unwrap();
        assert_eq!(light.position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(light.light().unwrap().intensity(), 1.5);

        assert!(setup.animated.is_empty());
        assert!(setup.controls.auto_rotate);
        assert_eq!(setup.camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(setup.camera.fov, 50.0);
    }

    #[test]
    fn test_cube_panel_layout() {
        let setup = create_cube_scene(1.0);
        assert_eq!(setup.panel.width, 250.0);

        let titles: Vec<_> = setup.panel.folders.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Position", "Visibility", "Camera"]);
        assert!(setup.panel.folders[1].open && setup.panel.folders[2].open);

        match setup.panel.find("light intensity") {
            Some(Control::Slider { range, .. }) => assert_eq!(*range, Range::new(0.0, 10.0, 0.1)),
            other => panic!("unexpected control {:?}", other),
        }
    }
}
