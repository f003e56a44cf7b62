use glam::Vec3;

use super::{asset, MaterialChoice, SceneSetup};
use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::geometry::Geometry;
use crate::math::Color;
use crate::params::{camera_folder, Binding, Control, ControlParams, Folder, Panel, Range};
use crate::scene::{Light, Material, MaterialId, MaterialKind, Node, NodeKind, Scene, Side};
use crate::textures::{Placeholder, TextureDesc, TextureId};

const ENV_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

struct DoorTextures {
    color: TextureId,
    alpha: TextureId,
    height: TextureId,
    normal: TextureId,
    ao: TextureId,
    metalness: TextureId,
    roughness: TextureId,
}

fn load_door_textures(scene: &mut Scene) -> DoorTextures {
    let mut data = |name: &str, placeholder| {
        scene
            .textures
            .load(TextureDesc::data(asset(&format!("door/{}", name)), placeholder))
    };
    let alpha = data("alpha.jpg", Placeholder::White);
    let height = data("height.png", Placeholder::Black);
    let normal = data("normal.jpg", Placeholder::FlatNormal);
    let ao = data("ao.jpg", Placeholder::White);
    let metalness = data("metallic.jpg", Placeholder::White);
    let roughness = data("roughness.jpg", Placeholder::White);
    let color = scene
        .textures
        .load(TextureDesc::color(asset("door/color.jpg")).nearest());

    DoorTextures {
        color,
        alpha,
        height,
        normal,
        ao,
        metalness,
        roughness,
    }
}

/// Register every material variant; returns the one picked by `choice`
fn add_materials(scene: &mut Scene, choice: MaterialChoice) -> MaterialId {
    let door = load_door_textures(scene);
    let matcap = scene
        .textures
        .load(TextureDesc::color(asset("matcaps/8.png")));
    let gradient = scene
        .textures
        .load(TextureDesc::color(asset("gradients/5.jpg")).nearest());
    let env = scene.textures.load(TextureDesc::cube(
        ENV_FACES.map(|face| asset(&format!("environmentMaps/0/{}.jpg", face))),
    ));

    let mut basic = Material::new("basic", MaterialKind::Basic).with_map(door.color);
    basic.transparent = true;
    basic.textures.alpha_map = Some(door.alpha);
    basic.side = Side::Double;

    let normal = Material::new("normal", MaterialKind::Normal);

    let mut matcap_material = Material::new("matcap", MaterialKind::Matcap);
    matcap_material.textures.matcap = Some(matcap);

    let lambert = Material::new("lambert", MaterialKind::Lambert);
    let phong = Material::new("phong", MaterialKind::Phong);

    let mut toon = Material::new("toon", MaterialKind::Toon);
    toon.textures.gradient_map = Some(gradient);

    let mut standard = Material::new("standard", MaterialKind::Standard).with_map(door.color);
    standard.metalness = 0.0;
    standard.roughness = 1.0;
    standard.textures.ao_map = Some(door.ao);
    standard.textures.displacement_map = Some(door.height);
    standard.displacement_scale = 0.05;
    standard.textures.metalness_map = Some(door.metalness);
    standard.textures.roughness_map = Some(door.roughness);
    standard.textures.normal_map = Some(door.normal);
    standard.side = Side::Double;
    standard.transparent = true;
    standard.textures.alpha_map = Some(door.alpha);

    let mut env_material = Material::new("env", MaterialKind::Standard);
    env_material.metalness = 0.7;
    env_material.roughness = 0.2;
    env_material.textures.env_map = Some(env);

    // same order as the MaterialChoice variants
    let variants = [
        basic,
        normal,
        matcap_material,
        lambert,
        phong,
        toon,
        standard,
        env_material,
    ];
    let ids = variants.map(|material| scene.add_material(material));
    ids[choice as usize]
}

/// Sphere, plane and torus sharing one material, lit by ambient and point lights
pub fn create_materials_scene(choice: MaterialChoice, aspect: f32) -> SceneSetup {
    let mut scene = Scene::new();
    let material = add_materials(&mut scene, choice);

    let sphere_geometry = scene.add_geometry(Geometry::sphere(0.5, 64, 64));
    let plane_geometry = scene.add_geometry(Geometry::plane(1.0, 1.0, 64, 64));
    let torus_geometry = scene.add_geometry(Geometry::torus(0.35, 0.2, 64, 128));

    let axes = scene.add(Node::new("axes", NodeKind::AxesHelper { size: 3.0 }));
    let sphere = scene.add(
        Node::new(
            "sphere",
            NodeKind::Mesh {
                geometry: sphere_geometry,
                material,
            },
        )
        .at(Vec3::new(-1.5, 0.0, 0.0)),
    );
    let plane = scene.add_mesh("plane", plane_geometry, material);
    let torus = scene.add(
        Node::new(
            "torus",
            NodeKind::Mesh {
                geometry: torus_geometry,
                material,
            },
        )
        .at(Vec3::new(1.5, 0.0, 0.0)),
    );

    scene.add(Node::new(
        "ambient light",
        NodeKind::Light(Light::Ambient {
            color: Color::from_hex(0xffffff),
            intensity: 0.5,
        }),
    ));
    let point_light = scene.add(
        Node::new(
            "point light",
            NodeKind::Light(Light::Point {
                color: Color::from_hex(0xffffff),
                intensity: 1.0,
            }),
        )
        .at(Vec3::new(2.0, 3.0, 4.0)),
    );

    let mut camera = PerspectiveCamera::new(50.0, aspect);
    camera.position = Vec3::new(0.0, 0.0, 4.0);
    camera.look_at(Vec3::ZERO);

    let mut controls = OrbitControls::new(Vec3::ZERO);
    controls.auto_rotate = false;
    controls.auto_rotate_speed = 1.0;
    controls.enable_damping = true;

    let params = ControlParams::default();

    let panel = Panel::new(300.0)
        .with(
            Folder::new("Material", true)
                .with(Control::slider(
                    "metalness",
                    Binding::Metalness(material),
                    Range::new(0.0, 1.0, 0.1),
                ))
                .with(Control::slider(
                    "roughness",
                    Binding::Roughness(material),
                    Range::new(0.0, 1.0, 0.1),
                ))
                .with(Control::slider(
                    "aoMapIntensity",
                    Binding::AoMapIntensity(material),
                    Range::new(0.0, 10.0, 0.01),
                ))
                .with(Control::slider(
                    "displacementScale",
                    Binding::DisplacementScale(material),
                    Range::new(0.0, 5.0, 0.01),
                ))
                .with(Control::color("color", material)),
        )
        .with(
            Folder::new("Visibility", true)
                .with(Control::slider(
                    "Cam speed",
                    Binding::RotationSpeed,
                    Range::new(0.0, 1.0, 0.1),
                ))
                .with(Control::toggle("rotateObjects", Binding::RotateObjects))
                .with(Control::slider(
                    "light intensity",
                    Binding::LightIntensity(point_light),
                    Range::new(0.0, 2.0, 0.1),
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
        animated: vec![sphere, plane, torus],
        title: "Materials",
    }
}
