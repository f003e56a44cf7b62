//! Scene graph: an arena of nodes plus the materials, geometries and textures
//! they reference. Everything is built once at startup; afterwards only the
//! control surface (parameter edits) and the render loop (rotations) mutate it.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::geometry::Geometry;
use crate::math::Color;
use crate::textures::{TextureId, TextureLibrary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Unlit color and map
    Basic,
    /// Normals mapped to RGB
    Normal,
    /// Lighting baked into a matcap texture
    Matcap,
    Lambert,
    Phong,
    Toon,
    /// Metalness/roughness PBR
    Standard,
}

impl MaterialKind {
    pub fn shader_index(&self) -> u32 {
        match self {
            MaterialKind::Basic => 0,
            MaterialKind::Normal => 1,
            MaterialKind::Matcap => 2,
            MaterialKind::Lambert => 3,
            MaterialKind::Phong => 4,
            MaterialKind::Toon => 5,
            MaterialKind::Standard => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Optional texture inputs of a material
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureSlots {
    pub map: Option<TextureId>,
    pub alpha_map: Option<TextureId>,
    pub ao_map: Option<TextureId>,
    pub displacement_map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub metalness_map: Option<TextureId>,
    pub roughness_map: Option<TextureId>,
    pub matcap: Option<TextureId>,
    pub gradient_map: Option<TextureId>,
    pub env_map: Option<TextureId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub color: Color,
    pub wireframe: bool,
    pub side: Side,
    pub transparent: bool,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub shininess: f32,
    pub ao_map_intensity: f32,
    pub displacement_scale: f32,
    pub textures: TextureSlots,
}

impl Material {
    pub fn new(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: Color::WHITE,
            wireframe: false,
            side: Side::Front,
            transparent: false,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            shininess: 30.0,
            ao_map_intensity: 1.0,
            displacement_scale: 1.0,
            textures: TextureSlots::default(),
        }
    }

    pub fn with_map(mut self, map: TextureId) -> Self {
        self.textures.map = Some(map);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Ambient {
        color: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
    },
}

impl Light {
    pub fn intensity(&self) -> f32 {
        match *self {
            Light::Hemisphere { intensity, .. }
            | Light::Ambient { intensity, .. }
            | Light::Point { intensity, .. } => intensity,
        }
    }

    pub fn intensity_mut(&mut self) -> &mut f32 {
        match self {
            Light::Hemisphere { intensity, .. }
            | Light::Ambient { intensity, .. }
            | Light::Point { intensity, .. } => intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    Light(Light),
    AxesHelper {
        size: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub position: Vec3,
    /// Euler angles in radians, XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: true,
            kind,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn material(&self) -> Option<MaterialId> {
        match self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// Root container owning every node for the lifetime of the window
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    materials: Vec<Material>,
    geometries: Vec<Geometry>,
    pub textures: TextureLibrary,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    /// Add a mesh node using existing geometry and material
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        geometry: GeometryId,
        material: MaterialId,
    ) -> NodeId {
        self.add(Node::new(name, NodeKind::Mesh { geometry, material }))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i), m))
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &Geometry)> {
        self.geometries
            .iter()
            .enumerate()
            .map(|(i, g)| (GeometryId(i), g))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(NodeId)
    }
}
