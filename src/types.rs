//! GPU-facing plain data. Every struct here is `Pod` and laid out to match
//! the uniform and vertex declarations in `mesh.wgsl` and `lines.wgsl`.

/// Mesh vertex: position, normal, uv
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Colored line vertex for helpers
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

/// Per-node transform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

/// Aggregated scene lighting. `w` components carry intensities or enable flags.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    /// rgb = summed ambient color * intensity
    pub ambient: [f32; 4],
    /// rgb = sky color, w = intensity (0 when absent)
    pub hemi_sky: [f32; 4],
    /// rgb = ground color
    pub hemi_ground: [f32; 4],
    /// xyz = normalized direction towards the sky
    pub hemi_direction: [f32; 4],
    /// xyz = world position, w = 1 when present
    pub point_position: [f32; 4],
    /// rgb = color, w = intensity
    pub point_color: [f32; 4],
}

pub mod material_flags {
    pub const MAP: u32 = 1 << 0;
    pub const ALPHA_MAP: u32 = 1 << 1;
    pub const AO_MAP: u32 = 1 << 2;
    pub const DISPLACEMENT_MAP: u32 = 1 << 3;
    pub const NORMAL_MAP: u32 = 1 << 4;
    pub const METALNESS_MAP: u32 = 1 << 5;
    pub const ROUGHNESS_MAP: u32 = 1 << 6;
    pub const MATCAP: u32 = 1 << 7;
    pub const GRADIENT_MAP: u32 = 1 << 8;
    pub const ENV_MAP: u32 = 1 << 9;
    pub const TRANSPARENT: u32 = 1 << 10;
    pub const DOUBLE_SIDED: u32 = 1 << 11;
}

/// Material parameters for the mesh shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// linear rgb + opacity
    pub color: [f32; 4],
    pub kind: u32,
    pub flags: u32,
    pub _pad0: [u32; 2],
    pub metalness: f32,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub displacement_scale: f32,
    pub shininess: f32,
    pub _pad1: [f32; 3],
}
