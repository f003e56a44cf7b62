use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::app::{App, FrameTarget};
use crate::core::GpuContext;
use crate::error::Result;
use crate::geometry::{axes_lines, Geometry};
use crate::gui::{self, ControlSurface};
use crate::scene::{GeometryId, Light, Material, MaterialId, NodeId, NodeKind, Scene, Side, TextureSlots};
use crate::textures::{ColorSpace, Filter, LoadedImage, TextureDesc, TextureId, TextureLoader};
use crate::types::{
    material_flags, CameraUniform, LightsUniform, LineVertex, MaterialUniform, ObjectUniform,
    Vertex,
};
use crate::viewport::{self, SurfaceSize};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// 2D texture slots of a material, in binding order after the uniform
const TEXTURE_SLOTS: u32 = 9;
const ENV_BINDING: u32 = TEXTURE_SLOTS + 1;
const FIRST_SAMPLER_BINDING: u32 = ENV_BINDING + 1;

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    wire_indices: wgpu::Buffer,
    wire_count: u32,
}

struct GpuObject {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuTexture {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    is_cube: bool,
}

struct AxesHelper {
    node: NodeId,
    vertices: wgpu::Buffer,
    count: u32,
}

/// One mesh draw, in submission order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub wireframe: bool,
    pub transparent: bool,
    /// Distance along the view direction
    pub depth: f32,
}

/// Visible meshes with opaque ones first (scene order), then transparent
/// ones sorted back to front
pub fn draw_order(scene: &Scene, view: Mat4) -> Vec<DrawItem> {
    let mut items: Vec<DrawItem> = scene
        .nodes()
        .filter(|(_, node)| node.visible)
        .filter_map(|(id, node)| match node.kind {
            NodeKind::Mesh { geometry, material } => {
                let mat = scene.material(material)?;
                let depth = -view.transform_point3(node.position).z;
                Some(DrawItem {
                    node: id,
                    geometry,
                    material,
                    wireframe: mat.wireframe,
                    transparent: mat.transparent,
                    depth,
                })
            }
            _ => None,
        })
        .collect();

    // stable: opaque keep scene order
    items.sort_by(|a, b| match (a.transparent, b.transparent) {
        (false, false) => std::cmp::Ordering::Equal,
        (false, true) => std::cmp::Ordering::Less,
        (true, false) => std::cmp::Ordering::Greater,
        (true, true) => b.depth.total_cmp(&a.depth),
    });
    items
}

pub fn material_uniform(material: &Material) -> MaterialUniform {
    let t = &material.textures;
    let slots = [
        (t.map, material_flags::MAP),
        (t.alpha_map, material_flags::ALPHA_MAP),
        (t.ao_map, material_flags::AO_MAP),
        (t.displacement_map, material_flags::DISPLACEMENT_MAP),
        (t.normal_map, material_flags::NORMAL_MAP),
        (t.metalness_map, material_flags::METALNESS_MAP),
        (t.roughness_map, material_flags::ROUGHNESS_MAP),
        (t.matcap, material_flags::MATCAP),
        (t.gradient_map, material_flags::GRADIENT_MAP),
        (t.env_map, material_flags::ENV_MAP),
    ];
    let mut flags = slots
        .iter()
        .filter(|(slot, _)| slot.is_some())
        .fold(0, |flags, (_, flag)| flags | flag);
    if material.transparent {
        flags |= material_flags::TRANSPARENT;
    }
    if material.side == Side::Double {
        flags |= material_flags::DOUBLE_SIDED;
    }

    let [r, g, b] = material.color.to_linear();
    MaterialUniform {
        color: [r, g, b, material.opacity],
        kind: material.kind.shader_index(),
        flags,
        _pad0: [0; 2],
        metalness: material.metalness,
        roughness: material.roughness,
        ao_map_intensity: material.ao_map_intensity,
        displacement_scale: material.displacement_scale,
        shininess: material.shininess,
        _pad1: [0.0; 3],
    }
}

/// Fold the scene's lights into the fixed light set the shader understands.
/// Ambient lights add up; the last visible hemisphere and point light win.
pub fn lights_uniform(scene: &Scene) -> LightsUniform {
    let mut lights = LightsUniform::default();
    for (_, node) in scene.nodes().filter(|(_, n)| n.visible) {
        match node.light() {
            Some(Light::Ambient { color, intensity }) => {
                let c = color.to_linear();
                for i in 0..3 {
                    lights.ambient[i] += c[i] * intensity;
                }
            }
            Some(Light::Hemisphere {
                sky,
                ground,
                intensity,
            }) => {
                let [r, g, b] = sky.to_linear();
                lights.hemi_sky = [r, g, b, *intensity];
                let [r, g, b] = ground.to_linear();
                lights.hemi_ground = [r, g, b, 0.0];
                let up = node.position.try_normalize().unwrap_or(Vec3::Y);
                lights.hemi_direction = up.extend(0.0).to_array();
            }
            Some(Light::Point { color, intensity }) => {
                lights.point_position = node.position.extend(1.0).to_array();
                let [r, g, b] = color.to_linear();
                lights.point_color = [r, g, b, *intensity];
            }
            None => {}
        }
    }
    lights
}

fn object_uniform(model: Mat4) -> ObjectUniform {
    ObjectUniform {
        model: model.to_cols_array_2d(),
        normal: model.inverse().transpose().to_cols_array_2d(),
    }
}

fn slot_textures(slots: &TextureSlots) -> [Option<TextureId>; TEXTURE_SLOTS as usize] {
    [
        slots.map,
        slots.alpha_map,
        slots.ao_map,
        slots.displacement_map,
        slots.normal_map,
        slots.metalness_map,
        slots.roughness_map,
        slots.matcap,
        slots.gradient_map,
    ]
}

/// Rasterizes the scene and draws the egui overlay on top
pub struct Renderer {
    window: Arc<Window>,
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    lines_pipeline: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    objects: Vec<Option<GpuObject>>,
    materials: Vec<GpuMaterial>,
    textures: Vec<GpuTexture>,
    texture_descs: Vec<TextureDesc>,
    blank_2d: GpuTexture,
    blank_cube: GpuTexture,
    helpers: Vec<AxesHelper>,
    loader: TextureLoader,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        assets: &Path,
        size: SurfaceSize,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;
        let device = gpu.device();

        let config = Self::create_surface_config(&surface, gpu.adapter(), size);
        surface.configure(device, &config);
        let depth_view = Self::create_depth_view(device, size);

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let material_layout = Self::create_material_layout(device);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[lights_uniform(scene)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let lines_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lines Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });
        let lines_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lines Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("lines.wgsl").into()),
        });

        let mesh_pipeline = Self::create_pipeline(
            device,
            "Mesh Pipeline",
            &mesh_layout,
            &mesh_shader,
            Vertex::layout(),
            wgpu::PrimitiveTopology::TriangleList,
            config.format,
        );
        let wire_pipeline = Self::create_pipeline(
            device,
            "Wireframe Pipeline",
            &mesh_layout,
            &mesh_shader,
            Vertex::layout(),
            wgpu::PrimitiveTopology::LineList,
            config.format,
        );
        let lines_pipeline = Self::create_pipeline(
            device,
            "Lines Pipeline",
            &lines_layout,
            &lines_shader,
            LineVertex::layout(),
            wgpu::PrimitiveTopology::LineList,
            config.format,
        );

        let meshes = scene
            .geometries()
            .map(|(id, geometry)| Self::upload_geometry(device, id, geometry))
            .collect();

        let texture_descs: Vec<TextureDesc> =
            scene.textures.iter().map(|(_, desc)| desc.clone()).collect();
        let textures = texture_descs
            .iter()
            .enumerate()
            .map(|(index, desc)| {
                let placeholder = LoadedImage::solid(desc.placeholder.rgba(), desc.source.layers());
                create_texture(&gpu, desc.color_space, desc.filter, &placeholder, &format!("Texture {}", index))
            })
            .collect();
        let blank_2d = create_texture(
            &gpu,
            ColorSpace::Linear,
            Filter::Nearest,
            &LoadedImage::solid([255; 4], 1),
            "Blank Texture",
        );
        let blank_cube = create_texture(
            &gpu,
            ColorSpace::Linear,
            Filter::Nearest,
            &LoadedImage::solid([0, 0, 0, 255], 6),
            "Blank Cube",
        );

        let loader = TextureLoader::spawn(&scene.textures, assets);

        let mut objects = Vec::with_capacity(scene.node_count());
        let mut helpers = Vec::new();
        for (id, node) in scene.nodes() {
            let object = match node.kind {
                NodeKind::Mesh { .. } => Some(Self::create_object(device, &object_layout, node.transform())),
                NodeKind::AxesHelper { size } => {
                    let lines = axes_lines(size);
                    helpers.push(AxesHelper {
                        node: id,
                        vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Axes Vertices"),
                            contents: bytemuck::cast_slice(&lines),
                            usage: wgpu::BufferUsages::VERTEX,
                        }),
                        count: lines.len() as u32,
                    });
                    Some(Self::create_object(device, &object_layout, node.transform()))
                }
                NodeKind::Light(_) => None,
            };
            objects.push(object);
        }

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let mut renderer = Self {
            window,
            gpu,
            surface,
            config,
            depth_view,
            mesh_pipeline,
            wire_pipeline,
            lines_pipeline,
            material_layout,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            meshes,
            objects,
            materials: Vec::new(),
            textures,
            texture_descs,
            blank_2d,
            blank_cube,
            helpers,
            loader,
            egui_renderer,
            egui_state,
            egui_ctx,
        };
        renderer.materials = scene
            .materials()
            .map(|(_, material)| renderer.create_material(material))
            .collect();

        log::info!(
            "Renderer initialized: {} meshes, {} materials, {} textures, surface {}x{}",
            renderer.meshes.len(),
            renderer.materials.len(),
            renderer.textures.len(),
            renderer.config.width,
            renderer.config.height
        );
        Ok(renderer)
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: SurfaceSize,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(device: &wgpu::Device, size: SurfaceSize) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let mut entries = vec![uniform_entry(0, stages)];
        for binding in 1..=ENV_BINDING {
            let view_dimension = if binding == ENV_BINDING {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            };
            entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: stages,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            });
        }
        for binding in FIRST_SAMPLER_BINDING..FIRST_SAMPLER_BINDING + ENV_BINDING {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: stages,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &entries,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        topology: wgpu::PrimitiveTopology,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // front/back selection happens in the fragment shader
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn upload_geometry(device: &wgpu::Device, id: GeometryId, geometry: &Geometry) -> GpuMesh {
        let wire = geometry.wireframe_indices();
        log::debug!(
            "Geometry {}: {} vertices, {} triangles",
            id.0,
            geometry.vertices.len(),
            geometry.triangle_count()
        );
        GpuMesh {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: geometry.indices.len() as u32,
            wire_indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Wireframe Index Buffer"),
                contents: bytemuck::cast_slice(&wire),
                usage: wgpu::BufferUsages::INDEX,
            }),
            wire_count: wire.len() as u32,
        }
    }

    fn create_object(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, model: Mat4) -> GpuObject {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Buffer"),
            contents: bytemuck::cast_slice(&[object_uniform(model)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        GpuObject { buffer, bind_group }
    }

    fn create_material(&self, material: &Material) -> GpuMaterial {
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Buffer"),
                contents: bytemuck::cast_slice(&[material_uniform(material)]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.material_bind_group(&buffer, &material.textures);
        GpuMaterial { buffer, bind_group }
    }

    fn material_bind_group(&self, buffer: &wgpu::Buffer, slots: &TextureSlots) -> wgpu::BindGroup {
        let flat: Vec<&GpuTexture> = slot_textures(slots)
            .iter()
            .map(|slot| {
                slot.and_then(|id| self.textures.get(id.0))
                    .filter(|t| !t.is_cube)
                    .unwrap_or(&self.blank_2d)
            })
            .collect();
        let env = slots
            .env_map
            .and_then(|id| self.textures.get(id.0))
            .filter(|t| t.is_cube)
            .unwrap_or(&self.blank_cube);
        let all: Vec<&GpuTexture> = flat.into_iter().chain(std::iter::once(env)).collect();

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }];
        for (i, texture) in all.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + i as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        for (i, texture) in all.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: FIRST_SAMPLER_BINDING + i as u32,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }

        self.gpu
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("material_bind_group"),
                layout: &self.material_layout,
                entries: &entries,
            })
    }

    /// Swap placeholders for decoded images; rebind materials if anything changed
    fn upload_finished_textures(&mut self, scene: &Scene) {
        let finished = self.loader.poll();
        if finished.is_empty() {
            return;
        }

        let max_dimension = self.gpu.device().limits().max_texture_dimension_2d;
        for (id, image) in finished {
            let Some(desc) = self.texture_descs.get(id.0) else {
                continue;
            };
            if image.layers != desc.source.layers() {
                log::warn!("Texture {} has {} layers, expected {}", id.0, image.layers, desc.source.layers());
                continue;
            }
            if let Err(reason) = image.check_uploadable(max_dimension) {
                log::warn!("Texture {} kept as placeholder: {}", id.0, reason);
                continue;
            }
            let texture = create_texture(
                &self.gpu,
                desc.color_space,
                desc.filter,
                &image,
                &format!("Texture {}", id.0),
            );
            self.textures[id.0] = texture;
        }

        let rebound: Vec<wgpu::BindGroup> = scene
            .materials()
            .zip(&self.materials)
            .map(|((_, material), gpu)| self.material_bind_group(&gpu.buffer, &material.textures))
            .collect();
        for (gpu, bind_group) in self.materials.iter_mut().zip(rebound) {
            gpu.bind_group = bind_group;
        }
        log::debug!("{} textures still loading", self.loader.pending());
    }

    fn write_uniforms(&self, app: &App) {
        let queue = self.gpu.queue();
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[app.camera.to_uniform()]),
        );
        queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::cast_slice(&[lights_uniform(&app.scene)]),
        );

        for (id, node) in app.scene.nodes() {
            if let Some(Some(object)) = self.objects.get(id.0) {
                queue.write_buffer(
                    &object.buffer,
                    0,
                    bytemuck::cast_slice(&[object_uniform(node.transform())]),
                );
            }
        }
        for ((_, material), gpu) in app.scene.materials().zip(&self.materials) {
            queue.write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[material_uniform(material)]));
        }
    }

    /// Reconfigure the surface and depth buffer for a new drawing-buffer size
    pub fn resize(&mut self, size: SurfaceSize) {
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(self.gpu.device(), &self.config);
        self.depth_view = Self::create_depth_view(self.gpu.device(), size);
        log::debug!("Surface resized to {}x{}", size.width, size.height);
    }

    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// True while egui wants pointer input (dragging a slider, hovering the panel)
    pub fn wants_pointer(&self) -> bool {
        self.egui_ctx.wants_pointer_input() || self.egui_ctx.is_pointer_over_area()
    }

    fn draw_scene(&self, app: &App, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let items = draw_order(&app.scene, app.camera.view_matrix());
        let (opaque, transparent): (Vec<DrawItem>, Vec<DrawItem>) =
            items.into_iter().partition(|item| !item.transparent);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for item in &opaque {
            self.draw_mesh(&mut render_pass, item);
        }

        render_pass.set_pipeline(&self.lines_pipeline);
        for helper in &self.helpers {
            let visible = app.scene.node(helper.node).is_some_and(|n| n.visible);
            let Some(Some(object)) = self.objects.get(helper.node.0) else {
                continue;
            };
            if !visible {
                continue;
            }
            render_pass.set_bind_group(1, &object.bind_group, &[]);
            render_pass.set_vertex_buffer(0, helper.vertices.slice(..));
            render_pass.draw(0..helper.count, 0..1);
        }

        for item in &transparent {
            self.draw_mesh(&mut render_pass, item);
        }
    }

    fn draw_mesh(&self, render_pass: &mut wgpu::RenderPass<'_>, item: &DrawItem) {
        let (Some(mesh), Some(Some(object)), Some(material)) = (
            self.meshes.get(item.geometry.0),
            self.objects.get(item.node.0),
            self.materials.get(item.material.0),
        ) else {
            return;
        };

        render_pass.set_bind_group(1, &object.bind_group, &[]);
        render_pass.set_bind_group(2, &material.bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
        if item.wireframe {
            render_pass.set_pipeline(&self.wire_pipeline);
            render_pass.set_index_buffer(mesh.wire_indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.wire_count, 0, 0..1);
        } else {
            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn draw_gui(&mut self, app: &mut App, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let App {
            scene,
            controls,
            params,
            panel,
            stats,
            title,
            ..
        } = app;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let mut surface = ControlSurface::new(&mut *scene, &mut *controls, &mut *params);
            gui::show_panel(ctx, &*panel, &mut surface);
            gui::show_stats(ctx, &*stats, *title);
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        // the drawing buffer uses the capped ratio, so egui must too
        let pixels_per_point = viewport::pixel_ratio(self.window.scale_factor()) as f32;
        let tris = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

impl FrameTarget for Renderer {
    fn draw(&mut self, app: &mut App) -> Result<()> {
        self.upload_finished_textures(&app.scene);
        self.write_uniforms(app);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(self.gpu.device(), &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        self.draw_scene(app, &mut encoder, &view);
        if app.show_ui {
            self.draw_gui(app, &mut encoder, &view);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_texture(
    gpu: &GpuContext,
    color_space: ColorSpace,
    filter: Filter,
    image: &LoadedImage,
    label: &str,
) -> GpuTexture {
    let format = match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    };
    let texture = gpu.device().create_texture_with_data(
        gpu.queue(),
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: image.layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );

    let is_cube = image.layers == 6;
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(if is_cube {
            wgpu::TextureViewDimension::Cube
        } else {
            wgpu::TextureViewDimension::D2
        }),
        ..Default::default()
    });

    let filter = match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    };
    let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture {
        view,
        sampler,
        is_cube,
    }
}
