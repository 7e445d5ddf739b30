#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use gpu::{MarkerInstance, RenderFrame};
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use tracing::{debug, warn};

    use super::{SurfaceRecovery, surface_recovery};
    use crate::assets::TextureImage;

    #[derive(Debug)]
    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub depth_view: ::wgpu::TextureView,
        pub globals_buffer: ::wgpu::Buffer,
        pub globals_bind_group: ::wgpu::BindGroup,
        pub object_layout: ::wgpu::BindGroupLayout,
        pub stars_pipeline: ::wgpu::RenderPipeline,
        pub stars_object: ObjectBinding,
        pub stars_vertex_buffer: ::wgpu::Buffer,
        pub stars_count: u32,
        pub globe_pipeline: ::wgpu::RenderPipeline,
        pub globe_object: ObjectBinding,
        pub atmosphere_pipeline: ::wgpu::RenderPipeline,
        pub atmosphere_object: ObjectBinding,
        pub sphere_vertex_buffer: ::wgpu::Buffer,
        pub sphere_index_buffer: ::wgpu::Buffer,
        pub sphere_index_count: u32,
        pub sphere_segments: u32,
        pub texture_layout: ::wgpu::BindGroupLayout,
        pub sampler: ::wgpu::Sampler,
        pub texture_bind_group: ::wgpu::BindGroup,
        pub marker_pipeline: ::wgpu::RenderPipeline,
        pub cube_vertex_buffer: ::wgpu::Buffer,
        pub cube_index_buffer: ::wgpu::Buffer,
        pub marker_instance_buffer: ::wgpu::Buffer,
        pub marker_capacity: usize,
    }

    /// A small uniform buffer holding one object's model matrix and color.
    #[derive(Debug)]
    pub struct ObjectBinding {
        buffer: ::wgpu::Buffer,
        bind_group: ::wgpu::BindGroup,
    }

    const GLOBALS_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;
"#;

    const STARS_SHADER: &str = r#"
@group(1) @binding(0)
var<uniform> object: Object;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * object.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return object.color;
}
"#;

    const GLOBE_SHADER: &str = r#"
@group(1) @binding(0)
var<uniform> object: Object;

@group(2) @binding(0)
var globe_texture: texture_2d<f32>;
@group(2) @binding(1)
var globe_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = object.model * vec4<f32>(position, 1.0);
    let n = (object.model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n, world.xyz, uv);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let to_eye = normalize(globals.camera_pos.xyz - fs_in.world_pos);
    let rim = pow(max(1.05 - dot(n, to_eye), 0.0), 1.5);
    let glow = vec3<f32>(0.3, 0.6, 1.0) * rim;
    let base = textureSample(globe_texture, globe_sampler, fs_in.uv).rgb;
    return vec4<f32>(base + glow, 1.0);
}
"#;

    const ATMOSPHERE_SHADER: &str = r#"
@group(1) @binding(0)
var<uniform> object: Object;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = object.model * vec4<f32>(position, 1.0);
    let n = (object.model * vec4<f32>(normal, 0.0)).xyz;
    return VsOut(globals.view_proj * world, n, world.xyz);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let to_eye = normalize(globals.camera_pos.xyz - fs_in.world_pos);
    let intensity = pow(max(0.4 - dot(n, to_eye), 0.0), 2.0);
    return vec4<f32>(0.3, 0.6, 1.0, 1.0) * intensity;
}
"#;

    const MARKER_SHADER: &str = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) m0: vec4<f32>,
    @location(2) m1: vec4<f32>,
    @location(3) m2: vec4<f32>,
    @location(4) m3: vec4<f32>,
    @location(5) color: vec4<f32>,
) -> VsOut {
    let model = mat4x4<f32>(m0, m1, m2, m3);
    return VsOut(globals.view_proj * model * vec4<f32>(position, 1.0), color);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    return fs_in.color;
}
"#;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct SphereVertex {
        position: [f32; 3],
        normal: [f32; 3],
        uv: [f32; 2],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct PointVertex {
        position: [f32; 3],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view_proj: [[f32; 4]; 4],
        camera_pos: [f32; 4],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct ObjectUniform {
        model: [[f32; 4]; 4],
        color: [f32; 4],
    }

    const IDENTITY: [[f32; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    /// Unit cube, counter-clockwise faces seen from outside.
    const CUBE_INDICES: [u16; 36] = [
        4, 5, 7, 4, 7, 6, // +z
        1, 0, 2, 1, 2, 3, // -z
        5, 1, 3, 5, 3, 7, // +x
        0, 4, 6, 0, 6, 2, // -x
        6, 7, 3, 6, 3, 2, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];

    fn cube_vertices() -> Vec<PointVertex> {
        (0..8u32)
            .map(|i| PointVertex {
                position: [
                    if i & 1 == 0 { -0.5 } else { 0.5 },
                    if i & 2 == 0 { -0.5 } else { 0.5 },
                    if i & 4 == 0 { -0.5 } else { 0.5 },
                ],
            })
            .collect()
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    /// Unit UV sphere. Rows run from the north pole (v = 0) to the south
    /// pole; `u` wraps from the -X meridian through +Z.
    fn generate_sphere_mesh(width_segments: u32, height_segments: u32) -> (Vec<SphereVertex>, Vec<u16>) {
        // Keeps the vertex count within u16 indices.
        let width_segments = width_segments.clamp(3, 180);
        let height_segments = height_segments.clamp(2, 180);

        let mut vertices =
            Vec::with_capacity(((height_segments + 1) * (width_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * std::f32::consts::PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * std::f32::consts::TAU;
                let p = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];
                vertices.push(SphereVertex {
                    position: p,
                    normal: p,
                    uv: [u, v],
                });
            }
        }

        let stride = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = (iy * stride + ix + 1) as u16;
                let b = (iy * stride + ix) as u16;
                let c = ((iy + 1) * stride + ix) as u16;
                let d = ((iy + 1) * stride + ix + 1) as u16;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        (vertices, indices)
    }

    fn create_object_binding(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        label: &str,
    ) -> ObjectBinding {
        let buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&ObjectUniform {
                model: IDENTITY,
                color: [1.0, 1.0, 1.0, 1.0],
            }),
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        ObjectBinding { buffer, bind_group }
    }

    fn write_object(queue: &::wgpu::Queue, object: &ObjectBinding, model: [[f32; 4]; 4], color: [f32; 4]) {
        queue.write_buffer(&object.buffer, 0, bytemuck::bytes_of(&ObjectUniform { model, color }));
    }

    fn uniform_layout_entry(binding: u32) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: ::wgpu::BindingType::Buffer {
                ty: ::wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn shader(device: &::wgpu::Device, label: &str, body: &str) -> ::wgpu::ShaderModule {
        let source = format!("{GLOBALS_WGSL}\n{body}");
        device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
        })
    }

    fn create_texture_bind_group(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        layout: &::wgpu::BindGroupLayout,
        sampler: &::wgpu::Sampler,
        image: &TextureImage,
    ) -> ::wgpu::BindGroup {
        let size = ::wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            &image.rgba,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-texture-bg"),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(&view),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_instance_buffer(device: &::wgpu::Device, capacity: usize) -> ::wgpu::Buffer {
        device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("globe-marker-instances"),
            size: (capacity.max(1) * std::mem::size_of::<MarkerInstance>()) as u64,
            usage: ::wgpu::BufferUsages::VERTEX | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn depth_state(write: bool) -> ::wgpu::DepthStencilState {
        ::wgpu::DepthStencilState {
            format: ::wgpu::TextureFormat::Depth24Plus,
            depth_write_enabled: write,
            depth_compare: ::wgpu::CompareFunction::Less,
            stencil: ::wgpu::StencilState::default(),
            bias: ::wgpu::DepthBiasState::default(),
        }
    }

    fn primitive(topology: ::wgpu::PrimitiveTopology, cull_mode: Option<::wgpu::Face>) -> ::wgpu::PrimitiveState {
        ::wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: ::wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: ::wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }

    const SPHERE_ATTRIBUTES: [::wgpu::VertexAttribute; 3] = ::wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    const MARKER_INSTANCE_ATTRIBUTES: [::wgpu::VertexAttribute; 5] = ::wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    pub async fn init_wgpu_from_canvas_id(
        canvas_id: &str,
        sphere_segments: u32,
    ) -> Result<WgpuContext, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document missing"))?;
        let canvas_elem = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas missing"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let width = canvas_elem.width();
        let height = canvas_elem.height();

        // The surface must not outlive its instance; leak the instance for
        // the lifetime of the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas_elem.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("globe-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-globals-bgl"),
            entries: &[uniform_layout_entry(0)],
        });
        let object_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-object-bgl"),
            entries: &[uniform_layout_entry(0)],
        });
        let texture_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-texture-bgl"),
            entries: &[
                ::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Texture {
                        sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: ::wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                ::wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-globals"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: IDENTITY,
                camera_pos: [0.0, 0.0, 15.0, 1.0],
            }),
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-globals-bg"),
            layout: &globals_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: ::wgpu::AddressMode::ClampToEdge,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_bind_group = create_texture_bind_group(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &TextureImage::placeholder(),
        );

        let object_pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("globe-object-pipeline-layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            immediate_size: 0,
        });
        let globe_pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("globe-textured-pipeline-layout"),
            bind_group_layouts: &[&globals_layout, &object_layout, &texture_layout],
            immediate_size: 0,
        });
        let marker_pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("globe-marker-pipeline-layout"),
            bind_group_layouts: &[&globals_layout],
            immediate_size: 0,
        });

        let stars_shader = shader(&device, "globe-stars-shader", STARS_SHADER);
        let globe_shader = shader(&device, "globe-surface-shader", GLOBE_SHADER);
        let atmosphere_shader = shader(&device, "globe-atmosphere-shader", ATMOSPHERE_SHADER);
        let marker_shader = shader(&device, "globe-marker-shader", MARKER_SHADER);

        let color_target = |blend: ::wgpu::BlendState| {
            [Some(::wgpu::ColorTargetState {
                format: config.format,
                blend: Some(blend),
                write_mask: ::wgpu::ColorWrites::ALL,
            })]
        };

        let stars_targets = color_target(::wgpu::BlendState::REPLACE);
        let stars_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("globe-stars-pipeline"),
            layout: Some(&object_pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &stars_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PointVertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &::wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &stars_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &stars_targets,
            }),
            primitive: primitive(::wgpu::PrimitiveTopology::PointList, None),
            depth_stencil: Some(depth_state(true)),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sphere_buffers = [::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Vertex,
            attributes: &SPHERE_ATTRIBUTES,
        }];

        let globe_targets = color_target(::wgpu::BlendState::REPLACE);
        let globe_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("globe-surface-pipeline"),
            layout: Some(&globe_pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &globe_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &sphere_buffers,
            },
            fragment: Some(::wgpu::FragmentState {
                module: &globe_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &globe_targets,
            }),
            primitive: primitive(::wgpu::PrimitiveTopology::TriangleList, Some(::wgpu::Face::Back)),
            depth_stencil: Some(depth_state(true)),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let additive = ::wgpu::BlendState {
            color: ::wgpu::BlendComponent {
                src_factor: ::wgpu::BlendFactor::SrcAlpha,
                dst_factor: ::wgpu::BlendFactor::One,
                operation: ::wgpu::BlendOperation::Add,
            },
            alpha: ::wgpu::BlendComponent {
                src_factor: ::wgpu::BlendFactor::One,
                dst_factor: ::wgpu::BlendFactor::One,
                operation: ::wgpu::BlendOperation::Add,
            },
        };
        let atmosphere_targets = color_target(additive);
        let atmosphere_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("globe-atmosphere-pipeline"),
            layout: Some(&object_pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &atmosphere_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &sphere_buffers,
            },
            fragment: Some(::wgpu::FragmentState {
                module: &atmosphere_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &atmosphere_targets,
            }),
            // Back faces only: the glow shows around the globe's silhouette.
            primitive: primitive(::wgpu::PrimitiveTopology::TriangleList, Some(::wgpu::Face::Front)),
            depth_stencil: Some(depth_state(false)),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let marker_targets = color_target(::wgpu::BlendState::ALPHA_BLENDING);
        let marker_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("globe-marker-pipeline"),
            layout: Some(&marker_pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &marker_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    ::wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<PointVertex>() as ::wgpu::BufferAddress,
                        step_mode: ::wgpu::VertexStepMode::Vertex,
                        attributes: &::wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    ::wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<MarkerInstance>() as ::wgpu::BufferAddress,
                        step_mode: ::wgpu::VertexStepMode::Instance,
                        attributes: &MARKER_INSTANCE_ATTRIBUTES,
                    },
                ],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &marker_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &marker_targets,
            }),
            primitive: primitive(::wgpu::PrimitiveTopology::TriangleList, Some(::wgpu::Face::Back)),
            depth_stencil: Some(depth_state(false)),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let (sphere_vertices, sphere_indices) = generate_sphere_mesh(sphere_segments, sphere_segments);
        let sphere_vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-sphere-vertices"),
            contents: bytemuck::cast_slice(&sphere_vertices),
            usage: ::wgpu::BufferUsages::VERTEX,
        });
        let sphere_index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-sphere-indices"),
            contents: bytemuck::cast_slice(&sphere_indices),
            usage: ::wgpu::BufferUsages::INDEX,
        });

        let cube_vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-cube-vertices"),
            contents: bytemuck::cast_slice(&cube_vertices()),
            usage: ::wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-cube-indices"),
            contents: bytemuck::cast_slice(&CUBE_INDICES),
            usage: ::wgpu::BufferUsages::INDEX,
        });

        let stars_vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-star-vertices"),
            contents: bytemuck::bytes_of(&PointVertex {
                position: [0.0, 0.0, 0.0],
            }),
            usage: ::wgpu::BufferUsages::VERTEX,
        });

        let marker_capacity = 256;
        let marker_instance_buffer = create_instance_buffer(&device, marker_capacity);

        let stars_object = create_object_binding(&device, &object_layout, "globe-stars-object");
        let globe_object = create_object_binding(&device, &object_layout, "globe-surface-object");
        let atmosphere_object =
            create_object_binding(&device, &object_layout, "globe-atmosphere-object");

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas_elem,
            depth_view,
            globals_buffer,
            globals_bind_group,
            object_layout,
            stars_pipeline,
            stars_object,
            stars_vertex_buffer,
            stars_count: 0,
            globe_pipeline,
            globe_object,
            atmosphere_pipeline,
            atmosphere_object,
            sphere_vertex_buffer,
            sphere_index_buffer,
            sphere_index_count: sphere_indices.len() as u32,
            sphere_segments,
            texture_layout,
            sampler,
            texture_bind_group,
            marker_pipeline,
            cube_vertex_buffer,
            cube_index_buffer,
            marker_instance_buffer,
            marker_capacity,
        })
    }

    pub fn set_star_points(ctx: &mut WgpuContext, points: &[[f32; 3]]) {
        if points.is_empty() {
            ctx.stars_count = 0;
            return;
        }
        let vertices: Vec<PointVertex> = points.iter().map(|&position| PointVertex { position }).collect();
        ctx.stars_vertex_buffer = ctx
            .device
            .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                label: Some("globe-star-vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: ::wgpu::BufferUsages::VERTEX,
            });
        ctx.stars_count = vertices.len() as u32;
    }

    pub fn set_globe_texture(ctx: &mut WgpuContext, image: &TextureImage) {
        ctx.texture_bind_group = create_texture_bind_group(
            &ctx.device,
            &ctx.queue,
            &ctx.texture_layout,
            &ctx.sampler,
            image,
        );
    }

    pub fn max_texture_dimension(ctx: &WgpuContext) -> u32 {
        ctx.device.limits().max_texture_dimension_2d
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    pub fn render_frame(ctx: &mut WgpuContext, frame: &RenderFrame) -> Result<(), JsValue> {
        if frame.markers.len() > ctx.marker_capacity {
            ctx.marker_capacity = frame.markers.len().next_power_of_two();
            ctx.marker_instance_buffer = create_instance_buffer(&ctx.device, ctx.marker_capacity);
        }
        if !frame.markers.is_empty() {
            ctx.queue.write_buffer(
                &ctx.marker_instance_buffer,
                0,
                bytemuck::cast_slice(&frame.markers),
            );
        }

        let [cx, cy, cz] = frame.camera_position;
        ctx.queue.write_buffer(
            &ctx.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                view_proj: frame.view_proj,
                camera_pos: [cx, cy, cz, 1.0],
            }),
        );
        if let Some(stars) = &frame.stars {
            write_object(&ctx.queue, &ctx.stars_object, stars.model, [1.0, 1.0, 1.0, 1.0]);
        }
        if let Some(globe) = &frame.globe {
            write_object(&ctx.queue, &ctx.globe_object, globe.model, globe.color);
        }
        if let Some(atmosphere) = &frame.atmosphere {
            write_object(&ctx.queue, &ctx.atmosphere_object, atmosphere.model, atmosphere.color);
        }

        let surface_texture = match ctx.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => match surface_recovery(&err) {
                SurfaceRecovery::Reconfigure => {
                    warn!(%err, "surface stale, reconfiguring");
                    ctx.surface.configure(&ctx.device, &ctx.config);
                    return Ok(());
                }
                SurfaceRecovery::Skip => {
                    debug!(%err, "skipping frame");
                    return Ok(());
                }
                SurfaceRecovery::Fatal => {
                    return Err(JsValue::from_str(&format!("surface acquire failed: {err}")));
                }
            },
        };
        let view = surface_texture
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("globe-frame-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("globe-scene-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color::BLACK),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);

            // Stars.
            if frame.stars.is_some() && ctx.stars_count > 0 {
                rpass.set_pipeline(&ctx.stars_pipeline);
                rpass.set_bind_group(1, &ctx.stars_object.bind_group, &[]);
                rpass.set_vertex_buffer(0, ctx.stars_vertex_buffer.slice(..));
                rpass.draw(0..ctx.stars_count, 0..1);
            }

            // Globe surface.
            if frame.globe.is_some() {
                rpass.set_pipeline(&ctx.globe_pipeline);
                rpass.set_bind_group(1, &ctx.globe_object.bind_group, &[]);
                rpass.set_bind_group(2, &ctx.texture_bind_group, &[]);
                rpass.set_vertex_buffer(0, ctx.sphere_vertex_buffer.slice(..));
                rpass.set_index_buffer(ctx.sphere_index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..ctx.sphere_index_count, 0, 0..1);
            }

            // Atmosphere shell.
            if frame.atmosphere.is_some() {
                rpass.set_pipeline(&ctx.atmosphere_pipeline);
                rpass.set_bind_group(1, &ctx.atmosphere_object.bind_group, &[]);
                rpass.set_vertex_buffer(0, ctx.sphere_vertex_buffer.slice(..));
                rpass.set_index_buffer(ctx.sphere_index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..ctx.sphere_index_count, 0, 0..1);
            }

            // Markers: depth tested against the globe, never written.
            if !frame.markers.is_empty() {
                rpass.set_pipeline(&ctx.marker_pipeline);
                rpass.set_vertex_buffer(0, ctx.cube_vertex_buffer.slice(..));
                rpass.set_vertex_buffer(1, ctx.marker_instance_buffer.slice(..));
                rpass.set_index_buffer(ctx.cube_index_buffer.slice(..), ::wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(
                    0..CUBE_INDICES.len() as u32,
                    0,
                    0..frame.markers.len() as u32,
                );
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::RenderFrame;
    use wasm_bindgen::prelude::JsValue;

    use crate::assets::TextureImage;

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu_from_canvas_id(
        _canvas_id: &str,
        _sphere_segments: u32,
    ) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn set_star_points(_ctx: &mut WgpuContext, _points: &[[f32; 3]]) {}

    pub fn set_globe_texture(_ctx: &mut WgpuContext, _image: &TextureImage) {}

    pub fn max_texture_dimension(_ctx: &WgpuContext) -> u32 {
        2048
    }

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_frame(_ctx: &mut WgpuContext, _frame: &RenderFrame) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{
    WgpuContext, init_wgpu_from_canvas_id, max_texture_dimension, render_frame, resize_wgpu,
    set_globe_texture, set_star_points,
};

/// How a failed swapchain acquire is handled.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Reconfigure the surface and drop this frame.
    Reconfigure,
    /// Drop this frame; the next one retries.
    Skip,
    Fatal,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn surface_recovery(err: &::wgpu::SurfaceError) -> SurfaceRecovery {
    match err {
        ::wgpu::SurfaceError::Lost | ::wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        ::wgpu::SurfaceError::Timeout => SurfaceRecovery::Skip,
        _ => SurfaceRecovery::Fatal,
    }
}
