use std::mem::offset_of;

use bytemuck::{NoUninit, bytes_of};
use glam::Vec2;
use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferBindingType, BufferDescriptor, BufferUsages, Color, ColorTargetState,
    ColorWrites, Device, Extent3d, FilterMode, FragmentState, FrontFace,
    MultisampleState, Origin3d, PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode,
    PrimitiveState, PrimitiveTopology, Queue, RenderPipeline, RenderPipelineDescriptor, Sampler,
    SamplerBindingType, SamplerDescriptor, ShaderStages, TexelCopyBufferLayout,
    TexelCopyTextureInfo, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, VertexStepMode, include_wgsl,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::{
    game::GameContext,
    renderer::{INITIAL_QUAD_CAP, RenderBuffer, SCREEN_HEIGHT, SCREEN_WIDTH},
};

#[derive(Debug)]
pub struct Renderer {
    pub(in crate::renderer) vertex_buf: Buffer,
    pub(in crate::renderer) index_buf: Buffer,
    pub(in crate::renderer) frame_uniform_buf: Buffer,
    pub(in crate::renderer) atlas_bind_group_layout: BindGroupLayout,
    pub(in crate::renderer) sampler: Sampler,
    pub(in crate::renderer) atlases: Vec<Atlas>,
    pub(in crate::renderer) render_pipeline: RenderPipeline,
    pub(in crate::renderer) render_texture: TextureView,
    pub(in crate::renderer) upscale_uniform_buf: Buffer,
    pub(in crate::renderer) upscale_bind_group: BindGroup,
    pub(in crate::renderer) upscale_pipeline: RenderPipeline,
    pub(in crate::renderer) quad_buf: RenderBuffer,
}

#[derive(Debug)]
pub(in crate::renderer) struct Atlas {
    pub bind_group: BindGroup,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}

/// Handle to an atlas texture owned by the renderer. Draw records reference
/// atlases by handle and never own them.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NoUninit)]
pub struct AtlasId(pub(crate) u32);

/// One sprite instance to draw: a source rect on an atlas, a destination on
/// the virtual screen, a depth layer. Lives only inside one frame's batch.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct SpriteDrawRecord {
    /// Destination center in virtual-screen pixels, y down.
    pub dst_center: Vec2,
    /// Destination half-size in virtual-screen pixels.
    pub dst_extents: Vec2,
    /// Source rect center in normalized atlas coordinates.
    pub src_center: Vec2,
    /// Source rect half-size in normalized atlas coordinates.
    pub src_extents: Vec2,
    pub layer: f32,
    pub atlas: AtlasId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub clear_color: Color,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub(in crate::renderer) struct FrameUniform {
    pub cam_center: Vec2,
    pub screen_extents: Vec2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub(in crate::renderer) struct UpscaleUniform {
    pub dst_extents: Vec2,
}

impl Renderer {
    pub fn new(ctx: RenderContext) -> Self {
        let vertex_buf = ctx.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("renderer vertex buffer"),
            contents: bytes_of(&[
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ]),
            usage: BufferUsages::VERTEX,
        });

        let index_buf = ctx.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("renderer index buffer"),
            contents: bytes_of(&[0u16, 1, 2, 2, 3, 0]),
            usage: BufferUsages::INDEX,
        });

        let frame_uniform_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("renderer frame uniform buffer"),
            size: size_of::<FrameUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_texture = ctx
            .device
            .create_texture(&TextureDescriptor {
                label: Some("renderer render texture"),
                dimension: TextureDimension::D2,
                format: TextureFormat::Rgba8Unorm,
                mip_level_count: 1,
                sample_count: 1,
                size: Extent3d {
                    width: SCREEN_WIDTH as u32,
                    height: SCREEN_HEIGHT as u32,
                    depth_or_array_layers: 1,
                },
                usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&SamplerDescriptor {
            label: Some("renderer sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            anisotropy_clamp: 1,
            border_color: None,
            compare: None,
            lod_max_clamp: 1.0,
            lod_min_clamp: 1.0,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
        });

        let render_shader = ctx
            .device
            .create_shader_module(include_wgsl!("render.wgsl"));

        let atlas_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&BindGroupLayoutDescriptor {
                    label: Some("renderer atlas bind group layout"),
                    entries: &[
                        BindGroupLayoutEntry {
                            binding: 0,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                            visibility: ShaderStages::VERTEX,
                        },
                        BindGroupLayoutEntry {
                            binding: 1,
                            ty: BindingType::Texture {
                                sample_type: TextureSampleType::Float { filterable: false },
                                view_dimension: TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                        },
                        BindGroupLayoutEntry {
                            binding: 2,
                            ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                            count: None,
                            visibility: ShaderStages::FRAGMENT,
                        },
                    ],
                });

        let render_pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("renderer render pipeline"),
                cache: None,
                depth_stencil: None,
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("renderer render pipeline layout"),
                            bind_group_layouts: &[&atlas_bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PrimitiveState {
                    front_face: FrontFace::Ccw,
                    conservative: false,
                    cull_mode: None,
                    polygon_mode: PolygonMode::Fill,
                    strip_index_format: None,
                    topology: PrimitiveTopology::TriangleList,
                    unclipped_depth: false,
                },
                vertex: VertexState {
                    module: &render_shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[VERTEX_BUFFER_LAYOUT, QUAD_BUFFER_LAYOUT],
                },
                fragment: Some(FragmentState {
                    module: &render_shader,
                    targets: &[Some(ColorTargetState {
                        blend: Some(BlendState::ALPHA_BLENDING),
                        format: TextureFormat::Rgba8Unorm,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        let upscale_shader = ctx
            .device
            .create_shader_module(include_wgsl!("upscale.wgsl"));

        let upscale_uniform_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("renderer upscale uniform buffer"),
            mapped_at_creation: false,
            size: size_of::<UpscaleUniform>() as u64,
            usage: BufferUsages::COPY_DST | BufferUsages::UNIFORM,
        });

        let upscale_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&BindGroupLayoutDescriptor {
                    label: Some("renderer upscale bind group layout"),
                    entries: &[
                        BindGroupLayoutEntry {
                            binding: 0,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                            visibility: ShaderStages::VERTEX,
                        },
                        BindGroupLayoutEntry {
                            binding: 1,
                            ty: BindingType::Texture {
                                sample_type: TextureSampleType::Float { filterable: false },
                                view_dimension: TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                        },
                        BindGroupLayoutEntry {
                            binding: 2,
                            ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                            count: None,
                            visibility: ShaderStages::FRAGMENT,
                        },
                    ],
                });

        let upscale_bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("renderer upscale bind group"),
            layout: &upscale_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: upscale_uniform_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&render_texture),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let upscale_pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("renderer upscale pipeline"),
                cache: None,
                depth_stencil: None,
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("renderer upscale pipeline layout"),
                            bind_group_layouts: &[&upscale_bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PrimitiveState {
                    front_face: FrontFace::Ccw,
                    conservative: false,
                    cull_mode: None,
                    polygon_mode: PolygonMode::Fill,
                    strip_index_format: None,
                    topology: PrimitiveTopology::TriangleList,
                    unclipped_depth: false,
                },
                vertex: VertexState {
                    module: &upscale_shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[VERTEX_BUFFER_LAYOUT],
                },
                fragment: Some(FragmentState {
                    module: &upscale_shader,
                    targets: &[Some(ColorTargetState {
                        blend: None,
                        format: ctx.surface_format,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        let quad_buf = RenderBuffer::new_uninit(INITIAL_QUAD_CAP, ctx);

        Self {
            vertex_buf,
            index_buf,
            frame_uniform_buf,
            atlas_bind_group_layout,
            sampler,
            atlases: Vec::new(),
            render_pipeline,
            render_texture,
            upscale_uniform_buf,
            upscale_bind_group,
            upscale_pipeline,
            quad_buf,
        }
    }

    /// Uploads an RGBA8 image as an atlas texture and returns its handle.
    pub fn upload_atlas(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        ctx: RenderContext,
    ) -> AtlasId {
        let texture = ctx.device.create_texture(&TextureDescriptor {
            label: Some("renderer atlas texture"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                aspect: TextureAspect::All,
                mip_level: 0,
                origin: Origin3d::ZERO,
            },
            pixels,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            texture.size(),
        );

        let bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("renderer atlas bind group"),
            layout: &self.atlas_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: self.frame_uniform_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(
                        &texture.create_view(&TextureViewDescriptor::default()),
                    ),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.atlases.push(Atlas { bind_group });

        let id = AtlasId(self.atlases.len() as u32 - 1);
        log::debug!("uploaded atlas {id:?} ({width}x{height})");

        id
    }
}

impl<'a> From<GameContext<'a>> for RenderContext<'a> {
    fn from(value: GameContext<'a>) -> Self {
        Self {
            device: value.device,
            queue: value.queue,
            surface_format: value.surface_format,
        }
    }
}

const VERTEX_BUFFER_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<Vec2>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &[VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    }],
};

const QUAD_BUFFER_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<SpriteDrawRecord>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &[
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: offset_of!(SpriteDrawRecord, dst_center) as u64,
            shader_location: 1,
        },
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: offset_of!(SpriteDrawRecord, dst_extents) as u64,
            shader_location: 2,
        },
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: offset_of!(SpriteDrawRecord, src_center) as u64,
            shader_location: 3,
        },
        VertexAttribute {
            format: VertexFormat::Float32x2,
            offset: offset_of!(SpriteDrawRecord, src_extents) as u64,
            shader_location: 4,
        },
        VertexAttribute {
            format: VertexFormat::Float32,
            offset: offset_of!(SpriteDrawRecord, layer) as u64,
            shader_location: 5,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_record_layout_matches_the_vertex_attributes() {
        // The atlas handle rides at the end of the instance stride without a
        // vertex attribute of its own.
        assert_eq!(size_of::<SpriteDrawRecord>(), 40);
        assert_eq!(offset_of!(SpriteDrawRecord, atlas), 36);

        assert_eq!(
            QUAD_BUFFER_LAYOUT.array_stride,
            size_of::<SpriteDrawRecord>() as u64
        );

        let offsets: Vec<u64> = QUAD_BUFFER_LAYOUT
            .attributes
            .iter()
            .map(|attribute| attribute.offset)
            .collect();

        assert_eq!(offsets, vec![0, 8, 16, 24, 32]);
    }
}
