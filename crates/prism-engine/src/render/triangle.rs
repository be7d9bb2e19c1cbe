use std::ops::Range;

use naga::ShaderStage;
use wgpu::util::DeviceExt;

use crate::render::shader::{ShaderError, WgslShader};
use crate::render::{RenderCtx, RenderTarget};

pub const VERTEX_COUNT: usize = 3;

/// Clip-space vertex positions, one packed `float3` per vertex.
pub const POSITIONS: [[f32; 3]; VERTEX_COUNT] = [
    [-0.8, 0.8, 0.0],
    [0.0, -0.8, 0.0],
    [0.8, 0.8, 0.0],
];

/// Per-vertex RGB colors, one packed `float3` per vertex.
pub const COLORS: [[f32; 3]; VERTEX_COUNT] = [
    [1.0, 0.3, 0.2],
    [0.8, 1.0, 0.0],
    [0.8, 0.0, 1.0],
];

/// A single non-indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: wgpu::PrimitiveTopology,
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

/// The only draw issued per frame.
pub const TRIANGLE_DRAW: DrawCall = DrawCall {
    topology: wgpu::PrimitiveTopology::TriangleList,
    vertices: 0..VERTEX_COUNT as u32,
    instances: 0..1,
};

const SHADER_LABEL: &str = "prism triangle shader";
const VS_ENTRY: &str = "vs_main";
const FS_ENTRY: &str = "fs_main";

const POSITION_SLOT: u32 = 0;
const COLOR_SLOT: u32 = 1;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Buffer layouts in slot order: positions at slot 0, colors at slot 1.
fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    let stride = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
    [
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        },
    ]
}

fn provided_locations(layouts: &[wgpu::VertexBufferLayout<'_>]) -> Vec<u32> {
    layouts
        .iter()
        .flat_map(|l| l.attributes.iter().map(|a| a.shader_location))
        .collect()
}

/// GPU objects a renderer owns.
///
/// Fields drop in declaration order: buffers, pipeline, queue, device.
struct Owned<B, P, Q, D> {
    positions: B,
    colors: B,
    pipeline: P,

    // Retained for the renderer's lifetime.
    _queue: Q,
    _device: D,
}

/// Draws one hardcoded, per-vertex colored triangle.
///
/// Construction order is fixed: the device and queue are retained, the shader
/// pair is compiled into a pipeline, then both vertex buffers are uploaded.
/// A renderer only exists once all of that succeeded, so no draw can precede it.
pub struct TriangleRenderer {
    owned: Owned<wgpu::Buffer, wgpu::RenderPipeline, wgpu::Queue, wgpu::Device>,
}

impl TriangleRenderer {
    pub fn new(ctx: &RenderCtx<'_>) -> Result<Self, ShaderError> {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        let pipeline = build_pipeline(&device, ctx.surface_format)?;

        let positions = upload(&device, "prism triangle positions", &POSITIONS);
        let colors = upload(&device, "prism triangle colors", &COLORS);

        log::debug!("triangle renderer ready ({:?})", ctx.surface_format);

        Ok(Self {
            owned: Owned {
                positions,
                colors,
                pipeline,
                _queue: queue,
                _device: device,
            },
        })
    }

    /// Encodes this frame's single draw into `target`.
    ///
    /// Identical every frame: the buffers never change after upload.
    pub fn draw(&self, target: &mut RenderTarget<'_>) {
        let attachment = target.color_attachment();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism triangle pass"),
            color_attachments: &[Some(attachment)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let owned = &self.owned;
        rpass.set_pipeline(&owned.pipeline);
        rpass.set_vertex_buffer(POSITION_SLOT, owned.positions.slice(..));
        rpass.set_vertex_buffer(COLOR_SLOT, owned.colors.slice(..));
        rpass.draw(TRIANGLE_DRAW.vertices, TRIANGLE_DRAW.instances);
    }
}

impl Drop for TriangleRenderer {
    fn drop(&mut self) {
        log::debug!("releasing triangle renderer");
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    let shader = WgslShader::parse(SHADER_LABEL, include_str!("shaders/triangle.wgsl"))?;

    let layouts = vertex_layouts();
    shader.check_vertex_inputs(VS_ENTRY, &provided_locations(&layouts))?;
    shader.require_entry_point(FS_ENTRY, ShaderStage::Fragment)?;

    let module = shader.create_module(device);

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("prism triangle pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism triangle pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(VS_ENTRY),
            compilation_options: Default::default(),
            buffers: &layouts,
        },

        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(FS_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: TRIANGLE_DRAW.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    Ok(pipeline)
}

/// Geometry buffers are written once at creation and never again.
const STATIC_VERTEX_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX;

fn upload(device: &wgpu::Device, label: &str, data: &[[f32; 3]]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: STATIC_VERTEX_USAGE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DropLog;

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn positions_are_the_fixed_triangle() {
        assert_eq!(
            POSITIONS,
            [[-0.8, 0.8, 0.0], [0.0, -0.8, 0.0], [0.8, 0.8, 0.0]]
        );
    }

    #[test]
    fn colors_are_fixed() {
        assert_eq!(COLORS, [[1.0, 0.3, 0.2], [0.8, 1.0, 0.0], [0.8, 0.0, 1.0]]);
    }

    #[test]
    fn buffers_are_three_packed_float3() {
        assert_eq!(bytemuck::cast_slice::<_, u8>(&POSITIONS).len(), 36);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&COLORS).len(), 36);
    }

    #[test]
    fn geometry_buffers_are_not_writable() {
        assert_eq!(STATIC_VERTEX_USAGE, wgpu::BufferUsages::VERTEX);
        assert!(!STATIC_VERTEX_USAGE.contains(wgpu::BufferUsages::COPY_DST));
        assert!(!STATIC_VERTEX_USAGE.contains(wgpu::BufferUsages::MAP_WRITE));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn owned_resources_release_buffers_then_pipeline_queue_device() {
        let log = DropLog::default();
        let owned = Owned {
            positions: log.track("positions"),
            colors: log.track("colors"),
            pipeline: log.track("pipeline"),
            _queue: log.track("queue"),
            _device: log.track("device"),
        };
        drop(owned);
        assert_eq!(
            log.order(),
            vec!["positions", "colors", "pipeline", "queue", "device"]
        );
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn one_triangle_list_draw_of_three_vertices() {
        assert_eq!(TRIANGLE_DRAW.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(TRIANGLE_DRAW.vertices, 0..3);
        assert_eq!(TRIANGLE_DRAW.instances, 0..1);
        assert_eq!(TRIANGLE_DRAW.vertices.len(), POSITIONS.len());
    }

    // ── pipeline inputs ───────────────────────────────────────────────────

    #[test]
    fn layouts_bind_positions_then_colors() {
        let layouts = vertex_layouts();
        assert_eq!(layouts.len(), 2);
        for layout in &layouts {
            assert_eq!(layout.array_stride, 12);
            assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
            assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
            assert_eq!(layout.attributes[0].offset, 0);
        }
        assert_eq!(layouts[POSITION_SLOT as usize].attributes[0].shader_location, 0);
        assert_eq!(layouts[COLOR_SLOT as usize].attributes[0].shader_location, 1);
        assert_eq!(provided_locations(&layouts), vec![0, 1]);
    }

    #[test]
    fn embedded_shader_compiles_for_the_pipeline() {
        let shader = WgslShader::parse(SHADER_LABEL, include_str!("shaders/triangle.wgsl")).unwrap();
        shader
            .check_vertex_inputs(VS_ENTRY, &provided_locations(&vertex_layouts()))
            .unwrap();
        shader.require_entry_point(FS_ENTRY, ShaderStage::Fragment).unwrap();
    }

    #[test]
    fn shader_reading_extra_input_is_rejected() {
        let src = r#"
            @vertex
            fn vs_main(@location(0) p: vec3<f32>, @location(3) w: f32) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p, w);
            }
        "#;
        let shader = WgslShader::parse("extra input", src).unwrap();
        let err = shader
            .check_vertex_inputs(VS_ENTRY, &provided_locations(&vertex_layouts()))
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnboundVertexInput { location: 3, .. }));
    }
}
