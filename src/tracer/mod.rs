use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, BufferBindingType,
    ColorTargetState, ColorWrites, CommandEncoder, ComputePassDescriptor, ComputePipeline,
    ComputePipelineDescriptor, Device, FragmentState, MultisampleState, PipelineLayoutDescriptor,
    PrimitiveState, Queue, RenderPass, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderSource, ShaderStages, StorageTextureAccess, TextureFormat,
    TextureSampleType, TextureViewDimension, VertexState,
};
use log::debug;
use winit::dpi::PhysicalSize;

use crate::config::{
    dispatch_size, CAMERA_BINDING, CATALOG_BINDING, HEIGHT, HISTORY_BINDING, OUTPUT_BINDING,
    PRESENT_BINDING, WIDTH,
};
use crate::scene::{Flushed, Scene};
use crate::sync::UniformBuffer;
use crate::tracer::texture::{Image, FRAME_FORMAT};

pub mod texture;

const RAYTRACE_WGSL: &str = include_str!("raytrace.wgsl");
const PRESENT_WGSL: &str = include_str!("present.wgsl");

// GPU 쪽 레이 트레이서.
// 1. 컴퓨트 쉐이더가 output에 이번 프레임을 그림 (history와 섞어서 누적)
// 2. output을 history로 복사
// 3. 화면을 덮는 삼각형 하나로 history를 화면에 그림
pub struct Tracer {
    catalog_buffer: UniformBuffer,
    camera_buffer: UniformBuffer,
    output: Image,
    history: Image,

    trace_pipeline: ComputePipeline,
    scene_bind_group: BindGroup,
    target_bind_group: BindGroup,

    present_pipeline: RenderPipeline,
    present_bind_group: BindGroup,
}

impl Tracer {
    pub fn new(device: &Device, surface_format: TextureFormat, scene: &Scene) -> Self {
        let size = PhysicalSize::new(WIDTH, HEIGHT);
        let output = Image::storage(device, size, "Tracer Output");
        let history = Image::sampled(device, size, "Tracer History");
        debug!("created {} and {} at {}x{}", output.name, history.name, WIDTH, HEIGHT);

        // 버퍼는 여기서 한 번만 바인드 그룹에 묶임. 이후엔 내용만 덮어씀
        let catalog_buffer =
            UniformBuffer::new(device, "Catalog Buffer", CATALOG_BINDING, &scene.gpu_catalog());
        let camera_buffer =
            UniformBuffer::new(device, "Camera Buffer", CAMERA_BINDING, &scene.gpu_camera());

        let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Scene Layout"),
            entries: &[
                uniform_entry(catalog_buffer.binding()),
                uniform_entry(camera_buffer.binding()),
            ],
        });
        let target_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Target Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: OUTPUT_BINDING,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::StorageTexture {
                        access: StorageTextureAccess::WriteOnly,
                        format: FRAME_FORMAT,
                        view_dimension: TextureViewDimension::D2,
                    },
                    count: None,
                },
                texture_entry(HISTORY_BINDING, ShaderStages::COMPUTE),
            ],
        });

        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                catalog_buffer.bind_group_entry(),
                camera_buffer.bind_group_entry(),
            ],
        });
        let target_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Target Bind Group"),
            layout: &target_layout,
            entries: &[
                BindGroupEntry {
                    binding: OUTPUT_BINDING,
                    resource: BindingResource::TextureView(&output.view),
                },
                BindGroupEntry {
                    binding: HISTORY_BINDING,
                    resource: BindingResource::TextureView(&history.view),
                },
            ],
        });

        let trace_module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Raytrace Shader"),
            source: ShaderSource::Wgsl(RAYTRACE_WGSL.into()),
        });
        let trace_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Raytrace Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &target_layout],
            push_constant_ranges: &[],
        });
        let trace_pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some("Raytrace Pipeline"),
            layout: Some(&trace_layout),
            module: &trace_module,
            entry_point: "main",
        });

        let (present_pipeline, present_layout) = present_pipeline(device, surface_format);
        let present_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout: &present_layout,
            entries: &[BindGroupEntry {
                binding: PRESENT_BINDING,
                resource: BindingResource::TextureView(&history.view),
            }],
        });

        Self {
            catalog_buffer,
            camera_buffer,
            output,
            history,
            trace_pipeline,
            scene_bind_group,
            target_bind_group,
            present_pipeline,
            present_bind_group,
        }
    }

    // 바뀐 버퍼만 다시 올림. 디스패치 전에 불러야 함
    pub fn sync(&self, queue: &Queue, scene: &mut Scene) -> Flushed {
        scene.flush(
            &self.catalog_buffer.target(queue),
            &self.camera_buffer.target(queue),
        )
    }

    pub fn dispatch(&self, encoder: &mut CommandEncoder) {
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("Raytrace Pass"),
            });
            pass.set_pipeline(&self.trace_pipeline);
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            pass.set_bind_group(1, &self.target_bind_group, &[]);

            let (x, y, z) = dispatch_size();
            pass.dispatch_workgroups(x, y, z);
        }

        // 다음 프레임에서 섞을 수 있도록 결과를 history에 남겨둠
        encoder.copy_texture_to_texture(
            self.output.copy_target(),
            self.history.copy_target(),
            self.output.extent(),
        );
    }

    pub fn present<'a>(&'a self, render_pass: &mut RenderPass<'a>) {
        render_pass.set_pipeline(&self.present_pipeline);
        render_pass.set_bind_group(0, &self.present_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.output.size()
    }
}

fn present_pipeline(device: &Device, surface_format: TextureFormat) -> (RenderPipeline, BindGroupLayout) {
    let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Present Layout"),
        entries: &[texture_entry(PRESENT_BINDING, ShaderStages::FRAGMENT)],
    });

    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Present Shader"),
        source: ShaderSource::Wgsl(PRESENT_WGSL.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Present Pipeline Layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Present Pipeline"),
        layout: Some(&pipeline_layout),
        // 정점 버퍼 없이 vertex_index로 화면을 덮는 삼각형을 만듦
        vertex: VertexState {
            module: &module,
            entry_point: "vs_main",
            buffers: &[],
        },
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        fragment: Some(FragmentState {
            module: &module,
            entry_point: "fs_main",
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }),
        multiview: None,
    });

    (pipeline, layout)
}

fn uniform_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

// Rgba32Float는 필터링이 안 되니 쉐이더에선 textureLoad로만 읽음
fn texture_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: false },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}
