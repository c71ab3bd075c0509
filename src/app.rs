use std::iter;

use eframe::egui::{self, ClippedPrimitive};
use log::info;
use wgpu::{
    Backends, CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode, Device,
    DeviceDescriptor, Dx12Compiler, Features, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceError,
    TextureUsages, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::config::CLEAR_COLOR;
use crate::error::InitError;
use crate::frame::FrameClock;
use crate::scene::Scene;
use crate::tracer::Tracer;

// 오버레이 버튼이 눌렸는지. 한 프레임에 한 번 확인함
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiRequests {
    pub save: bool,
    pub reload: bool,
}

pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    // 무조건 winit의 Window를 쓸 것! surface보다 오래 살아야 함
    pub window: Window,
    tracer: Tracer,
    egui_state: egui_winit::State,
    egui_context: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,
}

impl Application {
    pub async fn new(window: Window, event_loop: &EventLoop<()>, scene: &Scene) -> Result<Self, InitError> {
        let size = window.inner_size();

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // 전달하는 &window가 surface보다 오래 유지되어야 함. 둘 다 Application이 들고 있음
        let surface = unsafe { instance.create_surface(&window) }?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(InitError::NoAdapter)?;
        info!("using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    limits: Limits::default(),
                    label: Some("Beacon GPU"),
                },
                None,
            )
            .await?;

        let capabilities = surface.get_capabilities(&adapter);

        // sRGB 말고 다른거 쓰면 의도한 것보다 밝기나 명도에서 차이가 날 수 있음.
        let surface_format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(capabilities.formats[0]);
        info!("surface format {:?}", surface_format);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::AutoVsync, // 모니터 주사율에 맞춰서 출력
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let tracer = Tracer::new(&device, surface_format, scene);

        let egui_state = egui_winit::State::new(event_loop);
        let egui_context = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            None, // 깊이 안씀
            1,    // 멀티 샘플링 1번만 할꺼임
        );
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: egui_context.pixels_per_point(),
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            tracer,
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        // 레이 트레이싱 해상도는 고정. 화면 크기만 바뀜
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    // true: egui가 입력을 가져감
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_event(&self.egui_context, event).consumed
    }

    // 카메라 업데이트가 끝난 뒤에 불러야 함
    pub fn render(&mut self, scene: &mut Scene, clock: &FrameClock) -> Result<UiRequests, SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        // 바뀐 버퍼를 먼저 올리고, 그걸 읽는 컴퓨트 쉐이더를 그 다음에 돌림
        self.tracer.sync(&self.queue, scene);
        self.tracer.dispatch(&mut encoder);

        let (primitives, requests, egui_commands) = self.update_egui(&mut encoder, scene, clock);

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            self.tracer.present(&mut render_pass);
            self.egui_renderer.render(&mut render_pass, &primitives, &self.egui_screen);
        }

        self.queue
            .submit(egui_commands.into_iter().chain(iter::once(encoder.finish())));
        output.present();

        Ok(requests)
    }

    fn update_egui(
        &mut self,
        encoder: &mut CommandEncoder,
        scene: &Scene,
        clock: &FrameClock,
    ) -> (Vec<ClippedPrimitive>, UiRequests, Vec<wgpu::CommandBuffer>) {
        let mut requests = UiRequests::default();
        let resolution = self.tracer.size();
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let egui_output = self.egui_context.run(egui_input, |ctx| {
            egui::SidePanel::right("Side Menu")
                .resizable(true)
                .width_range(0.0..=512.0)
                .default_width(180.0)
                .show(ctx, |ui| {
                    ui.heading("Beacon");
                    ui.label(format!("{:.2} ms ({:.0} fps)", clock.delta_ms(), clock.fps()));
                    ui.label(format!("{} x {}", resolution.width, resolution.height));
                    ui.separator();

                    let camera = scene.camera();
                    let position = camera.position();
                    ui.label(format!(
                        "Camera ({:.2}, {:.2}, {:.2})",
                        position.x, position.y, position.z
                    ));
                    ui.label(format!("Yaw {:.2} Pitch {:.2}", camera.yaw(), camera.pitch()));
                    ui.label(format!("Frame {}", camera.frame_index()));
                    ui.separator();

                    let catalog = scene.catalog();
                    ui.label(format!("Materials {}", catalog.material_count()));
                    ui.label(format!("Spheres {}", catalog.sphere_count()));
                    ui.label(format!("Planes {}", catalog.plane_count()));
                    ui.label(format!("Boxes {}", catalog.box_count()));
                    ui.separator();

                    requests.save = ui.button("Save").clicked();
                    requests.reload = ui.button("Reload").clicked();
                });
        });

        self.egui_state
            .handle_platform_output(&self.window, &self.egui_context, egui_output.platform_output);
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        for (id, delta) in &egui_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        }
        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        let commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &primitives,
            &self.egui_screen,
        );

        (primitives, requests, commands)
    }
}
