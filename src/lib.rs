use log::{error, info, warn};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::app::{Application, UiRequests};
use crate::camera::CameraSettings;
use crate::config::{HEIGHT, SCENE_PATH, WIDTH};
use crate::error::{InitError, SceneError};
use crate::frame::FrameClock;
use crate::input::Input;
use crate::scene::catalog::Catalog;
use crate::scene::Scene;

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod scene;
pub mod sync;
pub mod tracer;

pub fn run() {
    // 로거 초기화. RUST_LOG로 레벨 조절
    env_logger::init();

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title("Beacon: Ray Tracer")
        .with_inner_size(PhysicalSize::new(WIDTH, HEIGHT))
        .with_resizable(false)
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(e) => fail(InitError::from(e)),
    };

    let mut scene = match Scene::new(
        Catalog::new(),
        CameraSettings::default(),
        WIDTH as f32 / HEIGHT as f32,
    ) {
        Ok(scene) => scene,
        Err(e) => {
            error!("failed to build the scene: {}", e);
            std::process::exit(1);
        }
    };
    load_initial_scene(&mut scene);

    let mut app = match pollster::block_on(Application::new(window, &event_loop, &scene)) {
        Ok(app) => app,
        Err(e) => fail(e),
    };
    let mut controls = Input::new();
    let mut clock = FrameClock::new();

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            let consumed = app.input(event);
            controls.handle_event(event, consumed);

            match event {
                // 만약 앱을 운영체제에서 닫으려고 하거나
                WindowEvent::CloseRequested |
                // ESC가 새로 눌러졌다면 바로 종료
                WindowEvent::KeyboardInput {
                    input: KeyboardInput {
                        state: ElementState::Pressed, virtual_keycode: Some(VirtualKeyCode::Escape), ..
                    }, ..
                } => *control_flow = ControlFlow::ExitWithCode(0),

                WindowEvent::Resized(size) => app.resize(*size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => app.resize(**new_inner_size),
                _ => {}
            }
        }
        Event::RedrawRequested(window_id) if window_id == app.window.id() => {
            // 이전 프레임에서 잰 시간으로 카메라를 움직임
            let delta_ms = clock.begin();
            scene.update_camera(delta_ms, &controls.take_frame());

            match app.render(&mut scene, &clock) {
                Ok(requests) => handle_requests(&mut scene, requests),
                // surface를 다시 설정하면 대부분 복구됨
                Err(SurfaceError::Lost | SurfaceError::Outdated) => app.resize(app.size),
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    *control_flow = ControlFlow::ExitWithCode(1);
                }
                Err(e) => warn!("skipped a frame: {:?}", e),
            }

            clock.end();
        }
        Event::MainEventsCleared => app.window.request_redraw(),
        _ => {}
    });
}

fn fail(e: InitError) -> ! {
    error!("failed to start: {}", e);
    std::process::exit(1);
}

fn load_initial_scene(scene: &mut Scene) {
    match scene.load(SCENE_PATH) {
        Ok(report) => {
            if let Some(reason) = report.halted {
                warn!("{} was only partly loaded: {}", SCENE_PATH, reason);
            }
        }
        Err(SceneError::FileNotFound(path)) => {
            warn!("no scene at {}, starting with an empty one", path.display());
        }
        Err(e) => warn!("failed to load {}: {}", SCENE_PATH, e),
    }
}

fn handle_requests(scene: &mut Scene, requests: UiRequests) {
    if requests.save {
        if let Err(e) = scene.save(SCENE_PATH) {
            error!("failed to save {}: {}", SCENE_PATH, e);
        }
    }

    if requests.reload {
        match scene.reload(SCENE_PATH) {
            Ok(report) => {
                if let Some(reason) = report.halted {
                    warn!("{} was only partly reloaded: {}", SCENE_PATH, reason);
                }
            }
            // 실패하면 지금 장면을 그대로 둠
            Err(e) => warn!("failed to reload {}: {}", SCENE_PATH, e),
        }
    }

    if requests != UiRequests::default() {
        info!("overlay requests handled: {:?}", requests);
    }
}
