use std::f32::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Unit, Vector3};

use crate::config::FRAME_INDEX_WRAP;
use crate::input::FrameInput;
use crate::scene::gpu::GpuCamera;

// 위/아래를 완전히 보면 look_at의 up 벡터가 forward와 겹쳐버림
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub position: Point3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    // 1ms 당 이동 거리
    pub move_speed: f32,
    // 마우스 1픽셀 당 회전 (라디안)
    pub mouse_sensitivity: f32,
    pub world_up: Unit<Vector3<f32>>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 1.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 0.01,
            mouse_sensitivity: 0.01,
            world_up: Vector3::y_axis(),
            fov_degrees: 90.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

pub struct Camera {
    position: Point3<f32>,
    yaw: f32,
    pitch: f32,
    move_speed: f32,
    mouse_sensitivity: f32,
    world_up: Unit<Vector3<f32>>,

    // 투영 행렬은 생성 이후로 안 바뀌니 한 번만 계산
    inverse_projection: Matrix4<f32>,
    inverse_view: Matrix4<f32>,

    frame_index: u32,
}

impl Camera {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        let projection = Perspective3::new(
            aspect,
            settings.fov_degrees.to_radians(),
            settings.near,
            settings.far,
        );

        let mut camera = Self {
            position: settings.position,
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            move_speed: settings.move_speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            world_up: settings.world_up,
            inverse_projection: projection.inverse(),
            inverse_view: Matrix4::identity(),
            frame_index: 0,
        };
        camera.reevaluate_view(&camera.forward());

        camera
    }

    pub fn update(&mut self, delta_time_ms: f32, input: &FrameInput) {
        // 이번 프레임의 이동과 시점은 마우스를 반영하기 전의 방향을 씀
        let forward = self.forward();
        let right = Unit::new_normalize(self.world_up.cross(&forward.into_inner()));
        let step = self.move_speed * delta_time_ms;

        // W와 S를 같이 누르면 W만 적용. A/D도 마찬가지
        if input.forward {
            self.position += forward.scale(step);
        } else if input.back {
            self.position -= forward.scale(step);
        }
        if input.left {
            self.position += right.scale(step);
        } else if input.right {
            self.position -= right.scale(step);
        }

        self.yaw += self.mouse_sensitivity * input.mouse_delta.x;
        self.pitch += -self.mouse_sensitivity * input.mouse_delta.y;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.reevaluate_view(&forward);
        self.frame_index = next_frame_index(self.frame_index);
    }

    pub fn forward(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        ))
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    #[cfg(test)]
    pub(crate) fn inverse_view(&self) -> &Matrix4<f32> {
        &self.inverse_view
    }

    #[cfg(test)]
    pub(crate) fn inverse_projection(&self) -> &Matrix4<f32> {
        &self.inverse_projection
    }

    pub fn gpu_frame(&self) -> GpuCamera {
        GpuCamera {
            position: [self.position.x, self.position.y, self.position.z, 1.0],
            inverse_view: self.inverse_view.into(),
            inverse_projection: self.inverse_projection.into(),
            frame_index: self.frame_index,
            _padding: [0; 3],
        }
    }

    fn reevaluate_view(&mut self, forward: &Unit<Vector3<f32>>) {
        let target = self.position + forward.into_inner();
        // 카메라 -> 월드 변환. Isometry라서 역행렬이 항상 존재함
        self.inverse_view = Isometry3::look_at_rh(&self.position, &target, &self.world_up)
            .inverse()
            .to_homogeneous();
    }
}

// 기준을 넘었다면 0으로 되돌린 뒤 증가시킴. 그래서 시작 이후로는 0이 다시 나오지 않음
pub fn next_frame_index(index: u32) -> u32 {
    let index = if index > FRAME_INDEX_WRAP { 0 } else { index };
    index + 1
}
