// 컴퓨트 쉐이더(raytrace.wgsl)와 암묵적으로 맞춰야 하는 상수들.
// 여기 값을 바꾸면 쉐이더 쪽도 같이 바꿔야 함!

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 960;

// @workgroup_size(16, 16, 1)
pub const WORKGROUP_SIZE: u32 = 16;

pub const MAX_SPHERES: usize = 16;
pub const MAX_PLANES: usize = 16;
pub const MAX_BOXES: usize = 16;
pub const MAX_MATERIALS: usize = 8;

// @group(0): 씬 데이터
pub const CATALOG_BINDING: u32 = 0;
pub const CAMERA_BINDING: u32 = 1;
// @group(1): 컴퓨트 쉐이더 출력
pub const OUTPUT_BINDING: u32 = 0;
pub const HISTORY_BINDING: u32 = 1;
// 화면 출력 쉐이더의 @group(0)
pub const PRESENT_BINDING: u32 = 0;

pub const FRAME_INDEX_WRAP: u32 = 1_000_000;

pub const SCENE_PATH: &str = "scene.scene";

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.4,
    b: 0.6,
    a: 1.0,
};

pub const fn dispatch_size() -> (u32, u32, u32) {
    (WIDTH / WORKGROUP_SIZE, HEIGHT / WORKGROUP_SIZE, 1)
}

const _: () = assert!(WIDTH % WORKGROUP_SIZE == 0);
const _: () = assert!(HEIGHT % WORKGROUP_SIZE == 0);
