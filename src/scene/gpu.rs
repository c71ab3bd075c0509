// raytrace.wgsl과 바이트 단위로 똑같아야 하는 구조체들.
// 유니폼 버퍼 규칙: vec3/vec4/구조체는 16바이트 경계, 배열 간격은 16의 배수.
// 행렬은 nalgebra와 WGSL 모두 열 우선(column-major)

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::config::{MAX_BOXES, MAX_MATERIALS, MAX_PLANES, MAX_SPHERES};

// 빈 재질 슬롯 표시. 쉐이더는 이걸 보고 재질 테이블의 끝을 알아냄
pub const UNOCCUPIED_MATERIAL: i32 = -1;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub center: [f32; 4],
    pub radius: f32,
    pub material_index: i32,
    pub _padding: [i32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuPlane {
    pub a: [f32; 4],
    pub b: [f32; 4],
    pub c: [f32; 4],
    pub material_index: i32,
    pub _padding: [i32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuAabb {
    pub min: [f32; 4],
    pub max: [f32; 4],
    pub material_index: i32,
    pub _padding: [i32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub albedo: [f32; 3],
    pub roughness: f32,
    pub kind: i32,
    pub _padding: [i32; 3],
}

impl GpuMaterial {
    pub fn unoccupied() -> Self {
        Self {
            kind: UNOCCUPIED_MATERIAL,
            ..Self::zeroed()
        }
    }
}

// 빈 슬롯까지 포함한 카탈로그 전체. 항상 한 번에 올림
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GpuCatalog {
    pub spheres: [GpuSphere; MAX_SPHERES],
    pub planes: [GpuPlane; MAX_PLANES],
    pub boxes: [GpuAabb; MAX_BOXES],
    pub materials: [GpuMaterial; MAX_MATERIALS],
    pub sphere_count: i32,
    pub plane_count: i32,
    pub box_count: i32,
    pub _padding: i32,
}

impl Default for GpuCatalog {
    fn default() -> Self {
        Self {
            materials: [GpuMaterial::unoccupied(); MAX_MATERIALS],
            ..Self::zeroed()
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuCamera {
    pub position: [f32; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    pub frame_index: u32,
    pub _padding: [u32; 3],
}

const _: () = assert!(size_of::<GpuSphere>() == 32);
const _: () = assert!(offset_of!(GpuSphere, radius) == 16);
const _: () = assert!(offset_of!(GpuSphere, material_index) == 20);

const _: () = assert!(size_of::<GpuPlane>() == 64);
const _: () = assert!(offset_of!(GpuPlane, material_index) == 48);

const _: () = assert!(size_of::<GpuAabb>() == 48);
const _: () = assert!(offset_of!(GpuAabb, material_index) == 32);

const _: () = assert!(size_of::<GpuMaterial>() == 32);
const _: () = assert!(offset_of!(GpuMaterial, roughness) == 12);
const _: () = assert!(offset_of!(GpuMaterial, kind) == 16);

const _: () = assert!(offset_of!(GpuCatalog, planes) == 512);
const _: () = assert!(offset_of!(GpuCatalog, boxes) == 1536);
const _: () = assert!(offset_of!(GpuCatalog, materials) == 2304);
const _: () = assert!(offset_of!(GpuCatalog, sphere_count) == 2560);
const _: () = assert!(size_of::<GpuCatalog>() == 2576);
const _: () = assert!(size_of::<GpuCatalog>() % 16 == 0);

const _: () = assert!(offset_of!(GpuCamera, inverse_view) == 16);
const _: () = assert!(offset_of!(GpuCamera, inverse_projection) == 80);
const _: () = assert!(offset_of!(GpuCamera, frame_index) == 144);
const _: () = assert!(size_of::<GpuCamera>() == 160);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_marks_every_material_slot_unoccupied() {
        let catalog = GpuCatalog::default();

        assert!(catalog
            .materials
            .iter()
            .all(|material| material.kind == UNOCCUPIED_MATERIAL));
        assert_eq!(catalog.sphere_count, 0);
        assert_eq!(catalog.spheres[0], GpuSphere::zeroed());
    }

    #[test]
    fn counts_land_where_the_shader_reads_them() {
        let catalog = GpuCatalog {
            sphere_count: 3,
            plane_count: 2,
            box_count: 1,
            ..GpuCatalog::default()
        };
        let bytes = bytemuck::bytes_of(&catalog);

        let read = |offset: usize| i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        assert_eq!(read(2560), 3);
        assert_eq!(read(2564), 2);
        assert_eq!(read(2568), 1);
        // 첫 번째 재질의 kind
        assert_eq!(read(2304 + 16), UNOCCUPIED_MATERIAL);
    }
}
