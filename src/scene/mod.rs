use std::path::Path;

use log::{debug, info, warn};

use crate::camera::{Camera, CameraSettings};
use crate::error::Result;
use crate::input::FrameInput;
use crate::scene::catalog::Catalog;
use crate::scene::codec::LoadReport;
use crate::scene::gpu::{GpuCamera, GpuCatalog};
use crate::sync::{Mirror, UploadTarget};

pub mod catalog;
pub mod codec;
pub mod gpu;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flushed {
    pub catalog: bool,
    pub camera: bool,
}

// CPU 쪽 씬 데이터의 유일한 주인.
// 카탈로그는 불러올 때만, 카메라는 매 프레임 GPU로 올라감
pub struct Scene {
    catalog: Catalog,
    camera: Camera,
    catalog_mirror: Mirror,
    camera_mirror: Mirror,
}

impl Scene {
    pub fn new(catalog: Catalog, camera: CameraSettings, aspect: f32) -> Result<Self> {
        catalog.validate()?;

        Ok(Self {
            catalog,
            camera: Camera::new(camera, aspect),
            catalog_mirror: Mirror::new("catalog"),
            camera_mirror: Mirror::new("camera"),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn gpu_catalog(&self) -> GpuCatalog {
        self.catalog.to_gpu()
    }

    pub fn gpu_camera(&self) -> GpuCamera {
        self.camera.gpu_frame()
    }

    // 파일 내용을 지금 카탈로그 뒤에 붙임.
    // 복사본에 먼저 붙여보고 검증을 통과해야만 바꿔 끼움. 중간에 멈춘 경우에도
    // 이미 붙은 항목이 있으면 GPU에 다시 올려서 CPU와 GPU가 어긋나지 않게 함
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let mut staged = self.catalog.clone();
        let loaded = codec::load(&mut staged, path);

        let changed = staged.material_count() != self.catalog.material_count()
            || staged.sphere_count() != self.catalog.sphere_count();
        if changed {
            if let Err(invalid) = staged.validate() {
                // 읽기 자체가 실패했다면 그 이유가 먼저
                return Err(loaded.err().unwrap_or(invalid));
            }
            self.catalog = staged;
            self.catalog_mirror.mark_dirty();
        }

        let report = match loaded {
            Ok(report) => report,
            Err(e) => {
                if changed {
                    warn!("{} was only partly loaded: {}", path.display(), e);
                }
                return Err(e);
            }
        };

        info!(
            "loaded {} materials and {} spheres from {}",
            report.materials,
            report.spheres,
            path.display()
        );
        Ok(report)
    }

    // load와 달리 기존 카탈로그를 먼저 비움
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let mut fresh = Catalog::new();
        let report = codec::load(&mut fresh, path)?;
        fresh.validate()?;
        self.catalog = fresh;
        self.catalog_mirror.mark_dirty();

        info!(
            "reloaded {} materials and {} spheres from {}",
            report.materials,
            report.spheres,
            path.display()
        );
        Ok(report)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        codec::save(&self.catalog, path)?;

        if self.catalog.plane_count() > 0 || self.catalog.box_count() > 0 {
            warn!(
                "planes and boxes are not part of the scene format, {} of them were not saved",
                self.catalog.plane_count() + self.catalog.box_count()
            );
        }
        info!("saved scene to {}", path.display());
        Ok(())
    }

    pub fn update_camera(&mut self, delta_time_ms: f32, input: &FrameInput) {
        self.camera.update(delta_time_ms, input);
        self.camera_mirror.mark_dirty();
    }

    // dirty인 미러만 GPU 버퍼에 통째로 씀
    pub fn flush(&mut self, catalog: &impl UploadTarget, camera: &impl UploadTarget) -> Flushed {
        let flushed = Flushed {
            catalog: self.catalog_mirror.flush(catalog, &self.catalog.to_gpu()),
            camera: self.camera_mirror.flush(camera, &self.camera.gpu_frame()),
        };

        if flushed.catalog {
            debug!("catalog re-uploaded ({} uploads so far)", self.catalog_mirror.uploads());
        }
        flushed
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use nalgebra::{Vector2, Vector3};

    use super::*;
    use crate::config::{HEIGHT, MAX_SPHERES, WIDTH};
    use crate::error::SceneError;
    use crate::scene::catalog::{Material, Sphere};
    use crate::sync::tests::Recorder;

    const ASPECT: f32 = WIDTH as f32 / HEIGHT as f32;

    fn empty_scene() -> Scene {
        Scene::new(Catalog::new(), CameraSettings::default(), ASPECT).unwrap()
    }

    #[test]
    fn construction_uploads_both_buffers_once() {
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());

        assert_eq!(scene.flush(&catalog, &camera), Flushed { catalog: true, camera: true });
        assert_eq!(scene.flush(&catalog, &camera), Flushed::default());
        assert_eq!(catalog.last().unwrap().len(), std::mem::size_of::<GpuCatalog>());
    }

    #[test]
    fn camera_is_uploaded_after_every_update_catalog_is_not() {
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        for _ in 0..3 {
            scene.update_camera(16.0, &FrameInput::default());
            let flushed = scene.flush(&catalog, &camera);
            assert!(flushed.camera && !flushed.catalog);
        }

        assert_eq!(camera.count(), 4);
        assert_eq!(catalog.count(), 1);
        let uploaded: GpuCamera = bytemuck::pod_read_unaligned(&camera.last().unwrap());
        assert_eq!(uploaded.frame_index, 3);
    }

    #[test]
    fn successful_load_schedules_catalog_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        fs::write(&path, "material 1 0 0 1 0.5\nsphere 0 0 -3 1 0\n").unwrap();
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        scene.load(&path).unwrap();
        assert!(scene.flush(&catalog, &camera).catalog);

        let uploaded: GpuCatalog = bytemuck::pod_read_unaligned(&catalog.last().unwrap());
        assert_eq!(uploaded.sphere_count, 1);
        assert_eq!(uploaded.spheres[0].center, [0.0, 0.0, -3.0, 0.0]);
        assert_eq!(uploaded.materials[0].kind, 1);
    }

    #[test]
    fn load_appends_but_reload_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        fs::write(&path, "material 1 1 1 0 0\nsphere 0 0 0 1 0\n").unwrap();
        let mut scene = empty_scene();

        scene.load(&path).unwrap();
        scene.load(&path).unwrap();
        assert_eq!(scene.catalog().sphere_count(), 2);

        scene.reload(&path).unwrap();
        assert_eq!(scene.catalog().sphere_count(), 1);
        assert_eq!(scene.catalog().material_count(), 1);
    }

    #[test]
    fn missing_file_leaves_scene_and_gpu_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        let error = scene.load(dir.path().join("missing.scene")).unwrap_err();

        assert!(matches!(error, SceneError::FileNotFound(_)));
        assert!(!scene.flush(&catalog, &camera).catalog);
        assert!(scene.catalog().is_empty());
    }

    #[test]
    fn dangling_material_reference_is_never_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        fs::write(&path, "material 1 1 1 0 0\nsphere 0 0 0 1 3\n").unwrap();
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        let error = scene.load(&path).unwrap_err();

        assert!(matches!(error, SceneError::DanglingMaterial { index: 3, .. }));
        assert!(!scene.flush(&catalog, &camera).catalog);
        assert_eq!(catalog.count(), 1);
        assert!(scene.catalog().is_empty());

        // reload는 검증에 실패하면 기존 카탈로그를 그대로 둠
        let mut clean = empty_scene();
        assert!(clean.reload(&path).is_err());
        assert!(clean.catalog().is_empty());
    }

    #[test]
    fn rejected_load_does_not_block_the_next_one() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.scene");
        let good = dir.path().join("good.scene");
        fs::write(&bad, "sphere 0 0 0 1 5\n").unwrap();
        fs::write(&good, "material 1 1 1 0 0\nsphere 0 0 -2 1 0\n").unwrap();
        let mut scene = empty_scene();

        assert!(matches!(scene.load(&bad), Err(SceneError::DanglingMaterial { index: 5, .. })));
        assert!(scene.catalog().is_empty());

        let report = scene.load(&good).unwrap();
        assert_eq!(report.spheres, 1);
        assert_eq!(scene.catalog().sphere_count(), 1);
        assert_eq!(scene.catalog().spheres()[0].material_index, 0);
    }

    #[test]
    fn load_stopped_by_a_full_table_still_uploads_what_was_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        let text = format!("material 1 1 1 0 0\n{}", "sphere 0 0 0 1 0\n".repeat(MAX_SPHERES + 1));
        fs::write(&path, text).unwrap();
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        let error = scene.load(&path).unwrap_err();

        assert!(matches!(error, SceneError::CapacityExceeded { table: "sphere", .. }));
        assert_eq!(scene.catalog().sphere_count(), MAX_SPHERES);
        assert!(scene.flush(&catalog, &camera).catalog);
        let uploaded: GpuCatalog = bytemuck::pod_read_unaligned(&catalog.last().unwrap());
        assert_eq!(uploaded.sphere_count, MAX_SPHERES as i32);
        assert_eq!(uploaded.materials[0].kind, 0);
    }

    #[test]
    fn corrupt_bytes_truncate_the_load_and_upload_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        fs::write(&path, b"material 1 0 0 0 0\nsphere 0 0 0 1 0\n\xff\xfe\nsphere 1 1 1 1 0\n").unwrap();
        let mut scene = empty_scene();
        let (catalog, camera) = (Recorder::default(), Recorder::default());
        scene.flush(&catalog, &camera);

        let report = scene.load(&path).unwrap();

        assert!(matches!(report.halted, Some(SceneError::MalformedRecord { line: 3, .. })));
        assert_eq!(scene.catalog().sphere_count(), 1);
        assert!(scene.flush(&catalog, &camera).catalog);
    }

    #[test]
    fn new_rejects_dangling_catalogs() {
        let mut catalog = Catalog::new();
        catalog.add_sphere(Sphere::default()).unwrap();

        let result = Scene::new(catalog, CameraSettings::default(), ASPECT);

        assert!(matches!(result, Err(SceneError::DanglingMaterial { .. })));
    }

    #[test]
    fn save_and_load_through_the_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.scene");
        let mut catalog = Catalog::new();
        catalog
            .add_material(Material {
                albedo: Vector3::new(0.2, 0.4, 0.6),
                ..Material::default()
            })
            .unwrap();
        catalog
            .add_sphere(Sphere {
                center: Vector3::new(1.0, 2.0, 3.0),
                radius: 0.75,
                material_index: 0,
            })
            .unwrap();
        let scene = Scene::new(catalog, CameraSettings::default(), ASPECT).unwrap();

        scene.save(&path).unwrap();
        let mut copy = empty_scene();
        copy.load(&path).unwrap();

        assert_eq!(copy.catalog().spheres(), scene.catalog().spheres());
        assert_eq!(copy.catalog().materials(), scene.catalog().materials());
    }

    #[test]
    fn camera_update_reaches_the_gpu_frame() {
        let mut scene = empty_scene();
        scene.update_camera(
            16.0,
            &FrameInput {
                forward: true,
                mouse_delta: Vector2::new(0.0, 0.0),
                ..FrameInput::default()
            },
        );

        let frame = scene.gpu_camera();
        assert!((frame.position[0] - 0.16).abs() < 1e-6);
        assert_eq!(frame.frame_index, 1);
    }
}
