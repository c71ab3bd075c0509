use nalgebra::Vector3;

use crate::config::{MAX_BOXES, MAX_MATERIALS, MAX_PLANES, MAX_SPHERES};
use crate::error::{Result, SceneError};
use crate::scene::gpu::{GpuCatalog, GpuMaterial};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MaterialKind {
    Diffuse,
    Metal,
}

impl MaterialKind {
    // 파일과 쉐이더에서 쓰는 번호
    pub fn id(self) -> i32 {
        match self {
            MaterialKind::Diffuse => 0,
            MaterialKind::Metal => 1,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(MaterialKind::Diffuse),
            1 => Some(MaterialKind::Metal),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub albedo: Vector3<f32>,
    pub roughness: f32,
    pub kind: MaterialKind,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            roughness: 0.0,
            kind: MaterialKind::Diffuse,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vector3<f32>,
    pub radius: f32,
    pub material_index: i32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vector3::zeros(),
            radius: 1.0,
            material_index: 0,
        }
    }
}

// 세 점이 지나는 평면
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub a: Vector3<f32>,
    pub b: Vector3<f32>,
    pub c: Vector3<f32>,
    pub material_index: i32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
    pub material_index: i32,
}

// N개를 넘으면 더 붙지 않는 목록
#[derive(Debug, Clone)]
pub struct Table<T, const N: usize> {
    name: &'static str,
    items: Vec<T>,
}

impl<T, const N: usize> Table<T, N> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::with_capacity(N),
        }
    }

    pub fn push(&mut self, item: T) -> Result<usize> {
        if self.items.len() == N {
            return Err(SceneError::CapacityExceeded {
                table: self.name,
                capacity: N,
            });
        }

        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    spheres: Table<Sphere, MAX_SPHERES>,
    planes: Table<Plane, MAX_PLANES>,
    boxes: Table<Aabb, MAX_BOXES>,
    materials: Table<Material, MAX_MATERIALS>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            spheres: Table::new("sphere"),
            planes: Table::new("plane"),
            boxes: Table::new("box"),
            materials: Table::new("material"),
        }
    }

    pub fn add_material(&mut self, material: Material) -> Result<usize> {
        self.materials.push(material)
    }

    // material_index는 여기서 검사하지 않음. 파일에서 구가 재질보다 먼저 나올 수도 있으니
    // 전부 불러온 뒤에 validate()로 확인할 것
    pub fn add_sphere(&mut self, sphere: Sphere) -> Result<usize> {
        self.spheres.push(sphere)
    }

    pub fn add_plane(&mut self, plane: Plane) -> Result<usize> {
        self.planes.push(plane)
    }

    pub fn add_box(&mut self, aabb: Aabb) -> Result<usize> {
        self.boxes.push(aabb)
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
        self.planes.clear();
        self.boxes.clear();
        self.materials.clear();
    }

    pub fn materials(&self) -> &[Material] {
        self.materials.as_slice()
    }

    pub fn spheres(&self) -> &[Sphere] {
        self.spheres.as_slice()
    }

    pub fn planes(&self) -> &[Plane] {
        self.planes.as_slice()
    }

    pub fn boxes(&self) -> &[Aabb] {
        self.boxes.as_slice()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn sphere_count(&self) -> usize {
        self.spheres.len()
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
            && self.planes.is_empty()
            && self.boxes.is_empty()
            && self.materials.is_empty()
    }

    // 모든 도형이 실제로 있는 재질을 가리키는지 확인
    pub fn validate(&self) -> Result<()> {
        let material_count = self.materials.len();
        let check = |primitive: &'static str, indices: &mut dyn Iterator<Item = i32>| {
            for (slot, index) in indices.enumerate() {
                if index < 0 || index as usize >= material_count {
                    return Err(SceneError::DanglingMaterial {
                        primitive,
                        slot,
                        index,
                        material_count,
                    });
                }
            }
            Ok(())
        };

        check("sphere", &mut self.spheres().iter().map(|sphere| sphere.material_index))?;
        check("plane", &mut self.planes().iter().map(|plane| plane.material_index))?;
        check("box", &mut self.boxes().iter().map(|aabb| aabb.material_index))
    }

    pub fn to_gpu(&self) -> GpuCatalog {
        let mut gpu = GpuCatalog::default();

        for (target, sphere) in gpu.spheres.iter_mut().zip(self.spheres()) {
            target.center = point(&sphere.center);
            target.radius = sphere.radius;
            target.material_index = sphere.material_index;
        }
        for (target, plane) in gpu.planes.iter_mut().zip(self.planes()) {
            target.a = point(&plane.a);
            target.b = point(&plane.b);
            target.c = point(&plane.c);
            target.material_index = plane.material_index;
        }
        for (target, aabb) in gpu.boxes.iter_mut().zip(self.boxes()) {
            target.min = point(&aabb.min);
            target.max = point(&aabb.max);
            target.material_index = aabb.material_index;
        }
        for (target, material) in gpu.materials.iter_mut().zip(self.materials()) {
            *target = GpuMaterial {
                albedo: material.albedo.into(),
                roughness: material.roughness,
                kind: material.kind.id(),
                _padding: [0; 3],
            };
        }

        gpu.sphere_count = self.spheres.len() as i32;
        gpu.plane_count = self.planes.len() as i32;
        gpu.box_count = self.boxes.len() as i32;

        gpu
    }
}

fn point(vector: &Vector3<f32>) -> [f32; 4] {
    [vector.x, vector.y, vector.z, 0.0]
}
