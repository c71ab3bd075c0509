// 카탈로그 텍스트 형식. 한 줄에 하나씩:
//   material <albedo.x> <albedo.y> <albedo.z> <kind> <roughness>
//   sphere <x> <y> <z> <radius> <material index>
// 다른 단어로 시작하는 줄은 건너뜀. 평면과 상자는 아직 형식에 없음

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::{Result, SceneError};
use crate::scene::catalog::{Catalog, Material, MaterialKind, Sphere};

#[derive(Debug, Default)]
pub struct LoadReport {
    pub materials: usize,
    pub spheres: usize,
    // 모르는 지시어라서 건너뛴 줄 수
    pub skipped: usize,
    // 숫자가 깨진 줄에서 멈췄다면 그 이유. 그 앞 줄들은 이미 적용됨
    pub halted: Option<SceneError>,
}

pub fn save<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_scene(catalog, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_scene<W: Write>(catalog: &Catalog, writer: &mut W) -> io::Result<()> {
    for material in catalog.materials() {
        writeln!(
            writer,
            "material {} {} {} {} {}",
            material.albedo.x,
            material.albedo.y,
            material.albedo.z,
            material.kind.id(),
            material.roughness
        )?;
    }

    for sphere in catalog.spheres() {
        writeln!(
            writer,
            "sphere {} {} {} {} {}",
            sphere.center.x, sphere.center.y, sphere.center.z, sphere.radius, sphere.material_index
        )?;
    }

    Ok(())
}

// 기존 카탈로그를 비우지 않고 뒤에 붙임
pub fn load<P: AsRef<Path>>(catalog: &mut Catalog, path: P) -> Result<LoadReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SceneError::FileNotFound(path.to_path_buf()),
        _ => SceneError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    read_scene(catalog, BufReader::new(file))
}

pub fn read_scene<R: BufRead>(catalog: &mut Catalog, reader: R) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = match line {
            Ok(line) => line,
            // 깨진 바이트가 있는 줄부터는 무시하고, 앞 줄들은 그대로 둠
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                let malformed = SceneError::MalformedRecord {
                    line: number,
                    reason: "line is not valid UTF-8".to_string(),
                };
                warn!("scene file truncated: {malformed}");
                report.halted = Some(malformed);
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let mut tokens = line.split_whitespace();

        let applied = match tokens.next() {
            Some("material") => parse_material(&mut tokens, number).map(|material| {
                catalog.add_material(material).map(|_| report.materials += 1)
            }),
            Some("sphere") => parse_sphere(&mut tokens, number)
                .map(|sphere| catalog.add_sphere(sphere).map(|_| report.spheres += 1)),
            Some(other) => {
                debug!("skipping unknown directive `{other}` on line {number}");
                report.skipped += 1;
                continue;
            }
            None => continue,
        };

        match applied {
            // 용량 초과는 호출자가 꼭 알아야 하니 바로 돌려줌
            Ok(appended) => appended?,
            Err(malformed) => {
                warn!("scene file truncated: {malformed}");
                report.halted = Some(malformed);
                break;
            }
        }
    }

    Ok(report)
}

fn parse_material(tokens: &mut SplitWhitespace, line: usize) -> Result<Material> {
    let albedo = Vector3::new(
        field(tokens, line, "albedo.x")?,
        field(tokens, line, "albedo.y")?,
        field(tokens, line, "albedo.z")?,
    );
    let id: i32 = field(tokens, line, "type")?;
    let kind = MaterialKind::from_id(id).ok_or_else(|| SceneError::MalformedRecord {
        line,
        reason: format!("unknown material type {id}"),
    })?;
    let roughness = field(tokens, line, "roughness")?;

    Ok(Material {
        albedo,
        roughness,
        kind,
    })
}

fn parse_sphere(tokens: &mut SplitWhitespace, line: usize) -> Result<Sphere> {
    Ok(Sphere {
        center: Vector3::new(
            field(tokens, line, "position.x")?,
            field(tokens, line, "position.y")?,
            field(tokens, line, "position.z")?,
        ),
        radius: field(tokens, line, "radius")?,
        material_index: field(tokens, line, "material index")?,
    })
}

fn field<T: FromStr>(tokens: &mut SplitWhitespace, line: usize, name: &str) -> Result<T> {
    let token = tokens.next().ok_or_else(|| SceneError::MalformedRecord {
        line,
        reason: format!("missing {name}"),
    })?;

    token.parse().map_err(|_| SceneError::MalformedRecord {
        line,
        reason: format!("`{token}` is not a valid {name}"),
    })
}
