use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("{table} table is full (capacity {capacity})")]
    CapacityExceeded { table: &'static str, capacity: usize },

    #[error("scene file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("cannot open scene file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("{primitive} #{slot} references material {index}, but only {material_count} materials exist")]
    DanglingMaterial {
        primitive: &'static str,
        slot: usize,
        index: i32,
        material_count: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SceneError>;

// 시작할 때만 생기는 오류들. 하나라도 생기면 프로그램을 끝냄.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no GPU adapter compatible with the window surface")]
    NoAdapter,

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
