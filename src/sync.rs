// CPU -> GPU 유니폼 버퍼 동기화.
// 버퍼마다 Mirror가 하나씩 붙어서 마지막 업로드 이후 바뀌었는지 기억함. 되읽기는 없음

use bytemuck::Pod;
use log::trace;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{BindGroupEntry, Buffer, BufferUsages, Device, Queue};

pub trait UploadTarget {
    fn upload(&self, bytes: &[u8]);
}

// Queue::write_buffer는 새 스테이징 메모리에 복사해두고 다음 submit 전에 옮겨줌.
// GPU가 이전 프레임 내용을 아직 읽고 있어도 기다리지 않음 (D3D의 WRITE_DISCARD와 같은 역할)
pub struct QueueUpload<'a> {
    queue: &'a Queue,
    buffer: &'a Buffer,
}

impl UploadTarget for QueueUpload<'_> {
    fn upload(&self, bytes: &[u8]) {
        self.queue.write_buffer(self.buffer, 0, bytes);
    }
}

pub struct UniformBuffer {
    buffer: Buffer,
    binding: u32,
}

impl UniformBuffer {
    pub fn new<T: Pod>(device: &Device, label: &str, binding: u32, initial: &T) -> Self {
        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(initial),
            // 쉐이더에서 읽기 + CPU에서 덮어쓰기
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self { buffer, binding }
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn bind_group_entry(&self) -> BindGroupEntry {
        BindGroupEntry {
            binding: self.binding,
            resource: self.buffer.as_entire_binding(),
        }
    }

    pub fn target<'a>(&'a self, queue: &'a Queue) -> QueueUpload<'a> {
        QueueUpload {
            queue,
            buffer: &self.buffer,
        }
    }
}

#[derive(Debug)]
pub struct Mirror {
    label: &'static str,
    dirty: bool,
    uploads: u64,
}

impl Mirror {
    // 버퍼를 만들 때 올린 내용도 한 번의 업로드로 침. 그래서 처음엔 dirty
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            dirty: true,
            uploads: 0,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    // dirty일 때만 value를 올림. 올렸으면 true
    pub fn flush<T: Pod>(&mut self, target: &impl UploadTarget, value: &T) -> bool {
        if !self.dirty {
            return false;
        }

        target.upload(bytemuck::bytes_of(value));
        self.dirty = false;
        self.uploads += 1;
        trace!("uploaded {} ({} bytes)", self.label, std::mem::size_of::<T>());

        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    pub struct Recorder {
        pub writes: RefCell<Vec<Vec<u8>>>,
    }

    impl UploadTarget for Recorder {
        fn upload(&self, bytes: &[u8]) {
            self.writes.borrow_mut().push(bytes.to_vec());
        }
    }

    impl Recorder {
        pub fn count(&self) -> usize {
            self.writes.borrow().len()
        }

        pub fn last(&self) -> Option<Vec<u8>> {
            self.writes.borrow().last().cloned()
        }
    }

    #[test]
    fn new_mirror_uploads_once_then_waits_for_changes() {
        let recorder = Recorder::default();
        let mut mirror = Mirror::new("test");

        assert!(mirror.flush(&recorder, &7u32));
        assert!(!mirror.flush(&recorder, &8u32));

        assert_eq!(recorder.count(), 1);
        assert_eq!(recorder.last().unwrap(), 7u32.to_le_bytes());
        assert_eq!(mirror.uploads(), 1);
    }

    #[test]
    fn mark_dirty_schedules_a_full_rewrite() {
        let recorder = Recorder::default();
        let mut mirror = Mirror::new("test");
        mirror.flush(&recorder, &[1.0f32; 4]);

        mirror.mark_dirty();
        assert!(mirror.is_dirty());
        assert!(mirror.flush(&recorder, &[2.0f32; 4]));

        assert!(!mirror.is_dirty());
        assert_eq!(recorder.count(), 2);
        assert_eq!(recorder.last().unwrap(), bytemuck::bytes_of(&[2.0f32; 4]));
    }
}
