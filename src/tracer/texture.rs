use wgpu::{
    Device, Extent3d, ImageCopyTexture, Texture, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;

// 레이 트레이싱 결과를 담는 텍스쳐. 색 누적을 위해 채널당 32비트 float 사용
pub const FRAME_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

pub struct Image {
    pub gpu_texture: Texture,
    pub view: TextureView,
    pub name: String,
}

impl Image {
    pub fn new(device: &Device, width: u32, height: u32, label: &str, usage: TextureUsages) -> Image {
        let gpu_texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1, // 단순한 2차원 이미지니 1개로
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: FRAME_FORMAT,
            usage,
            view_formats: &[],
        });

        let view = gpu_texture.create_view(&TextureViewDescriptor {
            label: Some(&format!("{} view", label)),
            ..Default::default() // label 뺴고 나머진 기본값 그대로
        });

        Self {
            gpu_texture,
            view,
            name: label.to_string(),
        }
    }

    // 컴퓨트 쉐이더가 쓰는 쪽
    pub fn storage(device: &Device, size: PhysicalSize<u32>, label: &str) -> Image {
        Self::new(
            device,
            size.width,
            size.height,
            label,
            TextureUsages::STORAGE_BINDING | TextureUsages::COPY_SRC,
        )
    }

    // 쉐이더에서 읽기만 하고, 내용은 다른 텍스쳐에서 복사받는 쪽
    pub fn sampled(device: &Device, size: PhysicalSize<u32>, label: &str) -> Image {
        Self::new(
            device,
            size.width,
            size.height,
            label,
            TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        )
    }

    pub fn copy_target(&self) -> ImageCopyTexture {
        self.gpu_texture.as_image_copy()
    }

    pub fn extent(&self) -> Extent3d {
        self.gpu_texture.size()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.gpu_texture.width(), self.gpu_texture.height())
    }
}
