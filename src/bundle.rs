// bundle.rs — 多视角图片集合与输入校验

use crate::error::{MultiViewError, Result};
use image::RgbImage;

pub const CHANNELS: usize = 3;
/// 单图插槽输入最多 8 张。
pub const MAX_SLOTS: usize = 8;

/// 一张原始输入图片：height × width × 3，强度值 0.0..=1.0。
#[derive(Debug, Clone)]
pub struct ViewImage {
    pub width: u32,
    pub height: u32,
    data: Vec<f32>,
}

impl ViewImage {
    /// 从原始浮点缓冲构建，校验形状。
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if width == 0 || height == 0 {
            return Err(MultiViewError::Validation(format!(
                "image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if data.len() != expected {
            return Err(MultiViewError::Validation(format!(
                "buffer length {} does not match {}x{}x{}",
                data.len(),
                height,
                width,
                CHANNELS
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn from_rgb8(img: &RgbImage) -> Result<Self> {
        let data = img.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self::from_raw(img.width(), img.height(), data)
    }

    /// 转为 8-bit RGB 以便编码为 PNG。
    pub fn to_rgb8(&self) -> RgbImage {
        let bytes: Vec<u8> = self
            .data
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        // from_raw 只会在长度不匹配时返回 None，构造时已校验过
        RgbImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

/// 有序的多视角图片集合。顺序决定布局角度与插槽分配，全程保持不变。
#[derive(Debug, Clone)]
pub struct MultiViewBundle {
    images: Vec<ViewImage>,
}

impl MultiViewBundle {
    /// 批量输入：整个序列作为一个 bundle。
    pub fn from_batch(images: Vec<ViewImage>) -> Result<Self> {
        if images.is_empty() {
            return Err(MultiViewError::Validation(
                "image list must not be empty".into(),
            ));
        }
        Ok(Self { images })
    }

    /// 单图插槽输入：最多 8 个可选插槽，空槽跳过，至少一张。
    pub fn from_slots(slots: Vec<Option<ViewImage>>) -> Result<Self> {
        if slots.len() > MAX_SLOTS {
            return Err(MultiViewError::InvalidParameter(format!(
                "at most {} image slots are supported, got {}",
                MAX_SLOTS,
                slots.len()
            )));
        }
        let images: Vec<ViewImage> = slots.into_iter().flatten().collect();
        if images.is_empty() {
            return Err(MultiViewError::Validation(
                "at least one image is required".into(),
            ));
        }
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[ViewImage] {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, level: f32) -> ViewImage {
        let data = vec![level; width as usize * height as usize * CHANNELS];
        ViewImage::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn raw_buffer_shape_is_checked() {
        assert!(ViewImage::from_raw(4, 4, vec![0.5; 4 * 4 * 3]).is_ok());
        assert!(matches!(
            ViewImage::from_raw(4, 4, vec![0.5; 4 * 4 * 3 - 1]),
            Err(MultiViewError::Validation(_))
        ));
        assert!(matches!(
            ViewImage::from_raw(0, 4, vec![]),
            Err(MultiViewError::Validation(_))
        ));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            MultiViewBundle::from_batch(vec![]),
            Err(MultiViewError::Validation(_))
        ));
    }

    #[test]
    fn slots_skip_none_and_keep_order() {
        let bundle = MultiViewBundle::from_slots(vec![
            None,
            Some(gray(2, 2, 0.1)),
            None,
            Some(gray(3, 3, 0.2)),
        ])
        .unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.images()[0].width, 2);
        assert_eq!(bundle.images()[1].width, 3);
    }

    #[test]
    fn all_empty_slots_are_rejected() {
        assert!(matches!(
            MultiViewBundle::from_slots(vec![None, None]),
            Err(MultiViewError::Validation(_))
        ));
    }

    #[test]
    fn more_than_eight_slots_are_rejected() {
        let slots: Vec<Option<ViewImage>> = (0..9).map(|_| Some(gray(2, 2, 0.5))).collect();
        assert!(matches!(
            MultiViewBundle::from_slots(slots),
            Err(MultiViewError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rgb8_round_trip_preserves_levels() {
        let img = gray(2, 2, 1.0);
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        let back = ViewImage::from_rgb8(&rgb).unwrap();
        assert_eq!(back.width, 2);
        assert_eq!(back.height, 2);
    }
}
