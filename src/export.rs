// export.rs — 纹理导出：PNG 文件 或 base64 data URI

use crate::bundle::MultiViewBundle;
use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageOutputFormat;
use std::io::Cursor;
use std::path::PathBuf;

/// 落盘导出适配器。输出目录显式传入，不依赖全局状态。
pub struct ExportAdapter {
    output_dir: PathBuf,
}

impl ExportAdapter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 按输入顺序把每张图编码为 `view_{index}.png` 并写入输出目录，
    /// 返回文件名列表（生成文档中使用的相对引用）。
    pub fn export_surfaces(&self, bundle: &MultiViewBundle) -> Result<Vec<String>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut refs = Vec::with_capacity(bundle.len());
        for (idx, img) in bundle.images().iter().enumerate() {
            let name = format!("view_{}.png", idx);
            let path = self.output_dir.join(&name);
            img.to_rgb8()
                .save_with_format(&path, image::ImageFormat::Png)?;
            log::info!("wrote {}", path.display());
            refs.push(name);
        }
        Ok(refs)
    }
}

/// 预览适配器：每张图编码为内联 `data:image/png;base64,...`，不落盘。
pub fn data_uris(bundle: &MultiViewBundle) -> Result<Vec<String>> {
    let mut refs = Vec::with_capacity(bundle.len());
    for img in bundle.images() {
        let mut bytes = Vec::new();
        img.to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        refs.push(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)));
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ViewImage;

    fn bundle_of(n: usize) -> MultiViewBundle {
        let images = (0..n)
            .map(|i| {
                let level = i as f32 / n.max(1) as f32;
                ViewImage::from_raw(4, 4, vec![level; 4 * 4 * 3]).unwrap()
            })
            .collect();
        MultiViewBundle::from_batch(images).unwrap()
    }

    #[test]
    fn data_uris_are_ordered_png_uris() {
        let uris = data_uris(&bundle_of(3)).unwrap();
        assert_eq!(uris.len(), 3);
        for uri in &uris {
            assert!(uri.starts_with("data:image/png;base64,"));
        }
        // 不同灰度的图编码结果应不同，顺序可区分
        assert_ne!(uris[0], uris[2]);
    }

    #[test]
    fn export_writes_deterministic_filenames() {
        let dir = std::env::temp_dir().join(format!("multiview3d-test-{}", std::process::id()));
        let adapter = ExportAdapter::new(&dir);
        let refs = adapter.export_surfaces(&bundle_of(2)).unwrap();
        assert_eq!(refs, vec!["view_0.png", "view_1.png"]);
        for name in &refs {
            let path = dir.join(name);
            assert!(path.exists());
            let decoded = image::open(&path).unwrap();
            assert_eq!(decoded.width(), 4);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
