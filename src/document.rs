// document.rs — 场景中间表示与 HTML 文档生成
// 布局计算（layout.rs）与文本输出在此分层：先构建带类型的 SceneSpec，
// 再通过模板替换渲染为独立 HTML。

use crate::error::{MultiViewError, Result};
use crate::layout::{compute_placements, LayoutMode};
use crate::i18n;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const MIN_ROTATION_SPEED: f32 = 0.1;
pub const MAX_ROTATION_SPEED: f32 = 5.0;
pub const DEFAULT_DOCUMENT_NAME: &str = "3d_preview.html";

const TEMPLATE: &str = include_str!("viewer_template.html");

/// 一个平面在生成文档中的完整描述。
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceSpec {
    /// 纹理引用：相对文件名或内联 data URI。
    pub texture: String,
    pub position: [f32; 3],
    /// 欧拉角（弧度），按 Y-X-Z 顺序应用。
    pub rotation: [f32; 3],
    pub size: f32,
}

/// 生成文档的带类型中间表示。一次构建，之后只读。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    pub surfaces: Vec<SurfaceSpec>,
    pub mode: String,
    pub rotation_speed: f32,
    pub auto_rotate: bool,
}

#[derive(Serialize)]
struct ControlLabels {
    pause: String,
    resume: String,
}

impl SceneSpec {
    /// 校验输入并把布局结果与纹理引用装配为场景描述。
    ///
    /// 纹理引用的顺序即输入顺序；立方体模式下超出 6 个的引用被截断
    /// （与布局引擎一致）。
    pub fn new(
        texture_refs: Vec<String>,
        mode: LayoutMode,
        rotation_speed: f32,
        auto_rotate: bool,
    ) -> Result<Self> {
        if texture_refs.is_empty() {
            return Err(MultiViewError::Validation(
                "cannot generate a scene from zero surfaces".into(),
            ));
        }
        if !(MIN_ROTATION_SPEED..=MAX_ROTATION_SPEED).contains(&rotation_speed) {
            return Err(MultiViewError::InvalidParameter(format!(
                "rotation speed {} outside [{}, {}]",
                rotation_speed, MIN_ROTATION_SPEED, MAX_ROTATION_SPEED
            )));
        }

        let placements = compute_placements(texture_refs.len(), mode);
        let size = mode.surface_size();
        let surfaces = texture_refs
            .into_iter()
            .zip(placements)
            .map(|(texture, p)| SurfaceSpec {
                texture,
                position: p.position.to_array(),
                rotation: p.rotation.to_array(),
                size,
            })
            .collect();

        Ok(Self {
            surfaces,
            mode: mode.as_str().to_string(),
            rotation_speed,
            auto_rotate,
        })
    }
}

/// 把场景描述渲染为独立 HTML 文档。纯函数，无 I/O。
pub fn render_document(spec: &SceneSpec) -> String {
    let labels = ControlLabels {
        pause: i18n::tr("html.btn.pause"),
        resume: i18n::tr("html.btn.resume"),
    };
    let toggle_label = if spec.auto_rotate {
        &labels.pause
    } else {
        &labels.resume
    };

    // serde_json 不会失败：SceneSpec 里只有字符串、数值与布尔
    let scene_json = serde_json::to_string(spec).unwrap_or_else(|_| "{}".into());
    let labels_json = serde_json::to_string(&labels).unwrap_or_else(|_| "{}".into());

    TEMPLATE
        .replace("{{LANG}}", &i18n::lang())
        .replace("{{TITLE}}", &escape_html(&i18n::tr("html.title")))
        .replace("{{HEADING}}", &escape_html(&i18n::tr("html.heading")))
        .replace("{{HINT}}", &escape_html(&i18n::tr("html.hint")))
        .replace("{{TOGGLE_LABEL}}", &escape_html(toggle_label))
        .replace("{{RESET_LABEL}}", &escape_html(&i18n::tr("html.btn.reset")))
        .replace("{{SCENE_JSON}}", &scene_json)
        .replace("{{LABELS_JSON}}", &labels_json)
}

/// 校验 + 装配 + 渲染，一步到位。
pub fn generate(
    texture_refs: Vec<String>,
    mode: LayoutMode,
    rotation_speed: f32,
    auto_rotate: bool,
) -> Result<String> {
    let spec = SceneSpec::new(texture_refs, mode, rotation_speed, auto_rotate)?;
    Ok(render_document(&spec))
}

/// 持久化包装：补全 `.html` 后缀并写入输出目录，返回完整路径。
pub fn save_document(output_dir: &Path, filename: &str, html: &str) -> Result<PathBuf> {
    let filename = if filename.ends_with(".html") {
        filename.to_string()
    } else {
        format!("{}.html", filename)
    };
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);
    std::fs::write(&path, html)?;
    Ok(path)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_bundle_is_rejected_for_every_mode() {
        for mode in [LayoutMode::Ring, LayoutMode::Sphere, LayoutMode::Cube] {
            assert!(matches!(
                generate(vec![], mode, 1.0, true),
                Err(MultiViewError::Validation(_))
            ));
        }
    }

    #[test]
    fn rotation_speed_bounds_are_enforced() {
        let one = refs(&["a.png"]);
        assert!(matches!(
            generate(one.clone(), LayoutMode::Ring, 0.05, true),
            Err(MultiViewError::InvalidParameter(_))
        ));
        assert!(matches!(
            generate(one.clone(), LayoutMode::Ring, 5.5, true),
            Err(MultiViewError::InvalidParameter(_))
        ));
        // 边界值本身可用
        assert!(generate(one.clone(), LayoutMode::Ring, 0.1, true).is_ok());
        assert!(generate(one, LayoutMode::Ring, 5.0, false).is_ok());
    }

    #[test]
    fn surface_order_matches_input_order() {
        let spec = SceneSpec::new(
            refs(&["a.png", "b.png", "c.png", "d.png"]),
            LayoutMode::Ring,
            1.0,
            true,
        )
        .unwrap();
        let order: Vec<&str> = spec.surfaces.iter().map(|s| s.texture.as_str()).collect();
        assert_eq!(order, vec!["a.png", "b.png", "c.png", "d.png"]);

        // 渲染结果中引用以同样顺序出现
        let html = render_document(&spec);
        let positions: Vec<usize> = ["a.png", "b.png", "c.png", "d.png"]
            .iter()
            .map(|r| html.find(r).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn cube_scene_assigns_fixed_slots() {
        let spec = SceneSpec::new(
            refs(&["0.png", "1.png", "2.png", "3.png", "4.png", "5.png"]),
            LayoutMode::Cube,
            1.0,
            true,
        )
        .unwrap();
        assert_eq!(spec.surfaces.len(), 6);
        // 正面
        assert_eq!(spec.surfaces[0].position, [0.0, 0.0, 2.0]);
        assert_eq!(spec.surfaces[0].rotation, [0.0, 0.0, 0.0]);
        // 顶面
        assert_eq!(spec.surfaces[4].position, [0.0, 2.0, 0.0]);
        assert!((spec.surfaces[4].rotation[0] + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(spec.surfaces[4].rotation[1], 0.0);
        assert_eq!(spec.mode, "cube");
    }

    #[test]
    fn cube_scene_truncates_extra_refs() {
        let names: Vec<String> = (0..9).map(|i| format!("{}.png", i)).collect();
        let spec = SceneSpec::new(names, LayoutMode::Cube, 1.0, false).unwrap();
        assert_eq!(spec.surfaces.len(), 6);
    }

    #[test]
    fn document_embeds_literal_parameters() {
        let html = generate(refs(&["x.png"]), LayoutMode::Sphere, 2.5, true).unwrap();
        assert!(html.contains("\"mode\":\"sphere\""));
        assert!(html.contains("\"rotationSpeed\":2.5"));
        assert!(html.contains("\"autoRotate\":true"));
        assert!(html.contains("x.png"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn save_document_enforces_html_suffix() {
        let dir = std::env::temp_dir().join(format!("multiview3d-doc-{}", std::process::id()));
        let path = save_document(&dir, "preview", "<html></html>").unwrap();
        assert!(path.to_string_lossy().ends_with("preview.html"));
        assert!(path.exists());

        let path2 = save_document(&dir, "already.html", "<html></html>").unwrap();
        assert!(path2.to_string_lossy().ends_with("already.html"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
