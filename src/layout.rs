// layout.rs — 三种布局模式的纯几何计算
// 与渲染完全解耦：输入数量与模式，输出每个平面的位置与朝向。

use glam::Vec3;
use std::f32::consts::PI;
use std::str::FromStr;

/// 环形 / 球形布局的半径（世界单位）。
pub const LAYOUT_RADIUS: f32 = 3.0;
/// 立方体布局的半边长。
pub const CUBE_HALF_EXTENT: f32 = 2.0;
/// 环形与立方体平面边长。
pub const SURFACE_SIZE: f32 = 2.0;
/// 球形平面边长（较小，减少相邻平面重叠）。
pub const SPHERE_SURFACE_SIZE: f32 = 1.5;
/// 立方体只有 6 个物理插槽。
pub const CUBE_SLOTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// 水平圆环排列（又名 carousel）。
    Ring,
    /// 球面螺旋排列。
    Sphere,
    /// 立方体六面排列，多余的面被截断。
    Cube,
}

impl LayoutMode {
    /// 写入生成文档的字面模式标签。
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Ring => "ring",
            LayoutMode::Sphere => "sphere",
            LayoutMode::Cube => "cube",
        }
    }

    /// 该模式下平面的边长。
    pub fn surface_size(&self) -> f32 {
        match self {
            LayoutMode::Sphere => SPHERE_SURFACE_SIZE,
            _ => SURFACE_SIZE,
        }
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ring" | "carousel" => Ok(LayoutMode::Ring),
            "sphere" => Ok(LayoutMode::Sphere),
            "cube" => Ok(LayoutMode::Cube),
            other => Err(format!("unknown layout mode: {}", other)),
        }
    }
}

/// 一个平面的空间放置：位置 + 欧拉角（弧度，按 Y-X-Z 顺序应用）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// 立方体六面固定插槽：前、后、左、右、上、下。
const CUBE_FACES: [([f32; 3], [f32; 3]); CUBE_SLOTS] = [
    ([0.0, 0.0, CUBE_HALF_EXTENT], [0.0, 0.0, 0.0]),
    ([0.0, 0.0, -CUBE_HALF_EXTENT], [0.0, PI, 0.0]),
    ([-CUBE_HALF_EXTENT, 0.0, 0.0], [0.0, -PI / 2.0, 0.0]),
    ([CUBE_HALF_EXTENT, 0.0, 0.0], [0.0, PI / 2.0, 0.0]),
    ([0.0, CUBE_HALF_EXTENT, 0.0], [-PI / 2.0, 0.0, 0.0]),
    ([0.0, -CUBE_HALF_EXTENT, 0.0], [PI / 2.0, 0.0, 0.0]),
];

/// 计算 N 个平面在给定模式下的放置。确定性纯函数。
///
/// 立方体模式最多返回 6 个放置，多余的输入会记录警告后丢弃。
pub fn compute_placements(surface_count: usize, mode: LayoutMode) -> Vec<Placement> {
    match mode {
        LayoutMode::Ring => ring_placements(surface_count),
        LayoutMode::Sphere => sphere_placements(surface_count),
        LayoutMode::Cube => cube_placements(surface_count),
    }
}

fn ring_placements(n: usize) -> Vec<Placement> {
    (0..n)
        .map(|i| {
            let angle = (i as f32 / n as f32) * 2.0 * PI;
            Placement {
                position: Vec3::new(
                    LAYOUT_RADIUS * angle.cos(),
                    0.0,
                    LAYOUT_RADIUS * angle.sin(),
                ),
                rotation: Vec3::new(0.0, -angle, 0.0),
            }
        })
        .collect()
}

fn sphere_placements(n: usize) -> Vec<Placement> {
    (0..n)
        .map(|i| {
            // 球面螺旋参数化：phi 沿极轴均分，theta 按 sqrt(N·π) 累积展开
            let phi = (-1.0 + 2.0 * i as f32 / n as f32).acos();
            let theta = (n as f32 * PI).sqrt() * phi;

            let dir = Vec3::new(
                theta.cos() * phi.sin(),
                theta.sin() * phi.sin(),
                phi.cos(),
            );
            Placement {
                position: LAYOUT_RADIUS * dir,
                rotation: outward_rotation(dir),
            }
        })
        .collect()
}

/// 使平面法线（局部 +Z）指向 dir 的 Y-X-Z 欧拉角，面朝球外。
fn outward_rotation(dir: Vec3) -> Vec3 {
    let rx = (-dir.y).clamp(-1.0, 1.0).asin();
    let ry = dir.x.atan2(dir.z);
    Vec3::new(rx, ry, 0.0)
}

fn cube_placements(n: usize) -> Vec<Placement> {
    if n > CUBE_SLOTS {
        log::warn!(
            "cube layout has {} slots, ignoring {} extra surface(s)",
            CUBE_SLOTS,
            n - CUBE_SLOTS
        );
    }
    CUBE_FACES
        .iter()
        .take(n)
        .map(|&(pos, rot)| Placement {
            position: Vec3::from_array(pos),
            rotation: Vec3::from_array(rot),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn ring_places_all_on_circle_with_even_spacing() {
        for n in [1usize, 2, 3, 7, 12] {
            let placements = compute_placements(n, LayoutMode::Ring);
            assert_eq!(placements.len(), n);
            for (i, p) in placements.iter().enumerate() {
                assert!((p.position.length() - LAYOUT_RADIUS).abs() < EPS);
                assert!(p.position.y.abs() < EPS);
                let expected = (i as f32 / n as f32) * 2.0 * PI;
                assert!((p.rotation.y + expected).abs() < EPS);
            }
        }
    }

    #[test]
    fn ring_of_three_sits_at_thirds() {
        let placements = compute_placements(3, LayoutMode::Ring);
        let angles: Vec<f32> = placements
            .iter()
            .map(|p| p.position.z.atan2(p.position.x).rem_euclid(2.0 * PI))
            .collect();
        assert!((angles[0] - 0.0).abs() < EPS);
        assert!((angles[1] - 2.0 * PI / 3.0).abs() < 1e-4);
        assert!((angles[2] - 4.0 * PI / 3.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_keeps_radius_for_all_counts() {
        for n in [1usize, 2, 5, 20] {
            let placements = compute_placements(n, LayoutMode::Sphere);
            assert_eq!(placements.len(), n);
            for p in &placements {
                assert!((p.position.length() - LAYOUT_RADIUS).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn sphere_single_surface_is_deterministic() {
        // N=1 时 phi = acos(-1) = π，落在 -Z 极点
        let a = compute_placements(1, LayoutMode::Sphere);
        let b = compute_placements(1, LayoutMode::Sphere);
        assert_eq!(a, b);
        assert!((a[0].position.z + LAYOUT_RADIUS).abs() < 1e-3);
    }

    #[test]
    fn sphere_rotation_faces_outward() {
        for p in compute_placements(9, LayoutMode::Sphere) {
            let dir = p.position.normalize();
            // 重建法线：Ry(ry)·Rx(rx)·ẑ
            let (rx, ry) = (p.rotation.x, p.rotation.y);
            let normal = Vec3::new(
                ry.sin() * rx.cos(),
                -rx.sin(),
                ry.cos() * rx.cos(),
            );
            assert!(normal.dot(dir) > 0.999, "normal {:?} vs dir {:?}", normal, dir);
        }
    }

    #[test]
    fn cube_truncates_beyond_six_slots() {
        for (n, expected) in [(1usize, 1usize), (4, 4), (6, 6), (9, 6)] {
            assert_eq!(compute_placements(n, LayoutMode::Cube).len(), expected);
        }
    }

    #[test]
    fn cube_slot_table_matches_faces() {
        let placements = compute_placements(6, LayoutMode::Cube);
        // 前
        assert_eq!(placements[0].position, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(placements[0].rotation, Vec3::ZERO);
        // 上
        assert_eq!(placements[4].position, Vec3::new(0.0, 2.0, 0.0));
        assert!((placements[4].rotation.x + PI / 2.0).abs() < EPS);
        assert_eq!(placements[4].rotation.y, 0.0);
        // 下
        assert_eq!(placements[5].position, Vec3::new(0.0, -2.0, 0.0));
        assert!((placements[5].rotation.x - PI / 2.0).abs() < EPS);
    }

    #[test]
    fn mode_tags_parse_and_print() {
        assert_eq!("ring".parse::<LayoutMode>().unwrap(), LayoutMode::Ring);
        assert_eq!("carousel".parse::<LayoutMode>().unwrap(), LayoutMode::Ring);
        assert_eq!("sphere".parse::<LayoutMode>().unwrap(), LayoutMode::Sphere);
        assert_eq!("cube".parse::<LayoutMode>().unwrap(), LayoutMode::Cube);
        assert!("dome".parse::<LayoutMode>().is_err());
        assert_eq!(LayoutMode::Ring.as_str(), "ring");
    }
}
