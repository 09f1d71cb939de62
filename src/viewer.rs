// viewer.rs — 交互状态机：拖拽环绕、自动旋转、重置
// 与渲染后端无关，生成文档里的运行时遵循同一套常量与转移规则。

/// 拖拽灵敏度（弧度 / 像素）。
pub const DRAG_SENSITIVITY: f32 = 0.01;
/// 每帧自动旋转基准步长（弧度），乘以 rotation_speed。
pub const BASE_ROTATE_STEP: f32 = 0.005;
/// 相机初始距离。
pub const CAMERA_DISTANCE: f32 = 5.0;
/// 相机垂直视场角（度）。
pub const CAMERA_FOV_DEG: f32 = 75.0;

/// 预览会话的可变状态。Idle ⇄ Dragging 两态，外加每帧自动旋转。
#[derive(Debug, Clone)]
pub struct ViewerState {
    /// 场景组的累积旋转（绕 X、Y，弧度）。
    pub rot_x: f32,
    pub rot_y: f32,
    pub is_rotating: bool,
    pub camera_distance: f32,
    /// Some 表示拖拽进行中，值为上一次指针位置。
    drag_anchor: Option<(f64, f64)>,
}

impl ViewerState {
    pub fn new(auto_rotate: bool) -> Self {
        Self {
            rot_x: 0.0,
            rot_y: 0.0,
            is_rotating: auto_rotate,
            camera_distance: CAMERA_DISTANCE,
            drag_anchor: None,
        }
    }

    /// 指针按下：进入 Dragging，记录起点。
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.drag_anchor = Some((x, y));
    }

    /// 指针移动：Dragging 中按增量更新旋转并推进锚点，Idle 中忽略。
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.drag_anchor {
            self.rot_y += (x - last_x) as f32 * DRAG_SENSITIVITY;
            self.rot_x += (y - last_y) as f32 * DRAG_SENSITIVITY;
            self.drag_anchor = Some((x, y));
        }
    }

    /// 指针抬起：回到 Idle。
    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
    }

    /// 每帧调用：自动旋转时推进偏航角。
    pub fn tick(&mut self, rotation_speed: f32) {
        if self.is_rotating {
            self.rot_y += BASE_ROTATE_STEP * rotation_speed;
        }
    }

    pub fn toggle_rotation(&mut self) {
        self.is_rotating = !self.is_rotating;
    }

    /// 重置视角：旋转与相机回到初始值，不触碰 is_rotating。
    pub fn reset(&mut self) {
        self.rot_x = 0.0;
        self.rot_y = 0.0;
        self.camera_distance = CAMERA_DISTANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_applies_sensitivity_per_axis() {
        let mut st = ViewerState::new(false);
        st.pointer_down(100.0, 100.0);
        st.pointer_move(110.0, 95.0);
        assert!((st.rot_y - 10.0 * DRAG_SENSITIVITY).abs() < 1e-6);
        assert!((st.rot_x + 5.0 * DRAG_SENSITIVITY).abs() < 1e-6);

        // 锚点已推进：重复同一位置不再累积
        st.pointer_move(110.0, 95.0);
        assert!((st.rot_y - 10.0 * DRAG_SENSITIVITY).abs() < 1e-6);
    }

    #[test]
    fn moves_outside_drag_are_ignored() {
        let mut st = ViewerState::new(false);
        st.pointer_move(50.0, 50.0);
        assert_eq!(st.rot_x, 0.0);
        assert_eq!(st.rot_y, 0.0);

        st.pointer_down(0.0, 0.0);
        st.pointer_up();
        st.pointer_move(50.0, 50.0);
        assert_eq!(st.rot_y, 0.0);
    }

    #[test]
    fn tick_advances_only_while_rotating() {
        let mut st = ViewerState::new(true);
        st.tick(2.0);
        assert!((st.rot_y - BASE_ROTATE_STEP * 2.0).abs() < 1e-6);

        st.toggle_rotation();
        st.tick(2.0);
        assert!((st.rot_y - BASE_ROTATE_STEP * 2.0).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_pose_but_not_rotation_flag() {
        let mut st = ViewerState::new(false);
        st.pointer_down(0.0, 0.0);
        st.pointer_move(30.0, 40.0);
        st.toggle_rotation();
        st.reset();
        assert_eq!(st.rot_x, 0.0);
        assert_eq!(st.rot_y, 0.0);
        assert_eq!(st.camera_distance, CAMERA_DISTANCE);
        assert!(st.is_rotating);
    }

    #[test]
    fn auto_rotate_flag_seeds_initial_state() {
        assert!(ViewerState::new(true).is_rotating);
        assert!(!ViewerState::new(false).is_rotating);
    }
}
