/// Per-frame scene and viewer state
use nalgebra::{Point3, Vector3};

/// Model rotation about the X and Y axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelRotation {
    pub x: f32,
    pub y: f32,
}

impl ModelRotation {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

/// Which projection an update builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Fixed overhead camera with a display-derived perspective frustum
    TopView,
    Perspective,
    Orthographic,
}

/// Everything the camera transform reads each frame.
///
/// Produced by whatever drives the scene (keyboard controller, animation,
/// head tracker) and handed to [`crate::CameraTransform::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub model_translation: Vector3<f32>,
    pub model_rotation: ModelRotation,
    pub viewer_position: Point3<f32>,
    pub viewer_target: Point3<f32>,
    pub clip_near: f32,
    pub clip_far: f32,
    pub top_view: bool,
    pub perspective_mat: bool,
}

impl FrameState {
    /// Resolve the two mode flags. The top view takes precedence.
    pub fn projection_mode(&self) -> ProjectionMode {
        if self.top_view {
            ProjectionMode::TopView
        } else if self.perspective_mat {
            ProjectionMode::Perspective
        } else {
            ProjectionMode::Orthographic
        }
    }

    pub fn translate_model(&mut self, dx: f32, dy: f32, dz: f32) {
        self.model_translation += Vector3::new(dx, dy, dz);
    }

    /// Move the viewer without changing where it looks
    pub fn move_viewer(&mut self, dx: f32, dy: f32, dz: f32) {
        self.viewer_position += Vector3::new(dx, dy, dz);
    }

    /// Shift both clip planes, keeping near positive and below far
    pub fn adjust_clip(&mut self, d_near: f32, d_far: f32) {
        let near = (self.clip_near + d_near).max(f32::EPSILON);
        let far = self.clip_far + d_far;
        if far > near {
            self.clip_near = near;
            self.clip_far = far;
        }
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            model_translation: Vector3::zeros(),
            model_rotation: ModelRotation::default(),
            viewer_position: Point3::new(0.0, 0.0, 800.0),
            viewer_target: Point3::origin(),
            clip_near: 1.0,
            clip_far: 10000.0,
            top_view: false,
            perspective_mat: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_rotation() {
        let mut rotation = ModelRotation::default();
        assert_eq!(rotation.x, 0.0);
        assert_eq!(rotation.y, 0.0);

        rotation.rotate(0.1, 0.2);
        assert!((rotation.x - 0.1).abs() < 1e-6);
        assert!((rotation.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_projection_mode_precedence() {
        let mut state = FrameState::default();
        assert_eq!(state.projection_mode(), ProjectionMode::Perspective);

        state.perspective_mat = false;
        assert_eq!(state.projection_mode(), ProjectionMode::Orthographic);

        state.top_view = true;
        assert_eq!(state.projection_mode(), ProjectionMode::TopView);
        state.perspective_mat = true;
        assert_eq!(state.projection_mode(), ProjectionMode::TopView);
    }

    #[test]
    fn test_adjust_clip_keeps_order() {
        let mut state = FrameState::default();
        state.adjust_clip(5.0, -100.0);
        assert_eq!(state.clip_near, 6.0);
        assert_eq!(state.clip_far, 9900.0);

        // Would cross the far plane, ignored
        state.adjust_clip(20000.0, 0.0);
        assert_eq!(state.clip_near, 6.0);

        state.adjust_clip(-100.0, 0.0);
        assert!(state.clip_near > 0.0);
    }
}
