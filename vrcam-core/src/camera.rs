/// Per-frame camera transform: owns the model, view and projection matrices
use nalgebra::{Matrix4, Point3};

use crate::display::DisplayParameters;
use crate::error::TransformError;
use crate::state::{FrameState, ProjectionMode};
use crate::transform::{compute_model_transform, compute_view_transform, FrustumBounds};

/// Distance of the overhead camera above the scene
pub const TOP_VIEW_HEIGHT: f32 = 1500.0;
/// Near plane of the top-view projection, independent of the frame state
pub const TOP_VIEW_NEAR: f32 = 1.0;
/// Far plane of the top-view projection, independent of the frame state
pub const TOP_VIEW_FAR: f32 = 10000.0;

/// Overhead view: world Y becomes the camera's -Z axis, camera 1500 units up
pub fn top_view_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, -1.0, 0.0,
        0.0, 1.0, 0.0, -TOP_VIEW_HEIGHT,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Holds the three matrices a renderer binds as uniforms.
///
/// Call [`CameraTransform::update`] once per frame before reading the
/// matrices. A rejected frame leaves the previous matrices in place, so a
/// renderer can keep drawing the last good frame. Until the first successful
/// update all three are identity.
#[derive(Debug, Clone)]
pub struct CameraTransform {
    display: DisplayParameters,
    model: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    frame_count: u64,
    last_mode: Option<ProjectionMode>,
}

impl CameraTransform {
    pub fn new(display: DisplayParameters) -> Self {
        Self {
            display,
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            frame_count: 0,
            last_mode: None,
        }
    }

    /// Recompute all three matrices from `state`.
    ///
    /// Either every matrix is replaced or none is.
    pub fn update(&mut self, state: &FrameState) -> Result<(), TransformError> {
        let mode = state.projection_mode();
        let (model, view, projection) = match self.compute(state, mode) {
            Ok(matrices) => matrices,
            Err(err) => {
                log::warn!("keeping previous frame, {:?} update rejected: {}", mode, err);
                return Err(err);
            }
        };

        if self.last_mode != Some(mode) {
            log::debug!("projection mode switched to {:?}", mode);
            self.last_mode = Some(mode);
        }

        self.model = model;
        self.view = view;
        self.projection = projection;
        self.frame_count += 1;
        log::trace!("frame {} updated in {:?} mode", self.frame_count, mode);
        Ok(())
    }

    fn compute(
        &self,
        state: &FrameState,
        mode: ProjectionMode,
    ) -> Result<(Matrix4<f32>, Matrix4<f32>, Matrix4<f32>), TransformError> {
        let model = compute_model_transform(state);

        let (view, projection) = match mode {
            ProjectionMode::TopView => {
                // Extents follow the state's near plane, the planes themselves are fixed
                let mut bounds =
                    FrustumBounds::from_display(&self.display, state.clip_near, TOP_VIEW_FAR, true);
                bounds.near = TOP_VIEW_NEAR;
                (top_view_matrix(), bounds.perspective()?)
            }
            ProjectionMode::Perspective => {
                let view = compute_view_transform(state)?;
                let bounds =
                    FrustumBounds::from_display(&self.display, state.clip_near, state.clip_far, true);
                (view, bounds.perspective()?)
            }
            ProjectionMode::Orthographic => {
                let view = compute_view_transform(state)?;
                let bounds =
                    FrustumBounds::from_display(&self.display, state.clip_near, state.clip_far, false);
                (view, bounds.orthographic()?)
            }
        };

        Ok((model, view, projection))
    }

    pub fn model(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn model_view(&self) -> Matrix4<f32> {
        self.view * self.model
    }

    pub fn model_view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view * self.model
    }

    pub fn display(&self) -> &DisplayParameters {
        &self.display
    }

    /// Number of successful updates so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Project a model-space point to a `width` x `height` pixel grid.
    ///
    /// Returns `(x, y, ndc_depth)` with y growing downwards, or `None` when
    /// the point is behind the eye or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = self.model_view_projection() * point.to_homogeneous();

        // Behind or on the eye plane
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|v| v.abs() > 1.0) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ModelRotation;
    use nalgebra::Vector3;

    const EPS: f32 = 1e-4;

    fn scenario_display() -> DisplayParameters {
        DisplayParameters::new(1000.0, 800.0, 0.3, 600.0).unwrap()
    }

    fn scenario_state() -> FrameState {
        FrameState {
            viewer_position: Point3::new(0.0, 0.0, 500.0),
            viewer_target: Point3::origin(),
            clip_near: 10.0,
            clip_far: 1000.0,
            perspective_mat: true,
            top_view: false,
            ..FrameState::default()
        }
    }

    #[test]
    fn test_identity_before_first_update() {
        let camera = CameraTransform::new(scenario_display());
        assert_eq!(*camera.model(), Matrix4::identity());
        assert_eq!(*camera.view(), Matrix4::identity());
        assert_eq!(*camera.projection(), Matrix4::identity());
        assert_eq!(camera.frame_count(), 0);
    }

    #[test]
    fn test_perspective_scenario() {
        let mut camera = CameraTransform::new(scenario_display());
        camera.update(&scenario_state()).unwrap();

        let expected_view = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -500.0));
        assert!((camera.view() - expected_view).norm() < EPS);

        // right = 1000 * 0.3 / 2 * 10 / 600 = 2.5, so 2n / (r - l) = 4
        assert!((camera.projection()[(0, 0)] - 4.0).abs() < EPS);
        // top = 800 * 0.3 / 2 * 10 / 600 = 2.0
        assert!((camera.projection()[(1, 1)] - 5.0).abs() < EPS);
        assert!((camera.projection()[(3, 2)] + 1.0).abs() < EPS);
        assert_eq!(camera.frame_count(), 1);
    }

    #[test]
    fn test_orthographic_uses_full_screen_extents() {
        let mut camera = CameraTransform::new(scenario_display());
        let state = FrameState {
            perspective_mat: false,
            ..scenario_state()
        };
        camera.update(&state).unwrap();

        let p = camera.projection();
        assert!((p[(0, 0)] - 2.0 / 300.0).abs() < EPS);
        assert!((p[(1, 1)] - 2.0 / 240.0).abs() < EPS);
        assert!((p[(2, 2)] + 2.0 / 990.0).abs() < EPS);
        assert_eq!(p[(3, 3)], 1.0);
    }

    #[test]
    fn test_top_view_ignores_viewer_and_clip_planes() {
        let mut camera = CameraTransform::new(scenario_display());
        let mut state = FrameState {
            top_view: true,
            ..scenario_state()
        };
        camera.update(&state).unwrap();
        let first_view = *camera.view();
        assert_eq!(first_view, top_view_matrix());

        state.viewer_position = Point3::new(-40.0, 300.0, 12.0);
        state.viewer_target = Point3::new(5.0, 5.0, 5.0);
        state.model_rotation = ModelRotation::new(1.0, 2.0);
        state.clip_far = 50.0;
        camera.update(&state).unwrap();
        assert_eq!(*camera.view(), first_view);

        // near = 1, far = 10000 regardless of the state's planes
        let p = camera.projection();
        let (n, f) = (TOP_VIEW_NEAR, TOP_VIEW_FAR);
        assert!((p[(2, 2)] + (f + n) / (f - n)).abs() < EPS);
        assert!((p[(2, 3)] + 2.0 * f * n / (f - n)).abs() < 1e-2);
        // Extents still scale with the state's near plane: 2 * 1 / (2 * 2.5)
        assert!((p[(0, 0)] - 0.4).abs() < EPS);
    }

    #[test]
    fn test_top_view_accepts_degenerate_viewer() {
        let mut camera = CameraTransform::new(scenario_display());
        let state = FrameState {
            top_view: true,
            viewer_position: Point3::origin(),
            viewer_target: Point3::origin(),
            ..scenario_state()
        };
        assert!(camera.update(&state).is_ok());
    }

    #[test]
    fn test_failed_update_keeps_last_good_frame() {
        let mut camera = CameraTransform::new(scenario_display());
        camera.update(&scenario_state()).unwrap();
        let (model, view, projection) = (*camera.model(), *camera.view(), *camera.projection());

        let mut bad = scenario_state();
        bad.model_translation = Vector3::new(10.0, 0.0, 0.0);
        bad.viewer_target = bad.viewer_position;
        let result = camera.update(&bad);
        assert!(matches!(
            result,
            Err(TransformError::InvalidViewConfiguration { .. })
        ));
        assert_eq!(*camera.model(), model);
        assert_eq!(*camera.view(), view);
        assert_eq!(*camera.projection(), projection);

        let mut flat = scenario_state();
        flat.clip_far = flat.clip_near;
        assert!(matches!(
            camera.update(&flat),
            Err(TransformError::InvalidFrustumBounds { .. })
        ));
        assert_eq!(*camera.projection(), projection);
        assert_eq!(camera.frame_count(), 1);
    }

    #[test]
    fn test_project_to_screen() {
        let mut camera = CameraTransform::new(scenario_display());
        camera.update(&scenario_state()).unwrap();

        let (x, y, _) = camera
            .project_to_screen(&Point3::origin(), 200, 100)
            .unwrap();
        assert!((x - 100.0).abs() < EPS);
        assert!((y - 50.0).abs() < EPS);

        // Behind the viewer
        assert!(camera
            .project_to_screen(&Point3::new(0.0, 0.0, 600.0), 200, 100)
            .is_none());
        // Far outside the frustum
        assert!(camera
            .project_to_screen(&Point3::new(10000.0, 0.0, 0.0), 200, 100)
            .is_none());
    }
}
