/// Model, view and projection matrix construction
///
/// All matrices use the column-vector convention (`m * p`) and an OpenGL
/// style clip space: the camera looks down -Z and NDC depth spans [-1, 1].
use nalgebra::{Matrix4, Vector3};

use crate::display::DisplayParameters;
use crate::error::TransformError;
use crate::state::FrameState;

/// Squared-length threshold below which a basis vector is considered degenerate
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Frustum planes, with left/right/top/bottom measured on the near plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumBounds {
    /// Bounds centered on the view axis
    pub fn symmetric(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
            near,
            far,
        }
    }

    /// Bounds matching the physical screen.
    ///
    /// With `scale_to_near` the screen half size is projected onto the near
    /// plane through the eye (`near / distance_screen_viewer`), which is what a
    /// perspective frustum needs. Without it the full physical half size is
    /// used, as for an orthographic box.
    pub fn from_display(
        display: &DisplayParameters,
        near: f32,
        far: f32,
        scale_to_near: bool,
    ) -> Self {
        let scale = if scale_to_near {
            near / display.distance_screen_viewer
        } else {
            1.0
        };
        Self::symmetric(
            display.half_width_mm() * scale,
            display.half_height_mm() * scale,
            near,
            far,
        )
    }

    pub fn perspective(&self) -> Result<Matrix4<f32>, TransformError> {
        compute_perspective_transform(
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.near,
            self.far,
        )
    }

    pub fn orthographic(&self) -> Result<Matrix4<f32>, TransformError> {
        compute_orthographic_transform(
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.near,
            self.far,
        )
    }
}

/// Model matrix `T * Rx * Ry`: rotate about Y, then X, then translate
pub fn compute_model_transform(state: &FrameState) -> Matrix4<f32> {
    let translation = Matrix4::new_translation(&state.model_translation);
    let rx = Matrix4::new_rotation(Vector3::new(state.model_rotation.x, 0.0, 0.0));
    let ry = Matrix4::new_rotation(Vector3::new(0.0, state.model_rotation.y, 0.0));

    translation * rx * ry
}

/// World to camera transform built from the viewer position and target with a
/// fixed +Y world up.
pub fn compute_view_transform(state: &FrameState) -> Result<Matrix4<f32>, TransformError> {
    let eye = state.viewer_position.coords;
    let offset = eye - state.viewer_target.coords;

    if !offset.iter().all(|v| v.is_finite()) {
        return Err(TransformError::InvalidViewConfiguration {
            reason: "viewer position or target is not finite",
        });
    }
    if offset.norm_squared() < DEGENERATE_EPSILON {
        return Err(TransformError::InvalidViewConfiguration {
            reason: "viewer position coincides with target",
        });
    }

    let zc = offset.normalize();
    let up = Vector3::y();
    let x_raw = up.cross(&zc);
    if x_raw.norm_squared() < DEGENERATE_EPSILON {
        return Err(TransformError::InvalidViewConfiguration {
            reason: "viewing direction is parallel to world up",
        });
    }
    let xc = x_raw.normalize();
    // Unit length already: zc and xc are orthonormal
    let yc = zc.cross(&xc);

    Ok(Matrix4::new(
        xc.x, xc.y, xc.z, -xc.dot(&eye),
        yc.x, yc.y, yc.z, -yc.dot(&eye),
        zc.x, zc.y, zc.z, -zc.dot(&eye),
        0.0, 0.0, 0.0, 1.0,
    ))
}

/// Off-axis perspective projection from near-plane bounds
pub fn compute_perspective_transform(
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
) -> Result<Matrix4<f32>, TransformError> {
    check_bounds(left, right, top, bottom, near, far, true)?;

    let (l, r, t, b, n, f) = (left, right, top, bottom, near, far);
    Ok(Matrix4::new(
        2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
        0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
        0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
        0.0, 0.0, -1.0, 0.0,
    ))
}

/// Orthographic projection of the box `[l, r] x [b, t] x [-n, -f]`
pub fn compute_orthographic_transform(
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
) -> Result<Matrix4<f32>, TransformError> {
    check_bounds(left, right, top, bottom, near, far, false)?;

    let (l, r, t, b, n, f) = (left, right, top, bottom, near, far);
    Ok(Matrix4::new(
        2.0 / (r - l), 0.0, 0.0, -(r + l) / (r - l),
        0.0, 2.0 / (t - b), 0.0, -(t + b) / (t - b),
        0.0, 0.0, -2.0 / (f - n), -(f + n) / (f - n),
        0.0, 0.0, 0.0, 1.0,
    ))
}

fn check_bounds(
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
    require_positive_near: bool,
) -> Result<(), TransformError> {
    let all_finite = [left, right, top, bottom, near, far]
        .iter()
        .all(|v| v.is_finite());
    let degenerate = right == left || top == bottom || far == near;
    let behind_eye = require_positive_near && near <= 0.0;

    if !all_finite || degenerate || behind_eye {
        return Err(TransformError::InvalidFrustumBounds {
            left,
            right,
            top,
            bottom,
            near,
            far,
        });
    }
    Ok(())
}
