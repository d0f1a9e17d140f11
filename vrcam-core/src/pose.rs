//! Device pose from lighthouse sweep timings.
//!
//! A base station sweeps a horizontal and a vertical laser plane across the
//! room at 60 Hz. Four photodiodes on a planar device record when each sweep
//! hits them; the timings give normalized 2D image coordinates, and the
//! homography between the photodiode plane and those coordinates yields the
//! device rotation and position relative to the base station.

use nalgebra::{Point2, Rotation3, SMatrix, SVector, UnitQuaternion, Vector3};

use crate::error::PoseError;

/// Default tick rate of the sweep timer
pub const DEFAULT_CLOCKS_PER_SECOND: f64 = 48_000_000.0;

/// Sweep rotation frequency in Hz
const SWEEP_RATE: f64 = 60.0;

pub type HomographySystem = (SMatrix<f64, 8, 8>, SVector<f64, 8>);

/// Photodiode positions on the device plane (z = 0), in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotodiodeLayout {
    pub positions: [Point2<f64>; 4],
}

impl Default for PhotodiodeLayout {
    fn default() -> Self {
        Self {
            positions: [
                Point2::new(-42.0, 25.0),
                Point2::new(42.0, 25.0),
                Point2::new(42.0, -25.0),
                Point2::new(-42.0, -25.0),
            ],
        }
    }
}

/// Rotation and translation of the device in base-station coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rotation: Rotation3<f64>,
    pub position: Vector3<f64>,
}

impl Pose {
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_rotation_matrix(&self.rotation)
    }
}

/// Convert per-photodiode sweep timings to normalized image coordinates.
///
/// Ticks come in `(horizontal, vertical)` pairs per photodiode. The output
/// has the same interleaved layout.
pub fn ticks_to_normalized(ticks: &[u32; 8], clocks_per_second: f64) -> [f64; 8] {
    let mut out = [0.0; 8];
    for (i, (&tick, slot)) in ticks.iter().zip(out.iter_mut()).enumerate() {
        let dt = tick as f64 / clocks_per_second;
        let sweep = dt * SWEEP_RATE * 360.0;
        let alpha = if i % 2 == 0 { 90.0 - sweep } else { sweep - 90.0 };
        *slot = alpha.to_radians().tan();
    }
    out
}

/// Linear system `A h = b` for the eight unknown homography entries
pub fn homography_system(pos2d: &[f64; 8], layout: &PhotodiodeLayout) -> HomographySystem {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let b = SVector::<f64, 8>::from_column_slice(pos2d);

    for (i, reference) in layout.positions.iter().enumerate() {
        let (x, y) = (reference.x, reference.y);
        let (u, v) = (pos2d[2 * i], pos2d[2 * i + 1]);

        let row_u = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
        let row_v = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
        for col in 0..8 {
            a[(2 * i, col)] = row_u[col];
            a[(2 * i + 1, col)] = row_v[col];
        }
    }

    (a, b)
}

pub fn solve_homography(
    a: SMatrix<f64, 8, 8>,
    b: &SVector<f64, 8>,
) -> Result<SVector<f64, 8>, PoseError> {
    let h = a.lu().solve(b).ok_or(PoseError::SingularHomography)?;
    if h.iter().all(|v| v.is_finite()) {
        Ok(h)
    } else {
        Err(PoseError::SingularHomography)
    }
}

/// Recover rotation and translation from the normalized homography.
///
/// The camera looks down -Z, so the third homography row carries the negated
/// third rotation row and the device always sits at negative Z.
pub fn pose_from_homography(h: &SVector<f64, 8>) -> Pose {
    let col1 = Vector3::new(h[0], h[3], -h[6]);
    let col2 = Vector3::new(h[1], h[4], -h[7]);
    let scale = 2.0 / (col1.norm() + col2.norm());

    let r1 = col1.normalize();
    let r2 = (col2 - r1 * r1.dot(&col2)).normalize();
    let r3 = r1.cross(&r2);

    let matrix = nalgebra::Matrix3::from_columns(&[r1, r2, r3]);
    Pose {
        rotation: Rotation3::from_matrix_unchecked(matrix),
        position: Vector3::new(scale * h[2], scale * h[5], -scale),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoseEstimator {
    pub layout: PhotodiodeLayout,
    pub clocks_per_second: f64,
}

impl Default for PoseEstimator {
    fn default() -> Self {
        Self {
            layout: PhotodiodeLayout::default(),
            clocks_per_second: DEFAULT_CLOCKS_PER_SECOND,
        }
    }
}

impl PoseEstimator {
    pub fn estimate(&self, ticks: &[u32; 8]) -> Result<Pose, PoseError> {
        let pos2d = ticks_to_normalized(ticks, self.clocks_per_second);
        self.estimate_from_normalized(&pos2d)
    }

    pub fn estimate_from_normalized(&self, pos2d: &[f64; 8]) -> Result<Pose, PoseError> {
        let (a, b) = homography_system(pos2d, &self.layout);
        let h = solve_homography(a, &b)?;
        let pose = pose_from_homography(&h);
        log::trace!("estimated device position {:?}", pose.position);
        Ok(pose)
    }
}
