/// VRCAM Core Library - Camera transforms and head tracking math
///
/// This library provides the stateless core of a stereo/VR rendering
/// pipeline: model/view/projection matrix construction driven by a per-frame
/// state and the physical display, plus IMU orientation tracking and
/// lighthouse pose estimation.

pub mod camera;
pub mod display;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod pose;
pub mod state;
pub mod transform;

// Re-export commonly used types
pub use camera::CameraTransform;
pub use display::DisplayParameters;
pub use error::{ConfigError, PoseError, TransformError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use orientation::{ImuCalibration, ImuSample, OrientationTracker};
pub use pose::{Pose, PoseEstimator};
pub use state::{FrameState, ModelRotation, ProjectionMode};
pub use transform::{
    compute_model_transform, compute_orthographic_transform, compute_perspective_transform,
    compute_view_transform, FrustumBounds,
};
