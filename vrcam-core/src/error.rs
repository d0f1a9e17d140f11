/// Error types for the camera core
use thiserror::Error;

/// Precondition violations raised while building per-frame matrices.
///
/// A broken projection or view matrix only shows up as a blank or exploded
/// render, so these are reported at the point of construction instead of
/// letting NaN/Inf leak into the matrices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error(
        "invalid frustum bounds: left={left}, right={right}, top={top}, bottom={bottom}, near={near}, far={far}"
    )]
    InvalidFrustumBounds {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },

    #[error("invalid view configuration: {reason}")]
    InvalidViewConfiguration { reason: &'static str },
}

/// Errors loading or validating session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration file")]
    Io(#[from] std::io::Error),

    #[error("malformed display parameters")]
    Json(#[from] serde_json::Error),

    #[error("display parameter `{field}` must be finite and positive, got {value}")]
    InvalidDisplay { field: &'static str, value: f32 },

    #[error("filter alpha must lie in [0, 1], got {0}")]
    InvalidFilterAlpha(f64),

    #[error("IMU calibration needs at least one sample")]
    EmptyCalibration,
}

/// Errors raised while recovering a device pose from sweep timings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("homography system is singular")]
    SingularHomography,
}
