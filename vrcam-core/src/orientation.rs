//! Head orientation from a 6-DOF IMU.
//!
//! Gyro rates are in degrees per second and returned angles are in degrees.
//! The accelerometer only needs a consistent unit since every estimator
//! normalizes it. The device frame is Y-up: a device lying still reads
//! gravity along +Y.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::error::ConfigError;

/// Gyro magnitudes below this are treated as no rotation
const GYRO_EPSILON: f64 = 1e-8;

/// One raw IMU reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    pub gyr: Vector3<f64>,
    pub acc: Vector3<f64>,
}

impl ImuSample {
    pub fn new(gyr: Vector3<f64>, acc: Vector3<f64>) -> Self {
        Self { gyr, acc }
    }
}

/// Sign with zero mapped to zero, unlike `f64::signum`
fn sgn(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Pitch (rotation about X) implied by gravity alone
pub fn acc_pitch(acc: &Vector3<f64>) -> f64 {
    let horizontal = sgn(acc.y) * (acc.x * acc.x + acc.y * acc.y).sqrt();
    -acc.z.atan2(horizontal).to_degrees()
}

/// Roll (rotation about Z) implied by gravity alone
pub fn acc_roll(acc: &Vector3<f64>) -> f64 {
    -(-acc.x).atan2(acc.y).to_degrees()
}

/// Integrate the Z gyro rate for the single-axis case
pub fn flatland_roll_gyr(prev: f64, gyr: &Vector3<f64>, dt: f64) -> f64 {
    prev + gyr.z * dt
}

pub fn flatland_roll_acc(acc: &Vector3<f64>) -> f64 {
    acc.x.atan2(acc.y).to_degrees()
}

/// Blend the integrated gyro roll with the accelerometer roll
pub fn flatland_roll_comp(prev: f64, gyr: &Vector3<f64>, roll_acc: f64, dt: f64, alpha: f64) -> f64 {
    alpha * (prev + gyr.z * dt) + (1.0 - alpha) * roll_acc
}

/// Apply one gyro step in the body frame: `q * delta`
pub fn integrate_gyro(q: &UnitQuaternion<f64>, gyr: &Vector3<f64>, dt: f64) -> UnitQuaternion<f64> {
    let rate = gyr.norm();
    if rate <= GYRO_EPSILON {
        return *q;
    }
    let axis = Unit::new_unchecked(gyr / rate);
    let delta = UnitQuaternion::from_axis_angle(&axis, (rate * dt).to_radians());
    q * delta
}

/// Gyro step followed by a partial tilt correction towards measured gravity.
///
/// `alpha = 1` trusts the gyro only, `alpha = 0` snaps the tilt fully onto
/// the accelerometer. Yaw is never corrected.
pub fn complementary_update(
    q: &UnitQuaternion<f64>,
    gyr: &Vector3<f64>,
    acc: &Vector3<f64>,
    dt: f64,
    alpha: f64,
) -> UnitQuaternion<f64> {
    let current = integrate_gyro(q, gyr, dt);

    // A NaN reading would poison the estimate for good
    if !acc.iter().all(|v| v.is_finite()) {
        return current;
    }
    let Some(up_world) = Unit::try_new(current * acc, f64::EPSILON) else {
        return current;
    };
    let tilt = up_world.y.clamp(-1.0, 1.0).acos();
    // up_world x +Y: rotates the measured up vector onto world up
    let axis = Vector3::new(-up_world.z, 0.0, up_world.x);

    match Unit::try_new(axis, f64::EPSILON) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, (1.0 - alpha) * tilt) * current,
        None => current,
    }
}

/// Per-axis bias and variance measured while the device sits still
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuCalibration {
    pub gyr_bias: Vector3<f64>,
    pub gyr_variance: Vector3<f64>,
    pub acc_bias: Vector3<f64>,
    pub acc_variance: Vector3<f64>,
}

impl ImuCalibration {
    pub fn from_samples<I>(samples: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ImuSample>,
    {
        let mut count = 0usize;
        let mut gyr_sum = Vector3::zeros();
        let mut gyr_sq_sum = Vector3::zeros();
        let mut acc_sum = Vector3::zeros();
        let mut acc_sq_sum = Vector3::zeros();

        for sample in samples {
            gyr_sum += sample.gyr;
            gyr_sq_sum += sample.gyr.component_mul(&sample.gyr);
            acc_sum += sample.acc;
            acc_sq_sum += sample.acc.component_mul(&sample.acc);
            count += 1;
        }

        if count == 0 {
            return Err(ConfigError::EmptyCalibration);
        }

        let n = count as f64;
        let gyr_bias = gyr_sum / n;
        let acc_bias = acc_sum / n;
        let calibration = Self {
            gyr_bias,
            gyr_variance: (gyr_sq_sum / n - gyr_bias.component_mul(&gyr_bias)).sup(&Vector3::zeros()),
            acc_bias,
            acc_variance: (acc_sq_sum / n - acc_bias.component_mul(&acc_bias)).sup(&Vector3::zeros()),
        };
        log::debug!(
            "IMU calibrated from {} samples, gyro bias {:?}",
            count,
            calibration.gyr_bias
        );
        Ok(calibration)
    }
}

/// Runs every orientation estimator side by side on the same IMU stream
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    alpha: f64,
    gyr_bias: Vector3<f64>,
    flatland_roll_gyr: f64,
    flatland_roll_acc: f64,
    flatland_roll_comp: f64,
    quaternion_gyr: UnitQuaternion<f64>,
    euler_acc: Vector3<f64>,
    quaternion_comp: UnitQuaternion<f64>,
}

impl OrientationTracker {
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ConfigError::InvalidFilterAlpha(alpha));
        }
        Ok(Self {
            alpha,
            gyr_bias: Vector3::zeros(),
            flatland_roll_gyr: 0.0,
            flatland_roll_acc: 0.0,
            flatland_roll_comp: 0.0,
            quaternion_gyr: UnitQuaternion::identity(),
            euler_acc: Vector3::zeros(),
            quaternion_comp: UnitQuaternion::identity(),
        })
    }

    pub fn set_gyro_bias(&mut self, bias: Vector3<f64>) {
        self.gyr_bias = bias;
    }

    pub fn apply_calibration(&mut self, calibration: &ImuCalibration) {
        self.gyr_bias = calibration.gyr_bias;
    }

    /// Forget the accumulated orientation, keeping bias and alpha
    pub fn reset(&mut self) {
        self.flatland_roll_gyr = 0.0;
        self.flatland_roll_acc = 0.0;
        self.flatland_roll_comp = 0.0;
        self.quaternion_gyr = UnitQuaternion::identity();
        self.euler_acc = Vector3::zeros();
        self.quaternion_comp = UnitQuaternion::identity();
    }

    /// Feed one raw sample taken `dt` seconds after the previous one
    pub fn process(&mut self, raw: &ImuSample, dt: f64) {
        let gyr = raw.gyr - self.gyr_bias;
        let acc = raw.acc;

        self.flatland_roll_gyr = flatland_roll_gyr(self.flatland_roll_gyr, &gyr, dt);
        self.flatland_roll_acc = flatland_roll_acc(&acc);
        self.flatland_roll_comp = flatland_roll_comp(
            self.flatland_roll_comp,
            &gyr,
            self.flatland_roll_acc,
            dt,
            self.alpha,
        );

        self.quaternion_gyr = integrate_gyro(&self.quaternion_gyr, &gyr, dt);
        // Yaw is unobservable from gravity
        self.euler_acc = Vector3::new(acc_pitch(&acc), 0.0, acc_roll(&acc));
        self.quaternion_comp =
            complementary_update(&self.quaternion_comp, &gyr, &acc, dt, self.alpha);
    }

    pub fn flatland_roll_gyr(&self) -> f64 {
        self.flatland_roll_gyr
    }

    pub fn flatland_roll_acc(&self) -> f64 {
        self.flatland_roll_acc
    }

    pub fn flatland_roll_comp(&self) -> f64 {
        self.flatland_roll_comp
    }

    pub fn quaternion_gyr(&self) -> &UnitQuaternion<f64> {
        &self.quaternion_gyr
    }

    /// `(pitch, 0, roll)` in degrees
    pub fn euler_acc(&self) -> &Vector3<f64> {
        &self.euler_acc
    }

    pub fn quaternion_comp(&self) -> &UnitQuaternion<f64> {
        &self.quaternion_comp
    }
}
