//! Pose types exchanged with ingestion and the planning service.
//!
//! Poses travel as plain `{x, y, z}` / `{x, y, z, w}` records; rotations are
//! computed with nalgebra's `UnitQuaternion`.

use chrono::{DateTime, Utc};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Cartesian position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as a quaternion (`w` is the scalar part).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Normalized nalgebra quaternion for this orientation.
    pub fn to_unit_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(Quaternion::new(self.w, self.x, self.y, self.z))
    }

    pub fn from_unit_quaternion(q: &UnitQuaternion<f64>) -> Self {
        Self {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }

    /// Rotation about the vertical axis, in radians.
    pub fn yaw(&self) -> f64 {
        self.to_unit_quaternion().euler_angles().2
    }
}

/// A 6-DoF pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// All components finite and a non-zero quaternion.
    pub fn is_valid(&self) -> bool {
        let p = &self.position;
        let o = &self.orientation;
        let values = [p.x, p.y, p.z, o.x, o.y, o.z, o.w];
        values.iter().all(|v| v.is_finite())
            && (o.x * o.x + o.y * o.y + o.z * o.z + o.w * o.w) > f64::EPSILON
    }

    /// Returns a copy whose orientation is post-multiplied by a rotation of
    /// `angle` radians about the vertical axis. Position is unchanged.
    pub fn rotated_about_z(&self, angle: f64) -> Self {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle);
        let q = self.orientation.to_unit_quaternion() * rotation;
        Self {
            position: self.position,
            orientation: Orientation::from_unit_quaternion(&q),
        }
    }
}

/// A pose paired with a reference time.
///
/// For the `pick` pose of a task the stamp is the instant the moving object
/// is predicted to reach the grasp point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampedPose {
    pub pose: Pose,
    pub stamp: DateTime<Utc>,
}

impl StampedPose {
    pub fn new(pose: Pose, stamp: DateTime<Utc>) -> Self {
        Self { pose, stamp }
    }

    pub fn rotated_about_z(&self, angle: f64) -> Self {
        Self {
            pose: self.pose.rotated_about_z(angle),
            stamp: self.stamp,
        }
    }
}
