//! Quaternion construction/composition and quaternion -> Euler extraction.

use std::fmt;
use std::str::FromStr;

use cgmath::{Matrix3, Rad, Rotation3};

use crate::error::UnsupportedRotationOrder;
use crate::types::{Axis, Position, Quaternion};

/// Below this |sin| the middle angle is away from +-90 degrees and both outer angles are recoverable.
const GIMBAL_THRESHOLD: f64 = 0.99999;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Axis order of an Euler decomposition. `XYZ` means `R = Rx * Ry * Rz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationOrder {
    #[default]
    XYZ,
    YXZ,
    ZXY,
    ZYX,
    YZX,
    XZY,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::XYZ,
        RotationOrder::YXZ,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
        RotationOrder::YZX,
        RotationOrder::XZY,
    ];

    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotationOrder::XYZ => [Axis::X, Axis::Y, Axis::Z],
            RotationOrder::YXZ => [Axis::Y, Axis::X, Axis::Z],
            RotationOrder::ZXY => [Axis::Z, Axis::X, Axis::Y],
            RotationOrder::ZYX => [Axis::Z, Axis::Y, Axis::X],
            RotationOrder::YZX => [Axis::Y, Axis::Z, Axis::X],
            RotationOrder::XZY => [Axis::X, Axis::Z, Axis::Y],
        }
    }

    /// Order matching three axes listed in composition order; `None` if an axis repeats.
    pub fn from_axes(axes: [Axis; 3]) -> Option<RotationOrder> {
        RotationOrder::ALL.into_iter().find(|order| order.axes() == axes)
    }
}

impl FromStr for RotationOrder {
    type Err = UnsupportedRotationOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XYZ" => Ok(RotationOrder::XYZ),
            "YXZ" => Ok(RotationOrder::YXZ),
            "ZXY" => Ok(RotationOrder::ZXY),
            "ZYX" => Ok(RotationOrder::ZYX),
            "YZX" => Ok(RotationOrder::YZX),
            "XZY" => Ok(RotationOrder::XZY),
            _ => Err(UnsupportedRotationOrder(s.to_string())),
        }
    }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationOrder::XYZ => "XYZ",
            RotationOrder::YXZ => "YXZ",
            RotationOrder::ZXY => "ZXY",
            RotationOrder::ZYX => "ZYX",
            RotationOrder::YZX => "YZX",
            RotationOrder::XZY => "XZY",
        };
        f.write_str(name)
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Euler angles in radians, one per world axis (independent of the order they are applied in).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub fn new(x: f64, y: f64, z: f64) -> Euler {
        Euler { x, y, z }
    }

    fn angle(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Compose the per-axis rotations in `order`, e.g. `qx * qy * qz` for XYZ.
    pub fn to_quaternion(&self, order: RotationOrder) -> Quaternion {
        order
            .axes()
            .into_iter()
            .fold(identity(), |acc, axis| {
                multiply(acc, axis_angle_to_quaternion(axis.unit(), self.angle(axis)))
            })
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

pub fn identity() -> Quaternion {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// `axis` must already be unit length; it is not re-normalized.
pub fn axis_angle_to_quaternion(axis: Position, angle: f64) -> Quaternion {
    Quaternion::from_axis_angle(axis, Rad(angle))
}

/// Hamilton product `a * b` (apply `b` first, then `a`).
pub fn multiply(a: Quaternion, b: Quaternion) -> Quaternion {
    a * b
}

pub fn rotation_matrix(q: Quaternion) -> Matrix3<f64> {
    Matrix3::from(q)
}

/// Decompose `q` into Euler angles for `order`.
///
/// Each order reads the sine of its middle angle straight from one matrix element. While
/// `|sin| < 0.99999` both outer angles come from `atan2` of their row/column pair. Otherwise the
/// outer angles are coupled (gimbal lock): the angle applied last in the order (z for XYZ and YXZ,
/// y for ZXY and XZY, x for ZYX and YZX) is forced to 0 and the first one absorbs the rotation.
pub fn to_euler(q: Quaternion, order: RotationOrder) -> Euler {
    let m = rotation_matrix(q);
    // cgmath is column major: m.<col>.<row>
    let (m11, m12, m13) = (m.x.x, m.y.x, m.z.x);
    let (m21, m22, m23) = (m.x.y, m.y.y, m.z.y);
    let (m31, m32, m33) = (m.x.z, m.y.z, m.z.z);

    match order {
        RotationOrder::XYZ => {
            let y = m13.clamp(-1.0, 1.0).asin();
            if m13.abs() < GIMBAL_THRESHOLD {
                Euler::new((-m23).atan2(m33), y, (-m12).atan2(m11))
            } else {
                Euler::new(m32.atan2(m22), y, 0.0)
            }
        }
        RotationOrder::YXZ => {
            let x = (-m23.clamp(-1.0, 1.0)).asin();
            if m23.abs() < GIMBAL_THRESHOLD {
                Euler::new(x, m13.atan2(m33), m21.atan2(m22))
            } else {
                Euler::new(x, (-m31).atan2(m11), 0.0)
            }
        }
        RotationOrder::ZXY => {
            let x = m32.clamp(-1.0, 1.0).asin();
            if m32.abs() < GIMBAL_THRESHOLD {
                Euler::new(x, (-m31).atan2(m33), (-m12).atan2(m22))
            } else {
                Euler::new(x, 0.0, m21.atan2(m11))
            }
        }
        RotationOrder::ZYX => {
            let y = (-m31.clamp(-1.0, 1.0)).asin();
            if m31.abs() < GIMBAL_THRESHOLD {
                Euler::new(m32.atan2(m33), y, m21.atan2(m11))
            } else {
                Euler::new(0.0, y, (-m12).atan2(m22))
            }
        }
        RotationOrder::YZX => {
            let z = m21.clamp(-1.0, 1.0).asin();
            if m21.abs() < GIMBAL_THRESHOLD {
                Euler::new((-m23).atan2(m22), (-m31).atan2(m11), z)
            } else {
                Euler::new(0.0, m13.atan2(m33), z)
            }
        }
        RotationOrder::XZY => {
            let z = (-m12.clamp(-1.0, 1.0)).asin();
            if m12.abs() < GIMBAL_THRESHOLD {
                Euler::new(m32.atan2(m22), m13.atan2(m11), z)
            } else {
                Euler::new((-m23).atan2(m33), 0.0, z)
            }
        }
    }
}
