use cgmath::{Decomposed, Vector3};

use crate::rotation::{Euler, RotationOrder};

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Depth = usize;
pub type Quaternion = cgmath::Quaternion<f64>;
pub type Position = Vector3<f64>;
pub type Transform = Decomposed<Position, Quaternion>;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Axis of a position or rotation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// World unit vector of this axis.
    pub fn unit(self) -> Position {
        match self {
            Axis::X => Position::unit_x(),
            Axis::Y => Position::unit_y(),
            Axis::Z => Position::unit_z(),
        }
    }
}

/// One animated degree of freedom of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Xposition,
    Yposition,
    Zposition,
    Xrotation,
    Yrotation,
    Zrotation,
}

impl ChannelKind {
    pub fn from_name(name: &str) -> Option<ChannelKind> {
        match name {
            "Xposition" => Some(ChannelKind::Xposition),
            "Yposition" => Some(ChannelKind::Yposition),
            "Zposition" => Some(ChannelKind::Zposition),
            "Xrotation" => Some(ChannelKind::Xrotation),
            "Yrotation" => Some(ChannelKind::Yrotation),
            "Zrotation" => Some(ChannelKind::Zrotation),
            _ => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            ChannelKind::Xposition | ChannelKind::Xrotation => Axis::X,
            ChannelKind::Yposition | ChannelKind::Yrotation => Axis::Y,
            ChannelKind::Zposition | ChannelKind::Zrotation => Axis::Z,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(
            self,
            ChannelKind::Xrotation | ChannelKind::Yrotation | ChannelKind::Zrotation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Joint,
    EndSite,
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// One sampled frame of a bone: local translation from position channels and the
/// rotation composed from its rotation channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// seconds since the start of the clip
    pub time: f64,
    pub position: Position,
    pub rotation: Quaternion,
}

impl Keyframe {
    /// Euler angles (radians) of this frame's rotation.
    pub fn euler(&self, order: RotationOrder) -> Euler {
        crate::rotation::to_euler(self.rotation, order)
    }
}
