//! Parser for Biovision Hierarchy (.bvh) motion capture files.
//!
//! A parsed file becomes a [`Skeleton`]: the joint hierarchy, one [`Keyframe`] per frame for every
//! animated bone and a playback cursor that steps through frames at the clip's frame rate.
//!
//! ```
//! use bvh_playback::parse;
//!
//! let text = "HIERARCHY
//! ROOT hip
//! {
//!     OFFSET 0 0 0
//!     CHANNELS 3 Zrotation Xrotation Yrotation
//!     End Site
//!     {
//!         OFFSET 0 1 0
//!     }
//! }
//! MOTION
//! Frames: 2
//! Frame Time: 0.5
//! 0 0 0
//! 90 0 0
//! ";
//! let mut skeleton = parse(text).unwrap();
//! assert_eq!(skeleton.frame_count(), 2);
//! assert_eq!(skeleton.bones().len(), 1);
//!
//! skeleton.advance(0.6);
//! assert_eq!(skeleton.current_frame_index(), 1);
//! ```

pub mod error;
mod motion;
pub mod parse;
mod reader;
pub mod rotation;
pub mod skeleton;
pub mod types;

pub use error::{BvhError, ParseError, ParseErrorKind, Result, UnsupportedRotationOrder};
pub use parse::{load_bvh_from_file, parse, parse_with_options, ParseOptions};
pub use rotation::{Euler, RotationOrder};
pub use skeleton::{Bone, PlaybackOptions, Skeleton, WrapPolicy};
pub use types::{ChannelKind, Keyframe, NodeKind};
