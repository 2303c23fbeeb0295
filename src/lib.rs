//! Patch-based geometry/attribute projection and reconstruction engine for
//! a video-based point-cloud codec.
//!
//! This crate implements the codec *core*: it turns an input point cloud
//! into patch-packed geometry/occupancy/texture images ready for handoff
//! to an external 2D video codec, and turns decoded images back into a
//! reconstructed point cloud. It does not parse a bitstream, talk to an
//! actual HEVC/AVC encoder, or read point-cloud files from disk — those
//! are narrow collaborator interfaces (see [`video`]) left to the caller.

pub mod descriptor;
pub mod error;
pub mod geom;
pub mod image_gen;
pub mod packer;
pub mod params;
pub mod patch;
pub mod pipeline;
pub mod plr;
pub mod raw_eom;
pub mod reconstruct;
pub mod segmenter;
pub mod smoothing;
pub mod video;

pub use error::{CodecError, Result};
pub use params::{GeneratePointCloudParameters, PatchSegmenterParameters};
