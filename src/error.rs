//! Error kinds reported by the codec core (spec §7).
//!
//! Nothing in this crate recovers from an error locally: every fallible
//! operation either succeeds or reports one of these kinds to the caller.
//! Debug-only invariants (patch footprint fits the canvas, `block_to_patch`
//! consistency) use `debug_assert!` instead — in release builds a violation
//! is undefined behaviour that must be prevented by the producer.

use thiserror::Error;

/// Errors that can cross the codec core's public boundary.
#[derive(Error, Debug)]
pub enum CodecError {
    /// ASPS/AFPS/ATGH inconsistent with image dimensions, or a patch
    /// descriptor referring to a non-existent reference patch.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Geometry bit depth would be (or was) exceeded by a depth value.
    #[error("canvas overflow: depth {depth} exceeds max depth {max_depth}")]
    CanvasOverflow { depth: u32, max_depth: u32 },

    /// Mutually exclusive options were set together.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// `D1 - D0` exceeds what the EDD bitfield can encode (> 10).
    #[error("EOM bitcount violation: D1-D0 = {delta} exceeds 10")]
    EOMBitcountViolation { delta: u32 },

    /// Failure from an external collaborator (video sink/source, I/O).
    #[error(transparent)]
    Sink(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
