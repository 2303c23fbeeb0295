//! External video codec boundary (spec §6).
//!
//! The core never encodes or decodes a 2D video bitstream itself — it
//! only produces/consumes raw sample planes. `VideoSink`/`VideoSource`
//! are the narrow collaborator interfaces a caller implements around a
//! real HEVC/AVC codec; [`LosslessMemorySink`]/[`LosslessMemorySource`]
//! is an in-memory stand-in used by this crate's own tests.

use crate::error::Result;
use std::collections::HashMap;

/// A single-component sample plane of `width * height` elements of type
/// `T`. `CHANNELS` is informational (1 for occupancy/geometry, 3 for
/// texture) and is not currently enforced on the stored buffer length.
#[derive(Debug, Clone)]
pub struct Plane<T, const CHANNELS: usize> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

impl<T: Clone + Default, const CHANNELS: usize> Plane<T, CHANNELS> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height * CHANNELS],
        }
    }

    pub fn get(&self, x: usize, y: usize, c: usize) -> &T {
        &self.data[(y * self.width + x) * CHANNELS + c]
    }

    pub fn set(&mut self, x: usize, y: usize, c: usize, value: T) {
        let idx = (y * self.width + x) * CHANNELS + c;
        self.data[idx] = value;
    }
}

/// Receives encoder-generated sample planes for handoff to an external
/// 2D video codec (spec §6).
pub trait VideoSink {
    fn submit_occupancy(&mut self, frame_index: usize, frame: Plane<u8, 1>) -> Result<()>;
    fn submit_geometry(&mut self, frame_index: usize, map_index: usize, frame: Plane<u16, 1>) -> Result<()>;
    fn submit_texture(&mut self, frame_index: usize, frame: Plane<u8, 3>) -> Result<()>;
}

/// Supplies decoder-side sample planes, as if handed back by an external
/// 2D video codec (spec §6).
pub trait VideoSource {
    fn occupancy(&self, frame_index: usize) -> Result<Plane<u8, 1>>;
    fn geometry(&self, frame_index: usize, map_index: usize) -> Result<Plane<u16, 1>>;
    fn texture(&self, frame_index: usize) -> Result<Plane<u8, 3>>;
}

/// An in-memory `VideoSink`/`VideoSource` that stores whatever it is
/// given verbatim — a lossless stand-in for a real video codec, used to
/// exercise the encode/decode pipeline end to end in tests without an
/// actual HEVC/AVC dependency.
#[derive(Debug, Default)]
pub struct LosslessMemorySink {
    pub occupancy: HashMap<usize, Plane<u8, 1>>,
    pub geometry: HashMap<(usize, usize), Plane<u16, 1>>,
    pub texture: HashMap<usize, Plane<u8, 3>>,
}

impl LosslessMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts this sink's buffered frames into a source, as if the
    /// round trip through an external codec had happened losslessly.
    pub fn into_source(self) -> LosslessMemorySource {
        LosslessMemorySource {
            occupancy: self.occupancy,
            geometry: self.geometry,
            texture: self.texture,
        }
    }
}

impl VideoSink for LosslessMemorySink {
    fn submit_occupancy(&mut self, frame_index: usize, frame: Plane<u8, 1>) -> Result<()> {
        self.occupancy.insert(frame_index, frame);
        Ok(())
    }

    fn submit_geometry(&mut self, frame_index: usize, map_index: usize, frame: Plane<u16, 1>) -> Result<()> {
        self.geometry.insert((frame_index, map_index), frame);
        Ok(())
    }

    fn submit_texture(&mut self, frame_index: usize, frame: Plane<u8, 3>) -> Result<()> {
        self.texture.insert(frame_index, frame);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LosslessMemorySource {
    pub occupancy: HashMap<usize, Plane<u8, 1>>,
    pub geometry: HashMap<(usize, usize), Plane<u16, 1>>,
    pub texture: HashMap<usize, Plane<u8, 3>>,
}

impl VideoSource for LosslessMemorySource {
    fn occupancy(&self, frame_index: usize) -> Result<Plane<u8, 1>> {
        self.occupancy
            .get(&frame_index)
            .cloned()
            .ok_or_else(|| crate::error::CodecError::MalformedInput(format!("no occupancy frame {frame_index}")))
    }

    fn geometry(&self, frame_index: usize, map_index: usize) -> Result<Plane<u16, 1>> {
        self.geometry
            .get(&(frame_index, map_index))
            .cloned()
            .ok_or_else(|| {
                crate::error::CodecError::MalformedInput(format!(
                    "no geometry frame {frame_index} map {map_index}"
                ))
            })
    }

    fn texture(&self, frame_index: usize) -> Result<Plane<u8, 3>> {
        self.texture
            .get(&frame_index)
            .cloned()
            .ok_or_else(|| crate::error::CodecError::MalformedInput(format!("no texture frame {frame_index}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_round_trips_into_source() {
        let mut sink = LosslessMemorySink::new();
        let mut plane: Plane<u8, 1> = Plane::new(4, 4);
        plane.set(1, 1, 0, 200);
        sink.submit_occupancy(0, plane).unwrap();

        let source = sink.into_source();
        let back = source.occupancy(0).unwrap();
        assert_eq!(*back.get(1, 1, 0), 200);
    }

    #[test]
    fn missing_frame_is_malformed_input() {
        let source = LosslessMemorySource::default();
        assert!(source.occupancy(0).is_err());
    }
}
