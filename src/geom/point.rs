//! Point, colour, bounding box and point-cloud container.
//!
//! Grounded on `point-cloud-pre-processing/src/bounds.rs`'s `PointCloudBounds`
//! (min/max tracking + normalisation) generalised from `f64` world space to
//! the codec's fixed-bit-depth integer coordinate space.

use serde::{Deserialize, Serialize};

/// A 3D point in the fixed `B3D`-bit coordinate space (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
pub struct Point3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component access by axis index (0=x, 1=y, 2=z).
    pub fn get(&self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("axis out of range: {axis}"),
        }
    }

    /// Component mutation by axis index.
    pub fn set(&mut self, axis: usize, value: i32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => panic!("axis out of range: {axis}"),
        }
    }

    pub fn squared_distance(&self, other: &Point3D) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }
}

impl std::ops::Add for Point3D {
    type Output = Point3D;
    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Point3D {
    type Output = Point3D;
    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A 3D unit-ish direction vector in floating point, used for normals and
/// candidate projection orientations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalized(&self) -> Vector3D {
        let n = self.norm();
        if n < 1e-12 {
            return *self;
        }
        Vector3D::new(self.x / n, self.y / n, self.z / n)
    }

    pub fn scale(&self, s: f64) -> Vector3D {
        Vector3D::new(self.x * s, self.y * s, self.z * s)
    }
}

impl std::ops::Add for Vector3D {
    type Output = Vector3D;
    fn add(self, rhs: Vector3D) -> Vector3D {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3D {
    type Output = Vector3D;
    fn sub(self, rhs: Vector3D) -> Vector3D {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// 3-byte RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// ITU-R BT.601 luma, used by the colour-smoothing luminance gates (§4.7).
    pub fn luma(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }
}

/// Per-point role assigned during reconstruction/smoothing (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    D0,
    D1,
    Df,
    Edd,
    Raw,
    Smooth,
}

/// Axis-aligned bounding box tracked incrementally, as the teacher's
/// `PointCloudBounds` does for `f64` world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3D,
    pub max: Point3D,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3D::new(i32::MAX, i32::MAX, i32::MAX),
            max: Point3D::new(i32::MIN, i32::MIN, i32::MIN),
        }
    }

    pub fn update(&mut self, p: Point3D) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        let mut b = *self;
        b.update(other.min);
        b.update(other.max);
        b
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn dimensions(&self) -> (i32, i32, i32) {
        (
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

/// Ordered sequence of points plus parallel attribute arrays (spec §3).
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<Point3D>,
    colours: Vec<Option<Colour>>,
    patch_index: Vec<Option<u32>>,
    kinds: Vec<Option<PointKind>>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            points: Vec::with_capacity(cap),
            colours: Vec::with_capacity(cap),
            patch_index: Vec::with_capacity(cap),
            kinds: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.colours.clear();
        self.patch_index.clear();
        self.kinds.clear();
    }

    pub fn resize(&mut self, n: usize) {
        self.points.resize(n, Point3D::default());
        self.colours.resize(n, None);
        self.patch_index.resize(n, None);
        self.kinds.resize(n, None);
    }

    pub fn add_point(&mut self, p: Point3D) -> usize {
        self.add(p, None, None, None)
    }

    pub fn add(
        &mut self,
        p: Point3D,
        colour: Option<Colour>,
        patch_index: Option<u32>,
        kind: Option<PointKind>,
    ) -> usize {
        self.points.push(p);
        self.colours.push(colour);
        self.patch_index.push(patch_index);
        self.kinds.push(kind);
        self.points.len() - 1
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn point(&self, i: usize) -> Point3D {
        self.points[i]
    }

    pub fn colour(&self, i: usize) -> Option<Colour> {
        self.colours[i]
    }

    pub fn set_colour(&mut self, i: usize, c: Colour) {
        self.colours[i] = Some(c);
    }

    pub fn patch_index(&self, i: usize) -> Option<u32> {
        self.patch_index[i]
    }

    pub fn set_patch_index(&mut self, i: usize, idx: u32) {
        self.patch_index[i] = Some(idx);
    }

    pub fn kind(&self, i: usize) -> Option<PointKind> {
        self.kinds[i]
    }

    pub fn set_kind(&mut self, i: usize, kind: PointKind) {
        self.kinds[i] = Some(kind);
    }

    pub fn set_point(&mut self, i: usize, p: Point3D) {
        self.points[i] = p;
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for p in &self.points {
            bbox.update(*p);
        }
        bbox
    }

    /// Treat this cloud as a multiset of (x,y,z) triples, ignoring order,
    /// colour and per-point metadata — used by the lossless round-trip
    /// property test (spec §8 property 1).
    pub fn as_multiset(&self) -> Vec<Point3D> {
        let mut v = self.points.clone();
        v.sort_by_key(|p| (p.x, p.y, p.z));
        v
    }
}
