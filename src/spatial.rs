//! Uniform-bucket spatial hash for entity broad-phase queries.

use crate::entity::{Bounds, Vec2};

/// Spatial index for fast entity lookups by position
#[derive(Clone, Debug)]
pub struct SpatialHash {
    origin: Vec2,
    bucket_size: f32,
    cols: usize,
    rows: usize,
    /// buckets[row * cols + col] contains indices of entities in that bucket
    buckets: Vec<Vec<usize>>,
}

impl SpatialHash {
    /// Create a hash covering `bounds` with square buckets of `bucket_size`
    pub fn new(bounds: Bounds, bucket_size: f32) -> Self {
        let bucket_size = bucket_size.max(f32::EPSILON);
        let cols = ((bounds.width() / bucket_size).ceil() as usize).max(1);
        let rows = ((bounds.height() / bucket_size).ceil() as usize).max(1);
        Self {
            origin: bounds.min,
            bucket_size,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Bucket coordinate for a world position, clamped to the covered area
    #[inline]
    fn bucket_of(&self, p: Vec2) -> (usize, usize) {
        let col = ((p.x - self.origin.x) / self.bucket_size).floor();
        let row = ((p.y - self.origin.y) / self.bucket_size).floor();
        (
            (col.max(0.0) as usize).min(self.cols - 1),
            (row.max(0.0) as usize).min(self.rows - 1),
        )
    }

    /// Insert an entity index at the given position
    #[inline]
    pub fn insert(&mut self, p: Vec2, idx: usize) {
        let (col, row) = self.bucket_of(p);
        self.buckets[row * self.cols + col].push(idx);
    }

    /// All indices in buckets overlapping the square of half-size `radius` around `p`
    pub fn query_radius(&self, p: Vec2, radius: f32) -> Vec<usize> {
        let mut results = Vec::new();

        let (c0, r0) = self.bucket_of(Vec2::new(p.x - radius, p.y - radius));
        let (c1, r1) = self.bucket_of(Vec2::new(p.x + radius, p.y + radius));

        for row in r0..=r1 {
            for col in c0..=c1 {
                results.extend_from_slice(&self.buckets[row * self.cols + col]);
            }
        }

        results
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
