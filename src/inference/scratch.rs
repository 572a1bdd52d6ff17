//! Reusable feature-vector scratch space.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use super::FeatureVector;

/// Pool of feature-vector slabs shared across prediction calls.
///
/// Each worker checks out a slab of feature vectors for the duration of a
/// block and returns it on drop, so repeated calls on the same predictor do
/// not reallocate per-thread scratch. Slabs only ever grow.
#[derive(Debug)]
pub(crate) struct FVecPool {
    n_features: usize,
    slabs: Mutex<Vec<Vec<FeatureVector>>>,
}

impl FVecPool {
    pub(crate) fn new(n_features: usize) -> Self {
        Self {
            n_features,
            slabs: Mutex::new(Vec::new()),
        }
    }

    /// Check out a slab with at least `len` feature vectors.
    pub(crate) fn checkout(&self, len: usize) -> SlabGuard<'_> {
        let mut slab = self
            .slabs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default();
        while slab.len() < len {
            slab.push(FeatureVector::new(self.n_features));
        }
        SlabGuard { pool: self, slab }
    }
}

/// RAII handle over a checked-out slab; returns it to the pool on drop.
#[derive(Debug)]
pub(crate) struct SlabGuard<'p> {
    pool: &'p FVecPool,
    slab: Vec<FeatureVector>,
}

impl Deref for SlabGuard<'_> {
    type Target = [FeatureVector];

    fn deref(&self) -> &[FeatureVector] {
        &self.slab
    }
}

impl DerefMut for SlabGuard<'_> {
    fn deref_mut(&mut self) -> &mut [FeatureVector] {
        &mut self.slab
    }
}

impl Drop for SlabGuard<'_> {
    fn drop(&mut self) {
        let slab = std::mem::take(&mut self.slab);
        self.pool
            .slabs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(slab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_provides_requested_length() {
        let pool = FVecPool::new(4);
        let slab = pool.checkout(3);
        assert_eq!(slab.len(), 3);
        assert_eq!(slab[0].n_features(), 4);
    }

    #[test]
    fn slabs_are_reused_after_drop() {
        let pool = FVecPool::new(2);
        {
            let mut slab = pool.checkout(2);
            slab[0].set(0, 1.0);
            slab[0].unset(0);
        }
        // The returned slab is reused and may only grow.
        let slab = pool.checkout(5);
        assert_eq!(slab.len(), 5);
        assert_eq!(pool.slabs.lock().unwrap().len(), 0);
        drop(slab);
        assert_eq!(pool.slabs.lock().unwrap().len(), 1);
    }
}
