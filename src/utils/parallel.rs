#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Heuristic: Don't spin up Rayon for fewer items than this
const PARALLEL_THRESHOLD: usize = 1000;

// Helper for mutable iteration
#[inline]
pub fn iterate_mut<T, F>(collection: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > PARALLEL_THRESHOLD {
            collection.par_iter_mut().for_each(f);
        } else {
            collection.iter_mut().for_each(f);
        }
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        collection.iter_mut().for_each(f);
    }
}

/// Maps every item, keeping input order. Runs on the rayon pool when the
/// feature is on and the input is large enough.
#[inline]
pub fn map<T, R, F>(collection: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    map_with_threshold(collection, PARALLEL_THRESHOLD, f)
}

/// Like [`map`], going parallel above `threshold` items. Callers whose
/// per-item work is heavy pass a small threshold.
#[inline]
pub fn map_with_threshold<T, R, F>(collection: &[T], threshold: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > threshold {
            collection.par_iter().map(f).collect()
        } else {
            collection.iter().map(f).collect()
        }
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        let _ = threshold;
        collection.iter().map(f).collect()
    }
}
