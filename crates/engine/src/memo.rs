//! Opt-in memoization for repeated ROI calculations.
//!
//! The cache key is the SHA-256 of the canonical JSON of the inputs and the
//! options that feed the arithmetic. `quick_mode` is left out, and an unset
//! reduction table hashes as the default it resolves to. Nothing is cached
//! unless the caller builds a [`MemoizedEngine`] and keeps it alive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};

use roiforge_config::IrrSettings;
use roiforge_core::{BusinessInputs, CalcError, CalcResult, ReductionTable};

use crate::roi::{calculate_roi, RoiOptions, RoiResult};

#[derive(Serialize)]
struct KeyMaterial<'a> {
    inputs: &'a BusinessInputs,
    reduction: ReductionTable,
    discount_rate: f64,
    growth_rate: f64,
    irr: &'a IrrSettings,
}

/// Content hash of an engine request.
pub fn cache_key(inputs: &BusinessInputs, options: &RoiOptions) -> CalcResult<String> {
    let material = KeyMaterial {
        inputs,
        reduction: options.reduction_table(),
        discount_rate: options.discount_rate,
        growth_rate: options.growth_rate,
        irr: &options.irr,
    };
    let bytes = serde_json::to_vec(&material)
        .map_err(|e| CalcError::invalid(format!("cannot hash request: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// ROI engine wrapper with a bounded result cache.
#[derive(Debug)]
pub struct MemoizedEngine {
    options: RoiOptions,
    capacity: usize,
    cache: RwLock<HashMap<String, RoiResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoizedEngine {
    /// `capacity` is clamped to at least 1. When full, the cache is cleared
    /// before the next insert.
    pub fn new(options: RoiOptions, capacity: usize) -> Self {
        Self {
            options,
            capacity: capacity.max(1),
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &RoiOptions {
        &self.options
    }

    /// Cached [`calculate_roi`]. Errors are returned as-is and never cached.
    pub fn calculate(&self, inputs: &BusinessInputs) -> CalcResult<RoiResult> {
        let key = cache_key(inputs, &self.options)?;

        if let Some(hit) = self.cache.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = calculate_roi(inputs, &self.options)?;

        let mut cache = self.cache.write();
        if cache.len() >= self.capacity && !cache.contains_key(&key) {
            tracing::debug!(capacity = self.capacity, "roi cache full, clearing");
            cache.clear();
        }
        cache.insert(key, result.clone());

        Ok(result)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }
}
