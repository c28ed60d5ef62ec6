//! cpu.rs
//! Process-wide CPU capability set.
//!
//! Detected once on first use and immutable afterwards. Build features
//! (`deactivate-sse2`, `deactivate-avx2`) and `BLOCZ_DISABLE_SIMD=1` mask out
//! what the hardware reports.

use std::sync::OnceLock;

use tracing::debug;

use crate::constants::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    pub sse2: bool,
    pub avx2: bool,
    pub neon: bool,
    /// Set when the runtime override turned every vector path off.
    pub disabled_by_env: bool,
}

impl CpuFeatures {
    /// Whether wide (vector-friendly) kernels should be preferred.
    pub fn has_vector_unit(&self) -> bool {
        self.sse2 || self.avx2 || self.neon
    }

    /// A capability set with every vector path off.
    pub const fn scalar_only() -> Self {
        Self { sse2: false, avx2: false, neon: false, disabled_by_env: false }
    }
}

static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// The capability set for this process.
pub fn features() -> &'static CpuFeatures {
    FEATURES.get_or_init(|| {
        let disabled = std::env::var(env::DISABLE_SIMD)
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let detected = if disabled {
            CpuFeatures { disabled_by_env: true, ..CpuFeatures::scalar_only() }
        } else {
            detect()
        };
        debug!(?detected, "cpu features selected");
        detected
    })
}

/// Fold the build-time deactivation switches into what the hardware reports.
/// AVX2 builds on SSE2, so deactivating SSE2 masks both.
#[cfg_attr(not(target_arch = "x86_64"), allow(dead_code))]
const fn apply_build_mask(sse2: bool, avx2: bool, no_sse2: bool, no_avx2: bool) -> CpuFeatures {
    CpuFeatures {
        sse2: sse2 && !no_sse2,
        avx2: avx2 && !no_sse2 && !no_avx2,
        neon: false,
        disabled_by_env: false,
    }
}

#[cfg(target_arch = "x86_64")]
fn detect() -> CpuFeatures {
    apply_build_mask(
        std::arch::is_x86_feature_detected!("sse2"),
        std::arch::is_x86_feature_detected!("avx2"),
        cfg!(feature = "deactivate-sse2"),
        cfg!(feature = "deactivate-avx2"),
    )
}

#[cfg(target_arch = "aarch64")]
fn detect() -> CpuFeatures {
    // NEON is architecturally mandatory on AArch64.
    CpuFeatures { neon: true, ..CpuFeatures::scalar_only() }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn detect() -> CpuFeatures {
    CpuFeatures::scalar_only()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse2_switch_masks_avx2_too() {
        let f = apply_build_mask(true, true, true, false);
        assert!(!f.sse2 && !f.avx2);
        assert!(!f.has_vector_unit());
    }

    #[test]
    fn avx2_switch_keeps_sse2() {
        let f = apply_build_mask(true, true, false, true);
        assert!(f.sse2 && !f.avx2);
        assert!(f.has_vector_unit());
    }

    #[test]
    fn no_switches_keeps_hardware_report() {
        assert_eq!(apply_build_mask(true, false, false, false), CpuFeatures { sse2: true, ..CpuFeatures::scalar_only() });
    }
}
