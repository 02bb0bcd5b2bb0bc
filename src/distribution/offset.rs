//! Ratio to Zipf-Mandelbrot offset conversion
//!
//! The Zipf-Mandelbrot mass function is `P(k) ∝ (offset + k)^(-exponent)` for
//! `k` in `[0, N)`. How skewed that is depends on the offset *and* on N, which
//! makes offsets awkward to carry between benchmark configs. The ratio
//! `P(N-1) / P(0)` does not depend on N, so configs specify the ratio and the
//! offset is solved for here:
//!
//! ```text
//! ratio = (offset / (offset + N - 1))^exponent
//! z      = ratio^(1 / exponent)
//! offset = z * (N - 1) / (1 - z)
//! ```
//!
//! A ratio near 0 gives an offset near 0 (maximum skew for the exponent), a ratio
//! near 1 gives a huge offset (nearly uniform).

use crate::error::ConfigError;

/// Convert a ratio in (0, 1) to the Zipf-Mandelbrot offset for domain size N
///
/// # Errors
///
/// Fails instead of returning NaN or infinity: `domain_size < 2`, a non-positive
/// or non-finite exponent, a ratio outside the open interval (0, 1), or a ratio so
/// close to 1 that the offset overflows.
///
/// # Example
///
/// ```
/// use zipfbench::distribution::offset::zipf_offset;
///
/// // exponent 1: offset = r * (N - 1) / (1 - r)
/// let offset = zipf_offset(101, 1.0, 0.5).unwrap();
/// assert!((offset - 100.0).abs() < 1e-9);
///
/// assert!(zipf_offset(101, 1.0, 1.0).is_err());
/// ```
pub fn zipf_offset(domain_size: u64, exponent: f64, ratio: f64) -> Result<f64, ConfigError> {
    if domain_size < 2 {
        return Err(ConfigError::InvalidDomainSize {
            field: "domain-size",
            value: domain_size,
            min: 2,
        });
    }
    if !(exponent.is_finite() && exponent > 0.0) {
        return Err(ConfigError::InvalidExponent {
            field: "exponent",
            value: exponent,
            requirement: "must be a finite value > 0",
        });
    }
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(ConfigError::InvalidRatio {
            field: "ratio",
            value: ratio,
        });
    }

    let z = ratio.powf(1.0 / exponent);
    let offset = z * (domain_size - 1) as f64 / (1.0 - z);

    // z rounds to 1.0 for ratios within an ulp of 1 under large exponents
    if !offset.is_finite() {
        return Err(ConfigError::DegenerateShape { exponent, offset });
    }
    Ok(offset)
}
