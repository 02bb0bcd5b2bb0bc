//! Skewed rank distributions
//!
//! This module turns the human-facing distribution parameters (domain size,
//! exponent, ratio) into samplers that draw raw *ranks* in `[0, N)`. Ranks are
//! heavily biased toward zero; the permutation layer is responsible for spreading
//! them over the id space afterwards.
//!
//! # Parameters
//!
//! - **domain_size**: number of distinct ids in the domain (rows or columns)
//! - **exponent**: Zipf-Mandelbrot exponent, larger is more skewed
//! - **ratio**: probability of the least likely rank divided by the probability
//!   of the most likely rank, in (0, 1). Unlike the raw offset it means the same
//!   thing for every domain size.
//!
//! # Example
//!
//! ```
//! use zipfbench::distribution::{Domain, DistributionConfig, RankSampler};
//! use zipfbench::distribution::zipf::ZipfSampler;
//!
//! let config = DistributionConfig::new(Domain::Bitmap, 1000, 1.5, 0.1);
//! let mut sampler = ZipfSampler::new(&config, 42).unwrap();
//! let rank = sampler.next_rank();
//! assert!(rank < 1000);
//! ```

pub mod offset;
pub mod zipf;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rank sampler trait
///
/// Each call draws one rank in `[0, domain_size())`. Draws are independent and
/// identically distributed; the only state that changes is the position of the
/// sampler's private random stream.
///
/// # Thread Safety
///
/// Samplers must be `Send` so a driver can be moved onto its agent thread. They are
/// never shared: every driver owns its own samplers.
pub trait RankSampler: Send {
    /// Draw the next rank in `[0, domain_size())`
    fn next_rank(&mut self) -> u64;

    /// Number of distinct ranks this sampler can produce
    fn domain_size(&self) -> u64;
}

/// The two id domains a workload draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Row ids (bitmap ids)
    Bitmap,
    /// Column ids (profile ids)
    Profile,
}

impl Domain {
    pub fn range_field(self) -> &'static str {
        match self {
            Domain::Bitmap => "bitmap-id-range",
            Domain::Profile => "profile-id-range",
        }
    }

    pub fn exponent_field(self) -> &'static str {
        match self {
            Domain::Bitmap => "bitmap-exponent",
            Domain::Profile => "profile-exponent",
        }
    }

    pub fn ratio_field(self) -> &'static str {
        match self {
            Domain::Bitmap => "bitmap-ratio",
            Domain::Profile => "profile-ratio",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Bitmap => write!(f, "bitmap"),
            Domain::Profile => write!(f, "profile"),
        }
    }
}

/// Shape of one domain's rank distribution
///
/// Immutable once built. Validation is separate from construction so that a
/// config can be assembled first and then checked with field names that match
/// the config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionConfig {
    pub domain: Domain,
    pub domain_size: u64,
    pub exponent: f64,
    pub ratio: f64,
}

impl DistributionConfig {
    pub fn new(domain: Domain, domain_size: u64, exponent: f64, ratio: f64) -> Self {
        Self {
            domain,
            domain_size,
            exponent,
            ratio,
        }
    }

    /// Check every parameter, reporting the offending config field
    ///
    /// The exponent must also differ from 1, which the rejection-inversion sampler
    /// cannot represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain_size < 2 {
            return Err(ConfigError::InvalidDomainSize {
                field: self.domain.range_field(),
                value: self.domain_size,
                min: 2,
            });
        }
        if !(self.exponent.is_finite() && self.exponent > 0.0) {
            return Err(ConfigError::InvalidExponent {
                field: self.domain.exponent_field(),
                value: self.exponent,
                requirement: "must be a finite value > 0",
            });
        }
        if self.exponent == 1.0 {
            return Err(ConfigError::InvalidExponent {
                field: self.domain.exponent_field(),
                value: self.exponent,
                requirement: "must not be exactly 1",
            });
        }
        if !(self.ratio > 0.0 && self.ratio < 1.0) {
            return Err(ConfigError::InvalidRatio {
                field: self.domain.ratio_field(),
                value: self.ratio,
            });
        }
        Ok(())
    }

    /// Zipf-Mandelbrot offset derived from the ratio
    pub fn offset(&self) -> Result<f64, ConfigError> {
        self.validate()?;
        offset::zipf_offset(self.domain_size, self.exponent, self.ratio)
    }
}
