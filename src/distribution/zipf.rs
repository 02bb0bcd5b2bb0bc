//! Zipf-Mandelbrot rank sampler
//!
//! Draws ranks `k` in `[0, N)` with `P(k) ∝ (v + k)^(-q)`, where `q` is the
//! exponent and `v` the offset derived from the configured ratio.
//!
//! # Algorithm
//!
//! Rejection-inversion (Hörmann & Derflinger, "Rejection-inversion to generate
//! variates from monotone discrete distributions", 1996). The hat function is the
//! continuous density `(v + x)^(-q)`; its integral `H` and inverse are available in
//! closed form, so each draw costs one uniform variate, one inversion and one
//! evaluation of `H`. No tables are built, so the domain size can be anything up
//! to 2^53.
//!
//! Rank 0 owns the segment of length `v^(-q)` just below `H(0.5)` and is returned
//! without inverting `H`. Only points in `[H(0.5), H(N - 0.5)]` are inverted, and
//! those are always inside the range of `H`, which keeps exponents below 1 with
//! tiny offsets exact.
//!
//! # Characteristics
//!
//! - Rank 0 is always the most frequent rank
//! - Works for every exponent > 0 (except exactly 1) and every offset >= 0
//! - Offset 0 puts all mass on rank 0; an offset too large for `H` to resolve
//!   (ratio indistinguishable from 1) degrades to a uniform draw

use super::{DistributionConfig, RankSampler};
use crate::error::ConfigError;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// How draws are produced for a given shape
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    /// `v^(-q)` overflows: rank 0 has all the mass
    HeadOnly,
    /// Offset so large that every rank has the same weight in f64
    Uniform,
    RejectionInversion,
}

/// Skewed rank sampler over `[0, N)`
///
/// Owns its random stream. Two samplers built from the same config and seed
/// produce the same sequence of ranks.
pub struct ZipfSampler {
    rng: Xoshiro256PlusPlus,

    shape: Shape,

    domain_size: u64,

    /// Largest rank as a float (N - 1)
    imax: f64,

    /// Offset v
    v: f64,

    /// Exponent q
    q: f64,

    one_minus_q: f64,
    one_minus_q_inv: f64,

    /// H(imax + 0.5), one end of the uniform range
    hxm: f64,

    /// H(0.5); uniform points below it belong to rank 0
    h_half: f64,

    /// H(0.5) - v^(-q) - hxm, signed width of the uniform range
    hx0_minus_hxm: f64,
}

impl ZipfSampler {
    /// Build a sampler for `config`, seeding its private stream with `seed`
    ///
    /// # Errors
    ///
    /// Returns the config's validation error. Every valid config yields a sampler.
    pub fn new(config: &DistributionConfig, seed: u64) -> Result<Self, ConfigError> {
        let offset = match config.offset() {
            Ok(offset) => offset,
            // ratio rounds to 1 after the exponent is applied
            Err(ConfigError::DegenerateShape { .. }) => f64::INFINITY,
            Err(e) => return Err(e),
        };
        Self::with_offset(config.domain_size, config.exponent, offset, seed)
    }

    /// Build a sampler from a raw offset instead of a ratio
    ///
    /// `offset` may be any non-negative value, including infinity.
    pub fn with_offset(
        domain_size: u64,
        exponent: f64,
        offset: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if domain_size < 2 {
            return Err(ConfigError::InvalidDomainSize {
                field: "domain-size",
                value: domain_size,
                min: 2,
            });
        }
        if !(exponent.is_finite() && exponent > 0.0 && exponent != 1.0) {
            return Err(ConfigError::InvalidExponent {
                field: "exponent",
                value: exponent,
                requirement: "must be a finite value > 0 and != 1",
            });
        }
        if !(offset >= 0.0) {
            return Err(ConfigError::DegenerateShape { exponent, offset });
        }

        let mut sampler = Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            shape: Shape::RejectionInversion,
            domain_size,
            imax: (domain_size - 1) as f64,
            v: offset,
            q: exponent,
            one_minus_q: 1.0 - exponent,
            one_minus_q_inv: 1.0 / (1.0 - exponent),
            hxm: 0.0,
            h_half: 0.0,
            hx0_minus_hxm: 0.0,
        };

        if !offset.is_finite() {
            sampler.shape = Shape::Uniform;
            return Ok(sampler);
        }

        let head = sampler.weight(0.0);
        if !head.is_finite() {
            sampler.shape = Shape::HeadOnly;
            return Ok(sampler);
        }

        sampler.hxm = sampler.h(sampler.imax + 0.5);
        sampler.h_half = sampler.h(0.5);
        let tail = sampler.hxm - sampler.h_half;
        if !(tail.is_finite() && tail > 0.0) {
            sampler.shape = Shape::Uniform;
            return Ok(sampler);
        }
        sampler.hx0_minus_hxm = -(tail + head);

        Ok(sampler)
    }

    /// Offset v in use
    pub fn offset(&self) -> f64 {
        self.v
    }

    /// Exponent q in use
    pub fn exponent(&self) -> f64 {
        self.q
    }

    /// Unnormalized mass of rank k: (v + k)^(-q)
    #[inline]
    fn weight(&self, k: f64) -> f64 {
        (-self.q * (self.v + k).ln()).exp()
    }

    /// Integral of the hat function: (v + x)^(1-q) / (1-q)
    #[inline]
    fn h(&self, x: f64) -> f64 {
        (self.one_minus_q * (self.v + x).ln()).exp() * self.one_minus_q_inv
    }

    /// Inverse of `h`
    #[inline]
    fn h_inv(&self, x: f64) -> f64 {
        (self.one_minus_q_inv * (self.one_minus_q * x).ln()).exp() - self.v
    }
}

impl RankSampler for ZipfSampler {
    fn next_rank(&mut self) -> u64 {
        match self.shape {
            Shape::HeadOnly => return 0,
            Shape::Uniform => return self.rng.gen_range(0..self.domain_size),
            Shape::RejectionInversion => {}
        }

        loop {
            let r: f64 = self.rng.gen();
            let ur = self.hxm + r * self.hx0_minus_hxm;
            if ur < self.h_half {
                return 0;
            }

            let x = self.h_inv(ur);
            // r == 0 lands exactly on imax + 0.5, which rounds one past the end
            let k = (x + 0.5).floor().clamp(0.0, self.imax);

            if ur >= self.h(k + 0.5) - self.weight(k) {
                return k as u64;
            }
        }
    }

    fn domain_size(&self) -> u64 {
        self.domain_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Domain;

    fn config(n: u64, exponent: f64, ratio: f64) -> DistributionConfig {
        DistributionConfig::new(Domain::Bitmap, n, exponent, ratio)
    }

    #[test]
    fn test_zipf_sampler_basic() {
        let mut sampler = ZipfSampler::new(&config(1000, 1.5, 0.1), 7).unwrap();
        for _ in 0..10_000 {
            assert!(sampler.next_rank() < 1000);
        }
        assert_eq!(sampler.domain_size(), 1000);
    }

    #[test]
    fn test_zipf_sampler_seeded() {
        let mut s1 = ZipfSampler::new(&config(1000, 1.5, 0.1), 12345).unwrap();
        let mut s2 = ZipfSampler::new(&config(1000, 1.5, 0.1), 12345).unwrap();

        // Same seed should produce same sequence
        for _ in 0..1000 {
            assert_eq!(s1.next_rank(), s2.next_rank());
        }
    }

    #[test]
    fn test_zipf_sampler_seeds_differ() {
        let mut s1 = ZipfSampler::new(&config(1_000_000, 1.2, 0.5), 1).unwrap();
        let mut s2 = ZipfSampler::new(&config(1_000_000, 1.2, 0.5), 2).unwrap();
        let a: Vec<u64> = (0..100).map(|_| s1.next_rank()).collect();
        let b: Vec<u64> = (0..100).map(|_| s2.next_rank()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zipf_sampler_skew() {
        let n = 100u64;
        let mut sampler = ZipfSampler::new(&config(n, 1.5, 0.01), 42).unwrap();
        let mut counts = vec![0u32; n as usize];

        for _ in 0..200_000 {
            counts[sampler.next_rank() as usize] += 1;
        }

        let first = counts[0];
        let middle = counts[(n / 2) as usize];
        let last = counts[(n - 1) as usize];
        assert!(
            first >= middle && middle >= last,
            "rank frequencies should decrease: first={} middle={} last={}",
            first,
            middle,
            last
        );
        // ratio 0.01 means rank 0 should be roughly 100x as likely as rank N-1
        assert!(first > last * 20, "first={} last={}", first, last);
    }

    #[test]
    fn test_zipf_sampler_matches_mass_function() {
        let n = 10u64;
        let exponent = 2.0;
        let mut sampler = ZipfSampler::new(&config(n, exponent, 0.05), 99).unwrap();
        let v = sampler.offset();

        let weights: Vec<f64> = (0..n).map(|k| (v + k as f64).powf(-exponent)).collect();
        let total: f64 = weights.iter().sum();

        let draws = 400_000u32;
        let mut counts = vec![0u32; n as usize];
        for _ in 0..draws {
            counts[sampler.next_rank() as usize] += 1;
        }

        for k in 0..n as usize {
            let expected = weights[k] / total;
            let observed = counts[k] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "rank {}: expected {:.4}, observed {:.4}",
                k,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_zipf_sampler_exponent_below_one() {
        let n = 1000u64;
        let mut sampler = ZipfSampler::new(&config(n, 0.7, 0.5), 3).unwrap();
        let mut low = 0u32;
        let mut high = 0u32;
        for _ in 0..50_000 {
            let rank = sampler.next_rank();
            assert!(rank < n);
            if rank < n / 10 {
                low += 1;
            } else if rank >= n - n / 10 {
                high += 1;
            }
        }
        assert!(low > high, "low={} high={}", low, high);
    }

    #[test]
    fn test_zipf_sampler_two_ranks() {
        let mut sampler = ZipfSampler::new(&config(2, 1.5, 0.25), 5).unwrap();
        let mut seen = [0u32; 2];
        for _ in 0..10_000 {
            seen[sampler.next_rank() as usize] += 1;
        }
        assert!(seen[0] > seen[1]);
        assert!(seen[1] > 0);
    }

    #[test]
    fn test_zipf_sampler_rejects_invalid_config() {
        assert!(ZipfSampler::new(&config(1, 1.5, 0.1), 0).is_err());
        assert!(ZipfSampler::new(&config(100, 0.0, 0.1), 0).is_err());
        assert!(ZipfSampler::new(&config(100, 1.0, 0.1), 0).is_err());
        assert!(ZipfSampler::new(&config(100, 1.5, 0.0), 0).is_err());
        assert!(ZipfSampler::new(&config(100, 1.5, 1.0), 0).is_err());
    }

    #[test]
    fn test_zipf_sampler_rejects_negative_offset() {
        assert!(matches!(
            ZipfSampler::with_offset(100, 1.5, -1.0, 0),
            Err(ConfigError::DegenerateShape { .. })
        ));
        assert!(ZipfSampler::with_offset(100, 1.5, f64::NAN, 0).is_err());
    }

    #[test]
    fn test_zipf_sampler_small_exponent_tiny_ratio() {
        // q < 1 with a tiny offset: H(0.5) - v^(-q) lies outside the range of H
        let mut sampler = ZipfSampler::new(&config(1000, 0.5, 0.01), 11).unwrap();
        assert_eq!(sampler.shape, Shape::RejectionInversion);
        for _ in 0..10_000 {
            assert!(sampler.next_rank() < 1000);
        }

        let mut sampler = ZipfSampler::with_offset(100, 0.5, 0.01, 0).unwrap();
        assert!(sampler.next_rank() < 100);
    }

    #[test]
    fn test_zipf_sampler_small_exponent_matches_mass_function() {
        let n = 10u64;
        let exponent = 0.5;
        let mut sampler = ZipfSampler::new(&config(n, exponent, 0.01), 21).unwrap();
        let v = sampler.offset();

        let weights: Vec<f64> = (0..n).map(|k| (v + k as f64).powf(-exponent)).collect();
        let total: f64 = weights.iter().sum();

        let draws = 400_000u32;
        let mut counts = vec![0u32; n as usize];
        for _ in 0..draws {
            counts[sampler.next_rank() as usize] += 1;
        }

        for k in 0..n as usize {
            let expected = weights[k] / total;
            let observed = counts[k] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "rank {}: expected {:.4}, observed {:.4}",
                k,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_zipf_sampler_zero_offset_is_all_head() {
        let mut sampler = ZipfSampler::with_offset(100, 1.5, 0.0, 0).unwrap();
        assert!((0..1000).all(|_| sampler.next_rank() == 0));
    }

    #[test]
    fn test_zipf_sampler_unresolvable_ratio_is_uniform() {
        // 0.5 ^ 1e-300 rounds to 1, so the offset overflows
        let mut sampler = ZipfSampler::new(&config(10, 1e300, 0.5), 4).unwrap();
        assert_eq!(sampler.shape, Shape::Uniform);

        let mut counts = [0u32; 10];
        for _ in 0..100_000 {
            counts[sampler.next_rank() as usize] += 1;
        }
        for (rank, &count) in counts.iter().enumerate() {
            assert!((9_000..11_000).contains(&count), "rank {}: {}", rank, count);
        }
    }
}
