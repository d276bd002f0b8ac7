//! Luma histogram with percentile lookup.
//!
//! Used by the quality analyzer to measure contrast as the spread between the
//! 5th and 95th luminance percentiles.

use crate::luminance::luma_bin;

/// 256-bin histogram of rounded luma values.
#[derive(Debug, Clone)]
pub struct LumaHistogram {
    bins: [u32; 256],
    total: u64,
}

impl Default for LumaHistogram {
    fn default() -> Self {
        Self {
            bins: [0; 256],
            total: 0,
        }
    }
}

impl LumaHistogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one pixel with the given unrounded luma.
    #[inline]
    pub fn record(&mut self, luma: f32) {
        self.bins[luma_bin(luma) as usize] += 1;
        self.total += 1;
    }

    pub fn bins(&self) -> &[u32; 256] {
        &self.bins
    }

    /// Number of recorded pixels.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Smallest bin whose cumulative count reaches `quantile` of the total.
    ///
    /// `quantile` is clamped to `[0, 1]`. An empty histogram returns 255.
    pub fn percentile(&self, quantile: f64) -> u8 {
        let target = self.total as f64 * quantile.clamp(0.0, 1.0);
        let mut cumulative = 0u64;
        for (bin, &count) in self.bins.iter().enumerate() {
            cumulative += count as u64;
            if cumulative as f64 >= target && cumulative > 0 {
                return bin as u8;
            }
        }
        255
    }
}
