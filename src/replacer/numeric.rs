//! Integer and float replacement policies.

use rand::Rng;

use crate::replacer::gauss::simple_gaussian;
use crate::replacer::Method;

/// Produces integers in `[min, max]`, sequentially or pseudo-randomly.
#[derive(Debug, Clone)]
pub struct IntegerReplacer {
    method: Method,
    min: i64,
    max: i64,
    curr: i64,
}

impl IntegerReplacer {
    /// Create a new integer replacer with the cursor at `min`.
    pub fn new(method: Method, min: i64, max: i64) -> Self {
        Self {
            method,
            min,
            max,
            curr: min,
        }
    }

    /// Return the current value and advance the cursor.
    ///
    /// `next`/`prev` wrap at the range bounds. `random` draws from a bounded
    /// pseudo-Gaussian over the inclusive range (mean at the midpoint, stddev
    /// 20% of the width), so values cluster near the center. The clustering
    /// is intentional.
    pub fn render<R: Rng>(&mut self, rng: &mut R) -> String {
        let value = match self.method {
            Method::Next => {
                let v = self.curr;
                self.curr = if self.curr >= self.max {
                    self.min
                } else {
                    self.curr + 1
                };
                v
            }
            Method::Prev => {
                let v = self.curr;
                self.curr = if self.curr <= self.min {
                    self.max
                } else {
                    self.curr - 1
                };
                v
            }
            Method::Random => {
                let gap = (self.max - self.min + 1).max(1) as usize;
                self.min + simple_gaussian(rng, gap) as i64
            }
        };
        value.to_string()
    }
}

/// Produces uniform floats in `[min, max]` with a fixed decimal precision.
#[derive(Debug, Clone)]
pub struct FloatReplacer {
    min: f64,
    max: f64,
    precision: usize,
}

impl FloatReplacer {
    pub fn new(min: f64, max: f64, precision: usize) -> Self {
        Self {
            min,
            max,
            precision,
        }
    }

    pub fn render<R: Rng>(&mut self, rng: &mut R) -> String {
        let v = if self.min < self.max {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        };
        format!("{v:.prec$}", prec = self.precision)
    }
}
