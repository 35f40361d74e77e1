//! Random-string replacement policy.

use rand::Rng;

/// Default character set: alphanumeric.
pub const DEFAULT_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces random strings with a length drawn uniformly from `[min, max]`
/// (exactly `min` when the bounds are equal) over a configurable character
/// set.
#[derive(Debug, Clone)]
pub struct StringReplacer {
    chars: Vec<char>,
    min: usize,
    max: usize,
}

impl StringReplacer {
    /// Create a new string replacer. An empty `chars` falls back to the
    /// alphanumeric default.
    pub fn new(chars: &str, min: usize, max: usize) -> Self {
        let chars = if chars.is_empty() {
            DEFAULT_CHARS.chars().collect()
        } else {
            chars.chars().collect()
        };
        Self { chars, min, max }
    }

    pub fn render<R: Rng>(&mut self, rng: &mut R) -> String {
        let length = if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        };

        (0..length)
            .map(|_| self.chars[rng.gen_range(0..self.chars.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_exact_length_when_bounds_equal() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut r = StringReplacer::new("", 8, 8);

        for _ in 0..20 {
            assert_eq!(r.render(&mut rng).len(), 8);
        }
    }

    #[test]
    fn test_length_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut r = StringReplacer::new("", 3, 10);

        for _ in 0..100 {
            let len = r.render(&mut rng).len();
            assert!((3..=10).contains(&len));
        }
    }

    #[test]
    fn test_custom_charset() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut r = StringReplacer::new("xyz", 16, 16);

        let s = r.render(&mut rng);
        assert!(s.chars().all(|c| "xyz".contains(c)));
    }
}
