//! Bounded pseudo-Gaussian draws shared by the replacers and the rate shaper.

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draw a pseudo-Gaussian value in `[0, gap)`.
///
/// The distribution has mean `0.5 * gap` and standard deviation `0.2 * gap`,
/// so values cluster around the middle of the range. Out-of-range draws are
/// folded back with `abs` and a modulo rather than redrawn.
pub fn simple_gaussian<R: Rng>(rng: &mut R, gap: usize) -> usize {
    if gap == 0 {
        return 0;
    }
    match Normal::new(0.5 * gap as f64, 0.2 * gap as f64) {
        Ok(normal) => (normal.sample(rng).abs() as usize) % gap,
        // Unreachable for gap > 0, but a uniform draw beats a panic.
        Err(_) => rng.gen_range(0..gap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let v = simple_gaussian(&mut rng, 100);
            assert!(v < 100);
        }
    }

    #[test]
    fn test_zero_gap() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(simple_gaussian(&mut rng, 0), 0);
    }

    #[test]
    fn test_clusters_near_the_middle() {
        let mut rng = StdRng::seed_from_u64(42);

        let mid = (0..1000)
            .map(|_| simple_gaussian(&mut rng, 100))
            .filter(|v| (30..70).contains(v))
            .count();

        // mean 50, stddev 20: the central band should dominate.
        assert!(mid > 600, "only {mid} of 1000 draws landed in [30, 70)");
    }
}
