//! Ordered threshold tables and the null-excluding weighted mean every
//! scorer is built from.

/// Which side of each bound a value must fall on to earn the step's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// First step with `value >= bound` wins (higher is better)
    AtLeast,
    /// First step with `value <= bound` wins (lower is better)
    AtMost,
}

/// A list of `(bound, score)` steps evaluated in order, with a fallback
/// score once all steps are exhausted.
#[derive(Debug, Clone, Copy)]
pub struct BucketTable {
    direction: Direction,
    steps: &'static [(f64, f64)],
    fallback: f64,
}

impl BucketTable {
    pub const fn at_least(steps: &'static [(f64, f64)], fallback: f64) -> Self {
        Self {
            direction: Direction::AtLeast,
            steps,
            fallback,
        }
    }

    pub const fn at_most(steps: &'static [(f64, f64)], fallback: f64) -> Self {
        Self {
            direction: Direction::AtMost,
            steps,
            fallback,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        for (bound, score) in self.steps {
            let hit = match self.direction {
                Direction::AtLeast => value >= *bound,
                Direction::AtMost => value <= *bound,
            };
            if hit {
                return *score;
            }
        }
        self.fallback
    }

    /// Bucket an optional value; absence stays absent
    pub fn score_opt(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| self.score(v))
    }
}

/// Weighted mean over the present sub-signals only.
///
/// Missing signals are dropped and the remaining weights renormalized, so a
/// gap never counts as zero, best case or worst case. All missing gives `None`.
pub fn weighted_mean(signals: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut sum = 0.0;
    let mut used_weight = 0.0;

    for (value, weight) in signals {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            sum += v * weight;
            used_weight += weight;
        }
    }

    if used_weight > 0.0 {
        Some(sum / used_weight)
    } else {
        None
    }
}

/// Plain mean of the present values
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HIGHER: BucketTable = BucketTable::at_least(&[(10.0, 10.0), (5.0, 5.0)], 0.0);
    const LOWER: BucketTable = BucketTable::at_most(&[(10.0, 10.0), (20.0, 5.0)], 1.0);

    #[test]
    fn test_at_least_boundaries_inclusive() {
        assert_eq!(HIGHER.score(10.0), 10.0);
        assert_eq!(HIGHER.score(9.999), 5.0);
        assert_eq!(HIGHER.score(5.0), 5.0);
        assert_eq!(HIGHER.score(4.9), 0.0);
    }

    #[test]
    fn test_at_most_boundaries_inclusive() {
        assert_eq!(LOWER.score(10.0), 10.0);
        assert_eq!(LOWER.score(10.01), 5.0);
        assert_eq!(LOWER.score(20.0), 5.0);
        assert_eq!(LOWER.score(25.0), 1.0);
        assert_eq!(LOWER.score_opt(None), None);
    }

    #[test]
    fn test_weighted_mean_renormalizes_over_present() {
        let all = weighted_mean(&[(Some(10.0), 0.5), (Some(0.0), 0.5)]).unwrap();
        assert_relative_eq!(all, 5.0);

        // The missing half drops out instead of pulling the mean to 0 or 10
        let partial = weighted_mean(&[(Some(8.0), 0.6), (None, 0.4)]).unwrap();
        assert_relative_eq!(partial, 8.0);

        assert_eq!(weighted_mean(&[(None, 0.6), (None, 0.4)]), None);
        assert_eq!(weighted_mean(&[]), None);
    }

    #[test]
    fn test_mean_present() {
        assert_eq!(mean_present(&[Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean_present(&[None, None]), None);
    }
}
