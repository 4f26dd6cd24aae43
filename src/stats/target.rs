//! The fixed bimodal density every sampler in the bank draws from.

use serde::{Deserialize, Serialize};

use super::density::GridPoint;

pub const TARGET_MIN: f64 = -3.0;
pub const TARGET_MAX: f64 = 3.0;
pub const TARGET_STEP: f64 = 0.1;

/// Discretised lookup table over `[TARGET_MIN, TARGET_MAX)`, normalised so the
/// tallest bin is exactly 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDensity {
    points: Vec<GridPoint>,
}

impl Default for TargetDensity {
    fn default() -> Self {
        Self::bimodal()
    }
}

impl TargetDensity {
    /// Mixture of two Gaussian bumps: weight 0.6 at +1 and 0.4 at -1.
    pub fn bimodal() -> Self {
        let len = ((TARGET_MAX - TARGET_MIN) / TARGET_STEP).round() as usize;
        let raw: Vec<GridPoint> = (0..len)
            .map(|i| {
                let x = TARGET_MIN + i as f64 * TARGET_STEP;
                let right = (-(x - 1.0).powi(2) / 0.5).exp();
                let left = (-(x + 1.0).powi(2) / 0.8).exp();
                GridPoint::new(x, 0.6 * right + 0.4 * left)
            })
            .collect();
        Self::normalized(raw)
    }

    /// Scale an arbitrary table so its maximum becomes 1.
    pub fn normalized(mut points: Vec<GridPoint>) -> Self {
        let max = points.iter().map(|p| p.y).fold(0.0, f64::max);
        if max > 0.0 {
            for p in &mut points {
                p.y /= max;
            }
        }
        Self { points }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bin that `x` falls into. May be negative or past the end.
    pub fn index_of(x: f64) -> i64 {
        ((x - TARGET_MIN) / TARGET_STEP).floor() as i64
    }

    /// Tabulated density at `x`; zero for any bin outside the table.
    pub fn lookup(&self, x: f64) -> f64 {
        let idx = Self::index_of(x);
        if idx < 0 {
            return 0.0;
        }
        self.points.get(idx as usize).map_or(0.0, |p| p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn table_shape() {
        let target = TargetDensity::bimodal();
        assert_eq!(target.len(), 60);
        assert_relative_eq!(target.points()[0].x, -3.0);
        assert_relative_eq!(target.points()[59].x, 2.9, epsilon = 1e-9);

        let max = target.points().iter().map(|p| p.y).fold(0.0, f64::max);
        assert_relative_eq!(max, 1.0);
        assert!(target.points().iter().all(|p| p.y > 0.0 && p.y <= 1.0));
    }

    #[test]
    fn taller_mode_is_on_the_right() {
        let target = TargetDensity::bimodal();
        assert_relative_eq!(target.lookup(1.0), 1.0, epsilon = 2e-2);
        assert!(target.lookup(1.0) > target.lookup(-1.0));
        assert!(target.lookup(0.0) < target.lookup(-1.0));
    }

    #[test]
    fn lookup_outside_table_is_zero() {
        let target = TargetDensity::bimodal();
        assert_eq!(target.lookup(-3.01), 0.0);
        assert_eq!(target.lookup(3.0), 0.0);
        assert_eq!(target.lookup(42.0), 0.0);
        assert!(target.lookup(-3.0) > 0.0);
        assert!(target.lookup(2.99) > 0.0);
    }
}
