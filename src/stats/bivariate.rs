//! Bivariate normal density field and correlated sample pairs.

use std::f64::consts::PI;

use error_stack::Report;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampler::box_muller;
use crate::ProbVizError;

pub const DEFAULT_GRID: usize = 50;
pub const DEFAULT_SAMPLES: usize = 2000;
pub const DEFAULT_RANGE: (f64, f64) = (-3.0, 3.0);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BivariateNormal {
    pub mean: [f64; 2],
    pub std: [f64; 2],
    /// Correlation coefficient, strictly inside (-1, 1).
    pub rho: f64,
}

impl Default for BivariateNormal {
    fn default() -> Self {
        Self {
            mean: [0.0, 0.0],
            std: [1.0, 1.0],
            rho: 0.7,
        }
    }
}

/// Density values on an `n x n` grid, row-major with `y` as the outer index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityField {
    pub n: usize,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<f64>,
}

impl DensityField {
    pub fn at(&self, xi: usize, yi: usize) -> Option<f64> {
        (xi < self.n && yi < self.n).then(|| self.values[yi * self.n + xi])
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

impl BivariateNormal {
    pub fn with_rho(rho: f64) -> Self {
        Self {
            rho,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(self.std[0] > 0.0 && self.std[1] > 0.0) {
            return Err(Report::new(ProbVizError::InvalidParameter)
                .attach(format!("standard deviations must be positive, got {:?}", self.std)));
        }
        if !(self.rho > -1.0 && self.rho < 1.0) {
            return Err(Report::new(ProbVizError::InvalidParameter)
                .attach(format!("correlation must lie in (-1, 1), got {}", self.rho)));
        }
        Ok(())
    }

    /// Height of the density at its mean.
    pub fn peak(&self) -> f64 {
        1.0 / (2.0 * PI * self.std[0] * self.std[1] * (1.0 - self.rho * self.rho).sqrt())
    }

    pub fn density(&self, x: f64, y: f64) -> f64 {
        let one_minus_rho2 = 1.0 - self.rho * self.rho;
        let zx = (x - self.mean[0]) / self.std[0];
        let zy = (y - self.mean[1]) / self.std[1];
        let quad = zx * zx + zy * zy - 2.0 * self.rho * zx * zy;
        self.peak() * (-quad / (2.0 * one_minus_rho2)).exp()
    }

    /// Evaluate on `n` points per axis at `lo + i * (hi - lo) / n`.
    ///
    /// The upper bound is exclusive, so an even `n` over a symmetric range puts
    /// a grid line exactly through zero.
    pub fn density_field(&self, n: usize, lo: f64, hi: f64) -> DensityField {
        let step = (hi - lo) / n.max(1) as f64;
        let axis: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();

        let values = axis
            .iter()
            .flat_map(|&y| axis.iter().map(move |&x| (x, y)))
            .map(|(x, y)| self.density(x, y))
            .collect();

        DensityField {
            n,
            xs: axis.clone(),
            ys: axis,
            values,
        }
    }

    pub fn default_field(&self) -> DensityField {
        self.density_field(DEFAULT_GRID, DEFAULT_RANGE.0, DEFAULT_RANGE.1)
    }

    /// Draw correlated pairs: `x1 = z1`, `x2 = rho * z1 + sqrt(1 - rho^2) * z2`,
    /// then scale and shift each coordinate.
    pub fn correlated_samples<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<[f64; 2]> {
        let mix = (1.0 - self.rho * self.rho).sqrt();
        (0..count)
            .map(|_| {
                let (z1, z2) = box_muller(rng);
                [
                    self.mean[0] + self.std[0] * z1,
                    self.mean[1] + self.std[1] * (self.rho * z1 + mix * z2),
                ]
            })
            .collect()
    }
}
