//! Numerical core: closed-form densities, the bimodal sampling target,
//! the sampler bank and the bivariate normal generator.
//!
//! Everything in here is a pure function of its inputs. Randomness is always
//! injected by the caller as a `rand::Rng`, so a seeded generator reproduces
//! every result exactly.

pub mod bivariate;
pub mod density;
pub mod describe;
pub mod sampler;
pub mod target;

pub use bivariate::{BivariateNormal, DensityField};
pub use density::{DistributionKind, DistributionSpec, GridPoint, Support};
pub use describe::Description;
pub use sampler::{Sample, SampleSet, SamplerConfig, SamplingMethod};
pub use target::TargetDensity;
