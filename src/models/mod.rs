//! Forecasting models behind the [`Forecaster`] trait.

mod drift;
mod holt;
mod traits;

pub use drift::RandomWalkWithDrift;
pub use holt::HoltLinearTrend;
pub use traits::{BoxedForecaster, Forecaster, ModelKind};
