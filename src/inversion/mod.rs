//! Sensor orientation estimation against a reference station.
//!
//! - `peak`: Welch periodogram peak search
//! - `filter`: Butterworth bandpass and corner policy
//! - `objective`: Rotation-correlation cost with continuity damping
//! - `monitor`: Progress and cancellation hooks
//! - `engine`: Windowed inversion and aggregation

pub mod engine;
pub mod filter;
pub mod monitor;
pub mod objective;
pub mod peak;

pub use engine::{
    aggregate, estimate_azimuth, Aggregate, AzimuthInversionEngine, AzimuthResult,
    InversionState, WindowSolution,
};
pub use filter::{BandpassFilter, CornerFrequencies};
pub use monitor::{CancellationToken, InversionMonitor, NoopMonitor};
pub use objective::{ContinuityPrior, CorrelationObjective};
pub use peak::SpectralPeakFinder;
