// In crates/strategies/src/lib.rs

use core_types::{IndicatorSnapshot, Signal};

pub mod combined;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod resolver;
pub mod rsi_only;
pub mod types;

pub use error::{Error, Result};
pub use factory::create_strategy;
pub use indicators::{IndicatorSeries, compute_snapshots};
pub use resolver::{SignalResolver, resolve_signal};
pub use types::{IndicatorSettings, SignalThresholds};

/// The universal interface for a signal strategy.
///
/// A strategy maps the indicator values of a single observation to a
/// discrete `Signal`. Implementations are pure: the same snapshot always
/// yields the same decision.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    fn assess(&self, snapshot: &IndicatorSnapshot) -> Signal;
}
