// In crates/strategies/src/resolver.rs

use core_types::{IndicatorSnapshot, Signal, SignalRecord, StrategyKind};

use crate::factory::create_strategy;
use crate::types::SignalThresholds;
use crate::Strategy;

/// Returns the stored decision when there is one, otherwise asks the strategy.
pub fn resolve_signal(
    strategy: &dyn Strategy,
    stored: Option<Signal>,
    snapshot: &IndicatorSnapshot,
) -> Signal {
    match stored {
        Some(signal) => signal,
        None => strategy.assess(snapshot),
    }
}

/// Picks the decision for a logged row under one strategy.
///
/// For `combined` a stored `signal_combined` is reused as-is. The RSI-only
/// rule is always recomputed from the row's RSI.
pub struct SignalResolver {
    kind: StrategyKind,
    strategy: Box<dyn Strategy + Send + Sync>,
}

impl SignalResolver {
    pub fn new(kind: StrategyKind, thresholds: SignalThresholds) -> Self {
        Self {
            kind,
            strategy: create_strategy(kind, thresholds),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// The precomputed decision this resolver honours for `record`, if any.
    pub fn stored_signal(&self, record: &SignalRecord) -> Option<Signal> {
        match self.kind {
            StrategyKind::Combined => record.signal_combined,
            StrategyKind::RsiOnly => None,
        }
    }

    /// Whether `record` carries everything needed to produce a decision.
    ///
    /// A combined recomputation is impossible without both EMAs.
    pub fn can_resolve(&self, record: &SignalRecord) -> bool {
        match self.kind {
            StrategyKind::Combined => {
                record.signal_combined.is_some()
                    || (record.ema_short.is_some() && record.ema_long.is_some())
            }
            StrategyKind::RsiOnly => true,
        }
    }

    pub fn resolve(&self, record: &SignalRecord) -> Signal {
        resolve_signal(
            self.strategy.as_ref(),
            self.stored_signal(record),
            &record.snapshot(),
        )
    }
}
