use crate::combined::RsiEmaCombined;
use crate::rsi_only::RsiOnly;
use crate::types::SignalThresholds;
use crate::Strategy;
use core_types::StrategyKind;

/// Builds the strategy instance selected by `kind`.
pub fn create_strategy(
    kind: StrategyKind,
    thresholds: SignalThresholds,
) -> Box<dyn Strategy + Send + Sync> {
    match kind {
        StrategyKind::Combined => Box::new(RsiEmaCombined::new(thresholds)),
        StrategyKind::RsiOnly => Box::new(RsiOnly::new(thresholds)),
    }
}
