// In app/src/telemetry.rs

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Parses a configured level name, falling back to INFO.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// The per-target filter: our crates at `level`, HTTP internals at WARN.
pub fn targets(level: Level) -> Targets {
    Targets::new()
        .with_target("hyper", Level::WARN)
        .with_target("hyper_util", Level::WARN)
        .with_target("reqwest", Level::WARN)
        .with_default(level)
}

/// Installs the global subscriber. Logs go to stderr so command output on stdout stays clean.
pub fn init(log_level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(targets(parse_level(log_level)));
    tracing_subscriber::registry().with(fmt_layer).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn http_internals_are_quieter() {
        let targets = targets(Level::DEBUG);
        assert!(targets.would_enable("engine", &Level::DEBUG));
        assert!(!targets.would_enable("reqwest::connect", &Level::INFO));
        assert!(targets.would_enable("hyper", &Level::WARN));
    }
}
