use eyre::Result;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    prelude::*,
};

pub use fmt::Style;

/// Configure a `tracing_subscriber::fmt` Layer outputting to stdout
pub mod fmt;

/// Logging level. A "higher level" means more will be logged.
#[derive(Default, Debug, Clone, Copy, serde::Deserialize, PartialOrd, Ord, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Off
    Off = 0,
    /// Error
    Error = 1,
    /// Warn
    Warn = 2,
    /// Debug
    Debug = 3,
    /// Trace
    Trace = 5,
    /// Info
    #[serde(other)]
    #[default]
    Info = 4,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> LevelFilter {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
        }
    }
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TracingConfig {
    /// Output format
    #[serde(default)]
    pub fmt: Style,
    /// Most verbose level logged
    #[serde(default)]
    pub level: Level,
}

impl TracingConfig {
    /// Per target filter. HTTP client internals only log below `info` when
    /// tracing.
    pub fn targets(&self) -> Targets {
        let mut targets = Targets::new().with_default(self.level);
        if self.level < Level::Trace {
            targets = targets
                .with_target("hyper", Level::Info)
                .with_target("reqwest", Level::Info)
                .with_target("h2", Level::Info);
        }
        targets
    }

    /// Attempt to instantiate and register a tracing subscriber setup from
    /// settings.
    pub fn start_tracing(&self) -> Result<()> {
        let subscriber = tracing_subscriber::Registry::default()
            .with(self.targets())
            .with(self.fmt.layer())
            .with(tracing_error::ErrorLayer::default());

        subscriber.try_init()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use tracing::Level as TracingLevel;

    use super::*;

    #[test]
    fn levels_are_ordered_by_verbosity() {
        assert!(Level::Info < Level::Debug);
        assert!(Level::Debug < Level::Trace);
        assert_eq!(LevelFilter::from(Level::Warn), LevelFilter::WARN);

        let level: Level = serde_json::from_str(r#""verbose""#).unwrap();
        assert_eq!(level, Level::Info);
    }

    #[test]
    fn http_internals_are_quiet_below_trace() {
        let config = TracingConfig {
            fmt: Style::Compact,
            level: Level::Debug,
        };
        let targets = config.targets();
        assert!(targets.would_enable("hyperlane_ism", &TracingLevel::DEBUG));
        assert!(!targets.would_enable("hyper::proto", &TracingLevel::DEBUG));

        let tracing = TracingConfig {
            fmt: Style::Compact,
            level: Level::Trace,
        };
        assert!(tracing.targets().would_enable("hyper::proto", &TracingLevel::DEBUG));
    }
}
