use tracing::span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace, Info, Debug, Warn, Error
}
impl LogLevel {
    pub fn to_log_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Self{
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::default(),
        }
    }
}
impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

const SPAN_NAME: &str = "appcat";
pub struct Logger;

impl Logger {
    /// Initialize the logger. Logs go to stderr so stdout stays machine-readable.
    pub fn init(level: LogLevel) {
        // a second init (e.g. from tests) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_max_level(level.to_log_level())
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn with_span<T>(f: impl FnOnce() -> T) -> T {
        let span = span!(tracing::Level::INFO, SPAN_NAME);
        let _guard = span.enter(); // Enter the span context
        f() // Execute the function within the span
    }
}

pub fn setup_logger(level: &str) {
    Logger::init(LogLevel::from_str(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(LogLevel::from_str("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::from_str("trace"), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("error").to_log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn with_span_returns_closure_value() {
        setup_logger("error");
        setup_logger("info");
        assert_eq!(Logger::with_span(|| 41 + 1), 42);
    }
}
