use std::fmt;

/// Leveled sink the session manager reports through.
///
/// Each method takes a message plus any number of loggable values.
pub trait SessionLogger: Send + Sync {
    fn debug(&self, message: &str, values: &[&dyn fmt::Debug]);
    fn info(&self, message: &str, values: &[&dyn fmt::Debug]);
    fn warn(&self, message: &str, values: &[&dyn fmt::Debug]);
    fn error(&self, message: &str, values: &[&dyn fmt::Debug]);
}

/// Discards everything. Used when no logger is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl SessionLogger for NoopLogger {
    fn debug(&self, _message: &str, _values: &[&dyn fmt::Debug]) {}
    fn info(&self, _message: &str, _values: &[&dyn fmt::Debug]) {}
    fn warn(&self, _message: &str, _values: &[&dyn fmt::Debug]) {}
    fn error(&self, _message: &str, _values: &[&dyn fmt::Debug]) {}
}

/// Forwards to `tracing` under the `did_session` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl SessionLogger for TracingLogger {
    fn debug(&self, message: &str, values: &[&dyn fmt::Debug]) {
        tracing::debug!(target: "did_session", ?values, "{}", message);
    }

    fn info(&self, message: &str, values: &[&dyn fmt::Debug]) {
        tracing::info!(target: "did_session", ?values, "{}", message);
    }

    fn warn(&self, message: &str, values: &[&dyn fmt::Debug]) {
        tracing::warn!(target: "did_session", ?values, "{}", message);
    }

    fn error(&self, message: &str, values: &[&dyn fmt::Debug]) {
        tracing::error!(target: "did_session", ?values, "{}", message);
    }
}
