use log::Level;

pub const LOG_TARGET: &str = "request_data";

/// Destination for the diagnostic lines written by [`crate::RequestConfig::send`].
pub trait RequestLogger: std::fmt::Debug + Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` facade under the `request_data` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl RequestLogger for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}
