pub mod level;
pub mod subscriber;

pub use level::{LogFormat, LogLevel, LoggingConfig};
pub use subscriber::{build_filter, init_logging, LoggingError};
