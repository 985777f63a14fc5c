use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::level::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already initialized")]
    AlreadyInitialized,
}

/// 构建日志过滤器，`RUST_LOG` 优先于配置中的级别
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
        }
        _ => EnvFilter::try_new(config.level.to_string())
            .map_err(|e| LoggingError::InvalidFilter(e.to_string())),
    }
}

/// 安装全局 tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_ansi(config.ansi))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    result.map_err(|_| LoggingError::AlreadyInitialized)
}
