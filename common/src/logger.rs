// Standard library imports
use std::io;

// Third party imports
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// Cấu hình logger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Mức độ log mặc định, bị ghi đè bởi `RUST_LOG`
    pub level: String,
    /// Thư mục ghi file log (None = chỉ ghi ra stderr)
    pub directory: Option<String>,
    /// Tên file log, được xoay vòng theo ngày
    pub file_name: String,
    /// Bật màu cho stderr
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_name: "tokenscan.log".to_string(),
            ansi: true,
        }
    }
}

/// Tạo bộ lọc từ mức độ log cấu hình
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level directive: {}", level))
}

/// Khởi tạo tracing subscriber toàn cục
///
/// Trả về guard của file appender khi có ghi file; caller phải giữ guard
/// tới khi thoát để log còn trong buffer được flush.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.level)?,
    };

    let stderr_layer = fmt::Layer::new()
        .with_writer(io::stderr)
        .with_ansi(config.ansi);

    let Some(directory) = config.directory.as_deref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .context("Failed to set global default subscriber")?;
        return Ok(None);
    };

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .context("Failed to set global default subscriber")?;

    Ok(Some(guard))
}
