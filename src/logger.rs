use crate::error::{ApiError, ApiResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, RwLock};
use tracing::Level;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{FmtSubscriber, fmt::format::FmtSpan};

struct SystemTime;

impl FormatTime for SystemTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// 全局日志管理器实例
static GLOBAL_LOGGER: LazyLock<RwLock<LoggerManager>> =
    LazyLock::new(|| RwLock::new(LoggerManager::default()));

fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub struct LoggerManager {
    log_level: Level,
    initialized: bool,
}

impl LoggerManager {
    pub fn new(log_level: Level) -> Self {
        Self {
            log_level,
            initialized: false,
        }
    }

    /// 初始化日志系统，重复调用无副作用
    pub fn init(&mut self) -> ApiResult<()> {
        if self.initialized {
            return Ok(());
        }

        let subscriber = FmtSubscriber::builder()
            .with_timer(SystemTime)
            .with_level(true)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_max_level(self.log_level)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| ApiError::Config(format!("无法设置日志订阅者: {e}")))?;

        self.initialized = true;
        Ok(())
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    /// 记录应用启动日志
    pub fn log_app_start(&self, version: &str) {
        tracing::info!("应用启动 - 版本: {}", version);
        tracing::info!("日志级别: {:?}", self.log_level);
    }

    /// 记录网络请求
    pub fn log_network_request(&self, url: &str, method: &str) {
        tracing::debug!("网络请求 - {} {}", method, url);
    }

    /// 记录网络响应
    pub fn log_network_response(&self, status: u16, duration_ms: u64) {
        tracing::debug!("网络响应 - 状态: {}, 耗时: {}ms", status, duration_ms);
    }

    pub fn log_cookie_generated(&self, url: &str) {
        tracing::info!("已生成 cookie - 挑战页: {}", url);
    }

    pub fn log_cookie_invalidated(&self, reason: &str) {
        tracing::info!("cookie 已失效 - 原因: {}", reason);
    }

    /// 记录页面解析失败
    pub fn log_parse_failure(&self, url: &str, error: &ApiError) {
        if error.is_invalid_data() {
            tracing::warn!("页面解析失败 - {}: {}", url, error);
        } else {
            tracing::info!("页面返回 - {}: {}", url, error);
        }
    }
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::new(default_level())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 初始化全局日志系统
pub fn init_logger() -> ApiResult<()> {
    let mut logger = GLOBAL_LOGGER
        .write()
        .map_err(|e| ApiError::Config(format!("无法获取日志管理器写锁: {e}")))?;
    logger.init()
}

/// 设置日志级别，需在 `init_logger` 之前调用
pub fn set_log_level(level: LogLevel) -> ApiResult<()> {
    let mut logger = GLOBAL_LOGGER
        .write()
        .map_err(|e| ApiError::Config(format!("无法获取日志管理器写锁: {e}")))?;
    logger.log_level = level.into();
    Ok(())
}

// 全局日志记录函数，方便其他模块使用

pub fn log_app_start(version: &str) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_app_start(version);
    }
}

pub fn log_network_request(url: &str, method: &str) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_network_request(url, method);
    }
}

pub fn log_network_response(status: u16, duration_ms: u64) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_network_response(status, duration_ms);
    }
}

pub fn log_cookie_generated(url: &str) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_cookie_generated(url);
    }
}

pub fn log_cookie_invalidated(reason: &str) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_cookie_invalidated(reason);
    }
}

pub fn log_parse_failure(url: &str, error: &ApiError) {
    if let Ok(logger) = GLOBAL_LOGGER.read() {
        logger.log_parse_failure(url, error);
    }
}
