use crate::core::fetcher::MOBILE_USER_AGENT;
use crate::core::http_client::LIVE_BASE_URL;
use crate::error::{ApiError, ApiResult};
use crate::logger::LogLevel;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "dylive";

/// 配置管理器
pub struct ConfigManager {
    config_path: PathBuf,
    config: AppConfig,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 网络设置
    pub network: NetworkSettings,
    /// 签名程序设置
    pub signer: SignerSettings,
    /// 日志设置
    pub log: LogSettings,
}

/// 网络设置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkSettings {
    /// 请求超时时间（秒）
    pub request_timeout: u64,
    /// 用户代理
    pub user_agent: String,
    /// 直播页地址前缀
    pub live_base_url: String,
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5,
            user_agent: MOBILE_USER_AGENT.to_string(),
            live_base_url: LIVE_BASE_URL.to_string(),
        }
    }
}

/// 签名程序设置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SignerSettings {
    /// node 可执行文件路径
    pub node_path: PathBuf,
    /// 签名脚本路径
    pub script_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// 未设置时调试构建为 debug，发布构建为 info
    pub level: Option<LogLevel>,
}

impl ConfigManager {
    /// 创建新的配置管理器，文件不存在时使用默认配置
    pub fn new(config_path: PathBuf) -> ApiResult<Self> {
        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            AppConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// 重新加载配置
    pub fn load(&mut self) -> ApiResult<()> {
        if self.config_path.exists() {
            self.config = Self::load_config(&self.config_path)?;
        }
        Ok(())
    }

    /// 保存配置
    pub fn save(&self) -> ApiResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ApiError::Config(e.to_string()))?;

        fs::write(&self.config_path, config_json)?;

        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn load_config(path: &Path) -> ApiResult<AppConfig> {
        let content = fs::read_to_string(path)?;

        serde_json::from_str(&content)
            .map_err(|e| ApiError::Config(format!("{}: {e}", path.display())))
    }

    /// 获取默认配置路径
    pub fn default_config_path() -> PathBuf {
        if cfg!(debug_assertions) {
            PathBuf::from("config.json")
        } else if let Some(project_dirs) = ProjectDirs::from("", "", APP_NAME) {
            project_dirs.config_dir().join("config.json")
        } else {
            let mut path = std::env::home_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(".config");
            path.push(APP_NAME);
            path.push("config.json");
            path
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        let config_path = Self::default_config_path();
        Self::new(config_path).unwrap_or_else(|_| Self {
            config_path: Self::default_config_path(),
            config: AppConfig::default(),
        })
    }
}
