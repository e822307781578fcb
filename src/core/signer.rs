use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::config::SignerSettings;
use crate::error::{ApiError, ApiResult};

/// 签名能力：输入 nonce，输出签名
///
/// 签名算法由平台控制且经常变化，这里只约定输入输出，具体实现由外部提供。
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, nonce: &str) -> ApiResult<String>;
}

/// 通过 node 执行外部签名脚本
#[derive(Debug, Clone)]
pub struct NodeScriptSigner {
    node_path: PathBuf,
    script_path: PathBuf,
}

impl NodeScriptSigner {
    pub fn new(node_path: impl Into<PathBuf>, script_path: impl Into<PathBuf>) -> ApiResult<Self> {
        let node_path = node_path.into();
        let script_path = script_path.into();

        ensure_exists(&node_path, "node")?;
        ensure_exists(&script_path, "签名脚本")?;

        Ok(Self {
            node_path,
            script_path,
        })
    }

    pub fn from_settings(settings: &SignerSettings) -> ApiResult<Self> {
        Self::new(&settings.node_path, &settings.script_path)
    }
}

fn ensure_exists(path: &Path, what: &str) -> ApiResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ApiError::Config(format!("未配置{what}路径")));
    }
    if !path.exists() {
        return Err(ApiError::Config(format!(
            "{what}不存在: {}",
            path.display()
        )));
    }
    Ok(())
}

#[async_trait]
impl Signer for NodeScriptSigner {
    async fn sign(&self, nonce: &str) -> ApiResult<String> {
        let output = Command::new(&self.node_path)
            .arg(&self.script_path)
            .arg(nonce)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ApiError::Signing(format!("无法执行 {}: {e}", self.node_path.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApiError::Signing(format!(
                "签名脚本退出异常 ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ApiError::Signing(format!("签名输出不是 UTF-8: {e}")))?;

        // 脚本以换行结束输出，换行不能进入 cookie
        Ok(stdout.trim().to_string())
    }
}
