use reqwest::header::HeaderValue;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::fetcher::PageFetcher;
use crate::core::signer::Signer;
use crate::error::{ApiError, ApiResult};
use crate::logger::{log_cookie_generated, log_cookie_invalidated};

pub const NONCE_COOKIE: &str = "__ac_nonce";
pub const SIGNATURE_COOKIE: &str = "__ac_signature";
pub const REFERER_COOKIE: &str = "__ac_referer";
/// `__ac_referer` 的固定值，并不是真实的来源页
pub const REFERER_SENTINEL: &str = "__ac_blank";

/// 反爬 cookie 的获取与缓存
///
/// 生成过程（挑战请求 + 签名）和缓存写入在同一把锁内完成，
/// 并发调用只会生成一次，等待者直接复用生成结果。
pub struct SessionCookieProvider {
    fetcher: Arc<dyn PageFetcher>,
    signer: Arc<dyn Signer>,
    cookie: Mutex<Option<String>>,
}

impl SessionCookieProvider {
    pub fn new(fetcher: Arc<dyn PageFetcher>, signer: Arc<dyn Signer>) -> Self {
        Self {
            fetcher,
            signer,
            cookie: Mutex::new(None),
        }
    }

    /// 获取 cookie，没有缓存时以 `target_url` 发起挑战并生成
    pub async fn obtain(&self, target_url: &str) -> ApiResult<String> {
        let mut cookie = self.cookie.lock().await;
        if let Some(cookie) = cookie.as_ref() {
            return Ok(cookie.clone());
        }

        let generated = self.generate(target_url).await?;
        log_cookie_generated(target_url);
        *cookie = Some(generated.clone());

        Ok(generated)
    }

    /// 丢弃缓存的 cookie，下次调用 `obtain` 时重新生成
    pub async fn invalidate(&self) {
        if self.cookie.lock().await.take().is_some() {
            log_cookie_invalidated("主动失效");
        }
    }

    /// 仅当缓存仍是 `stale` 时才丢弃，避免误删其他调用刚生成的新 cookie
    pub async fn invalidate_if(&self, stale: &str) -> bool {
        let mut cookie = self.cookie.lock().await;
        if cookie.as_deref() == Some(stale) {
            *cookie = None;
            log_cookie_invalidated("页面解析失败");
            return true;
        }
        false
    }

    pub async fn cached(&self) -> Option<String> {
        self.cookie.lock().await.clone()
    }

    async fn generate(&self, target_url: &str) -> ApiResult<String> {
        let page = self.fetcher.fetch(target_url, None).await?;

        // 没有 nonce 时按空串继续，由签名程序决定结果
        let nonce = page.cookie(NONCE_COOKIE).unwrap_or_default();
        if nonce.is_empty() {
            tracing::warn!("挑战响应中没有 {} - {}", NONCE_COOKIE, target_url);
        } else {
            tracing::debug!("获取到 {}: {}", NONCE_COOKIE, nonce);
        }

        let signature = self.signer.sign(nonce).await?;
        let cookie = compose_cookie(nonce, &signature);

        // 不能作为请求头发送的 cookie 不进入缓存，否则之后每次请求都会失败
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::Signing(format!("签名结果不能用作 cookie: {e}")))?;

        Ok(cookie)
    }
}

/// 按固定顺序拼接 nonce、签名和 referer 三个 cookie
pub fn compose_cookie(nonce: &str, signature: &str) -> String {
    format!(
        "{NONCE_COOKIE}={nonce};{SIGNATURE_COOKIE}={signature};{REFERER_COOKIE}={REFERER_SENTINEL}"
    )
}

impl std::fmt::Debug for SessionCookieProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionCookieProvider")
    }
}
