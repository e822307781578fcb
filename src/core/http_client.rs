use serde::{Deserialize, Deserializer};
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::extractor::{InitPropsExtractor, RenderDataExtractor};
use crate::core::fetcher::{PageFetcher, ReqwestFetcher};
use crate::core::session::SessionCookieProvider;
use crate::core::signer::{NodeScriptSigner, Signer};
use crate::error::{ApiError, ApiResult};
use crate::logger::log_parse_failure;
use crate::models::{Room, User};

pub mod room;
pub mod user;

/// 直播页地址前缀
pub const LIVE_BASE_URL: &str = "https://live.douyin.com/";

/// `null` 和缺失一样取默认值
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct HttpClient {
    fetcher: Arc<dyn PageFetcher>,
    session: Arc<SessionCookieProvider>,
    live_base_url: String,
    render_data: RenderDataExtractor,
    init_props: InitPropsExtractor,
}

impl HttpClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>, signer: Arc<dyn Signer>) -> Self {
        let session = Arc::new(SessionCookieProvider::new(fetcher.clone(), signer));

        Self {
            fetcher,
            session,
            live_base_url: LIVE_BASE_URL.to_string(),
            render_data: RenderDataExtractor::default(),
            init_props: InitPropsExtractor::default(),
        }
    }

    /// 按配置创建 reqwest 抓取器和 node 签名器
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let fetcher = Arc::new(ReqwestFetcher::from_settings(&config.network)?);
        let signer = Arc::new(NodeScriptSigner::from_settings(&config.signer)?);

        Ok(Self::new(fetcher, signer).with_live_base_url(&config.network.live_base_url))
    }

    pub fn with_live_base_url(mut self, base_url: &str) -> Self {
        self.live_base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        self
    }

    pub fn session(&self) -> &SessionCookieProvider {
        &self.session
    }

    /// 按用户主页路径获取主播信息
    ///
    /// 页面解析失败可能是 cookie 已被拒绝，此时让本次使用的 cookie 失效，下次重新生成。
    pub async fn fetch_user_by_name(&self, name: &str) -> ApiResult<User> {
        let url = format!("{}{name}", self.live_base_url);
        let cookie = self.session.obtain(&url).await?;

        let page = self.fetcher.fetch(&url, Some(&cookie)).await?;
        tracing::debug!("直播页响应 - {} 状态: {}", url, page.status);

        let parsed = self
            .render_data
            .extract(&page.body)
            .and_then(user::user_from_render_data);

        if let Err(err) = &parsed {
            log_parse_failure(&url, err);
            self.session.invalidate_if(&cookie).await;
        }

        parsed
    }

    /// 按分享页地址获取直播间信息
    ///
    /// 该页面不需要 cookie，请求不带 cookie；但会顺带预热 cookie，
    /// 预热失败只记录日志，不影响本次结果。
    pub async fn fetch_room_by_url(&self, url: &str) -> ApiResult<Room> {
        if url.is_empty() {
            return Err(ApiError::NoUrl);
        }

        if let Err(err) = self.session.obtain(url).await {
            tracing::warn!("预热 cookie 失败 - {}: {}", url, err);
        }

        let page = self.fetcher.fetch(url, None).await?;
        tracing::debug!("分享页响应 - {} 状态: {}", url, page.status);

        let parsed = self
            .init_props
            .extract_room(&page.body)
            .and_then(room::room_from_init_props);

        if let Err(err) = &parsed {
            log_parse_failure(url, err);
        }

        parsed
    }
}

impl Clone for HttpClient {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            session: self.session.clone(),
            live_base_url: self.live_base_url.clone(),
            render_data: self.render_data,
            init_props: self.init_props,
        }
    }
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HttpClient")
    }
}
