use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderValue};
use std::time::{Duration, Instant};

use crate::config::NetworkSettings;
use crate::error::{ApiError, ApiResult};
use crate::logger::{log_network_request, log_network_response};

/// 一次 GET 请求的结果
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// 响应中设置的 cookie（名称, 值）
    pub cookies: Vec<(String, String)>,
}

impl FetchedPage {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(cookie_name, _)| cookie_name == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 页面抓取能力，请求超时由实现负责
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> ApiResult<FetchedPage>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_settings(settings: &NetworkSettings) -> ApiResult<Self> {
        Self::new(&settings.user_agent, settings.timeout())
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> ApiResult<FetchedPage> {
        log_network_request(url, "GET");
        let started = Instant::now();

        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::Signing(format!("cookie 含有非法字符: {e}")))?;
            request = request.header(COOKIE, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let cookies = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await?;

        log_network_response(status, started.elapsed().as_millis() as u64);

        Ok(FetchedPage {
            status,
            body,
            cookies,
        })
    }
}

/// 固定的移动端 Safari UA，平台据此返回移动版页面
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1";
