use thiserror::Error;

/// 接口错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 配置错误（签名程序缺失、配置文件损坏等）
    #[error("配置错误: {0}")]
    Config(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 签名程序错误
    #[error("签名失败: {0}")]
    Signing(String),

    /// 页面中找不到内嵌数据，通常意味着页面结构发生了变化
    #[error("页面数据无效: {0}")]
    InvalidData(String),

    /// 内嵌数据的百分号编码无效
    #[error("页面数据解码失败: {0}")]
    Unescape(String),

    #[error("页面数据解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 平台明确返回了用户不存在
    #[error("用户不存在")]
    NoSuchUser,

    #[error("未找到直播间")]
    NoRoom,

    #[error("未提供直播间地址")]
    NoUrl,
}

impl ApiError {
    /// 判断是否为页面解析阶段的错误
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidData(_) | ApiError::Unescape(_) | ApiError::Json(_)
        )
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// 结果类型别名
pub type ApiResult<T> = Result<T, ApiError>;
