use chrono::{DateTime, Utc};
use num_enum::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// 直播间分享页前缀，`Room::page_url` 只由它和房间 id 拼出
pub const ROOM_PAGE_PREFIX: &str = "https://webcast.amemv.com/webcast/reflow/";

/// 平台的 64 位数字 id
///
/// 序列化为十进制字符串，避免只支持 53 位整数的 JSON 消费方丢失精度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub u64);

impl Id {
    /// 宽松解析：非数字字符串得到 `Id(0)`，调用方可以把 0 当作"无法解析"的标记
    pub fn parse_lenient(s: &str) -> Self {
        Id(s.parse().unwrap_or_default())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Id::parse_lenient(&text),
            Repr::Number(number) => Id(number),
        })
    }
}

/// 直播状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromPrimitive, PartialEq, Eq, Default)]
#[repr(i64)]
#[serde(from = "i64")]
pub enum LiveStatus {
    Preparing = 1,
    Started = 2,
    Paused = 3,
    Ended = 4,
    #[default]
    Unknown = -1,
}

/// 主播信息
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    /// 会随时间变化
    pub id: Id,
    /// 会随时间变化
    pub unique_id: Id,
    /// 不会变化，是跨请求关联同一用户的唯一可靠依据
    pub sec_uid: String,
    /// 用户主页路径
    pub name: String,
    /// 昵称
    pub nick_name: String,
    /// 头像缩略图地址，没有时为空
    pub picture: String,
    /// 直播间（仅在正在直播或有直播间信息时存在）
    pub room: Option<Room>,
}

/// 直播间快照
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Room {
    pub id: Id,
    pub page_url: String,
    pub title: String,
    /// 平台原始状态码
    pub status: i64,
    /// 是否正在直播，当且仅当 `status == 2`
    pub operating: bool,
    pub created_at: DateTime<Utc>,

    pub likes_count: i64,
    pub current_users_count: i64,
    pub new_followers_count: i64,
    // 以下两个字段含义不确定
    pub gifts_unique_visitor_count: i64,
    pub fans_count: i64,
    pub total_users_count: i64,

    pub stream_id: Id,
    pub stream_height: i64,
    pub stream_width: i64,
    /// 清晰度/协议 -> HLS 拉流地址
    pub stream_hls_url_map: HashMap<String, String>,
}

impl Room {
    pub fn page_url_for(id: Id) -> String {
        format!("{ROOM_PAGE_PREFIX}{id}")
    }

    pub fn is_operating(status: i64) -> bool {
        LiveStatus::from_primitive(status) == LiveStatus::Started
    }

    pub fn live_status(&self) -> LiveStatus {
        LiveStatus::from_primitive(self.status)
    }
}
