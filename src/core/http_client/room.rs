use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::null_default;
use crate::error::{ApiError, ApiResult};
use crate::models::{Id, Room};

/// 页面内嵌的直播间对象，两个页面共用同一结构
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LiveRoomData {
    #[serde(deserialize_with = "null_default")]
    pub id_str: String,
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(rename = "like_count", deserialize_with = "null_default")]
    pub likes_count: i64,
    #[serde(rename = "user_count", deserialize_with = "null_default")]
    pub current_users_count: i64,
    /// 2 - 直播中, 4 - 已结束
    #[serde(deserialize_with = "null_default")]
    pub status: i64,
    #[serde(deserialize_with = "null_default")]
    pub create_time: i64,
    #[serde(deserialize_with = "null_default")]
    pub stats: LiveRoomStats,
    #[serde(deserialize_with = "null_default")]
    pub stream_url: LiveRoomStreamUrl,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LiveRoomStats {
    #[serde(rename = "follow_count", deserialize_with = "null_default")]
    pub new_followers_count: i64,
    // 含义未确认
    #[serde(rename = "gift_uv_count", deserialize_with = "null_default")]
    pub gifts_unique_visitor_count: i64,
    // 含义未确认
    #[serde(rename = "fan_ticket", deserialize_with = "null_default")]
    pub fans_count: i64,
    #[serde(rename = "total_user", deserialize_with = "null_default")]
    pub total_users_count: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LiveRoomStreamUrl {
    #[serde(deserialize_with = "null_default")]
    pub id_str: String,
    #[serde(deserialize_with = "null_default")]
    pub extra: StreamExtra,
    #[serde(rename = "hls_pull_url_map", deserialize_with = "null_default")]
    pub hls_url_map: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct StreamExtra {
    #[serde(deserialize_with = "null_default")]
    pub height: i64,
    #[serde(deserialize_with = "null_default")]
    pub width: i64,
}

impl LiveRoomData {
    /// 转换为 `Room`，直播页和分享页都走这里
    pub fn into_room(self) -> Room {
        let id = Id::parse_lenient(&self.id_str);

        Room {
            id,
            page_url: Room::page_url_for(id),
            title: self.title,
            status: self.status,
            operating: Room::is_operating(self.status),
            created_at: DateTime::<Utc>::from_timestamp(self.create_time, 0).unwrap_or_default(),
            likes_count: self.likes_count,
            current_users_count: self.current_users_count,
            new_followers_count: self.stats.new_followers_count,
            gifts_unique_visitor_count: self.stats.gifts_unique_visitor_count,
            fans_count: self.stats.fans_count,
            total_users_count: self.stats.total_users_count,
            stream_id: Id::parse_lenient(&self.stream_url.id_str),
            stream_height: self.stream_url.extra.height,
            stream_width: self.stream_url.extra.width,
            stream_hls_url_map: self.stream_url.hls_url_map,
        }
    }
}

/// 分享页的房间对象转换为 `Room`
///
/// 房间对象不存在或 `id_str` 为空都视为没有直播间，而不是返回全零的 `Room`。
pub fn room_from_init_props(room: Option<Value>) -> ApiResult<Room> {
    let room = room.ok_or(ApiError::NoRoom)?;
    let data: LiveRoomData = serde_json::from_value(room)?;

    if data.id_str.is_empty() {
        return Err(ApiError::NoRoom);
    }

    Ok(data.into_room())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_room_maps_all_fields() {
        let data: LiveRoomData = serde_json::from_value(json!({
            "id_str": "7208347611923090234",
            "title": "红警 2 对战",
            "like_count": 1500,
            "user_count": 320,
            "status": 2,
            "create_time": 1678500000,
            "stats": {
                "follow_count": 12,
                "gift_uv_count": 7,
                "fan_ticket": 88,
                "total_user": 9001
            },
            "stream_url": {
                "id_str": "112233",
                "extra": { "height": 1920, "width": 1080 },
                "hls_pull_url_map": {
                    "FULL_HD1": "https://pull-hls.example.com/stage/stream-1_or4.m3u8",
                    "HD1": "https://pull-hls.example.com/stage/stream-1_hd.m3u8"
                }
            }
        }))
        .unwrap();

        let room = data.into_room();

        assert_eq!(room.id, Id(7208347611923090234));
        assert_eq!(
            room.page_url,
            "https://webcast.amemv.com/webcast/reflow/7208347611923090234"
        );
        assert_eq!(room.title, "红警 2 对战");
        assert!(room.operating);
        assert_eq!(room.created_at.timestamp(), 1678500000);
        assert_eq!(room.likes_count, 1500);
        assert_eq!(room.current_users_count, 320);
        assert_eq!(room.new_followers_count, 12);
        assert_eq!(room.gifts_unique_visitor_count, 7);
        assert_eq!(room.fans_count, 88);
        assert_eq!(room.total_users_count, 9001);
        assert_eq!(room.stream_id, Id(112233));
        assert_eq!((room.stream_height, room.stream_width), (1920, 1080));
        assert_eq!(room.stream_hls_url_map.len(), 2);
        assert_eq!(
            room.stream_hls_url_map["HD1"],
            "https://pull-hls.example.com/stage/stream-1_hd.m3u8"
        );
    }

    #[test]
    fn test_operating_follows_status() {
        for status in [0, 2, 4] {
            let data = LiveRoomData {
                id_str: "1".into(),
                status,
                ..Default::default()
            };
            let room = data.into_room();
            assert_eq!(room.status, status);
            assert_eq!(room.operating, status == 2);
        }
    }

    #[test]
    fn test_status_and_dimensions_beyond_i32() {
        let data: LiveRoomData = serde_json::from_value(json!({
            "id_str": "7",
            "status": 3_000_000_000i64,
            "stream_url": { "extra": { "height": 4_294_967_296i64, "width": 1080 } }
        }))
        .unwrap();

        let room = data.into_room();
        assert_eq!(room.status, 3_000_000_000);
        assert!(!room.operating);
        assert_eq!(room.stream_height, 4_294_967_296);
    }

    #[test]
    fn test_null_fields_become_zero_values() {
        let data: LiveRoomData = serde_json::from_value(json!({
            "id_str": "abc",
            "title": null,
            "stats": null,
            "stream_url": { "hls_pull_url_map": null }
        }))
        .unwrap();

        let room = data.into_room();
        assert!(room.id.is_zero());
        assert_eq!(room.page_url, "https://webcast.amemv.com/webcast/reflow/0");
        assert_eq!(room.title, "");
        assert!(room.stream_hls_url_map.is_empty());
        assert_eq!(room.created_at.timestamp(), 0);
    }

    #[test]
    fn test_room_from_init_props() {
        let room = room_from_init_props(Some(json!({ "id_str": "12345", "status": 4 }))).unwrap();
        assert_eq!(room.id, Id(12345));
        assert_eq!(room.page_url, "https://webcast.amemv.com/webcast/reflow/12345");
        assert!(!room.operating);

        let err = room_from_init_props(Some(json!({ "id_str": "", "status": 2 }))).unwrap_err();
        assert!(matches!(err, ApiError::NoRoom));

        let err = room_from_init_props(None).unwrap_err();
        assert!(matches!(err, ApiError::NoRoom));
    }
}
