use serde::Deserialize;
use serde_json::Value;

use super::null_default;
use super::room::LiveRoomData;
use crate::error::{ApiError, ApiResult};
use crate::models::{Id, User};

/// 页面自身报告用户不存在时 `errorType` 的取值
pub const NO_SUCH_USER_ERROR_TYPE: &str = "server-error";

/// 直播页 `RENDER_DATA` 中用到的部分
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LivePageData {
    #[serde(deserialize_with = "null_default")]
    pub location: String,
    #[serde(deserialize_with = "null_default")]
    pub odin: Odin,
    #[serde(deserialize_with = "null_default")]
    pub initial_state: InitialState,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Odin {
    #[serde(deserialize_with = "null_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_default")]
    pub user_unique_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct InitialState {
    #[serde(deserialize_with = "null_default")]
    pub room_store: RoomStore,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomStore {
    #[serde(deserialize_with = "null_default")]
    pub room_info: RoomInfo,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomInfo {
    pub room: Option<LiveRoomData>,
    #[serde(deserialize_with = "null_default")]
    pub anchor: Anchor,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Anchor {
    #[serde(deserialize_with = "null_default")]
    pub nickname: String,
    #[serde(deserialize_with = "null_default")]
    pub avatar_thumb: AvatarThumb,
    #[serde(deserialize_with = "null_default")]
    pub sec_uid: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AvatarThumb {
    #[serde(deserialize_with = "null_default")]
    pub url_list: Vec<String>,
}

/// 直播页数据转换为 `User`
///
/// 先在未类型化的 JSON 上检查 `routeInitialProps.errorType`，
/// 页面报告用户不存在时无论其他字段是否完整都返回 `NoSuchUser`。
pub fn user_from_render_data(data: Value) -> ApiResult<User> {
    let error_type = data
        .pointer("/routeInitialProps/errorType")
        .and_then(Value::as_str);
    if error_type == Some(NO_SUCH_USER_ERROR_TYPE) {
        return Err(ApiError::NoSuchUser);
    }

    let page: LivePageData = serde_json::from_value(data)?;
    let RoomInfo { room, anchor, .. } = page.initial_state.room_store.room_info;

    Ok(User {
        id: Id::parse_lenient(&page.odin.user_id),
        unique_id: Id::parse_lenient(&page.odin.user_unique_id),
        sec_uid: anchor.sec_uid,
        name: page.location.trim_matches('/').to_string(),
        nick_name: anchor.nickname,
        picture: anchor
            .avatar_thumb
            .url_list
            .into_iter()
            .next()
            .unwrap_or_default(),
        room: room.map(LiveRoomData::into_room),
    })
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use serde_json::json;

    pub(crate) fn render_data_json() -> Value {
        json!({
            "location": "/hongjingzhibo",
            "odin": {
                "user_id": "2885498311246734",
                "user_unique_id": "2885498311246734"
            },
            "initialState": {
                "roomStore": {
                    "roomInfo": {
                        "roomId": "7208347611923090234",
                        "room": {
                            "id_str": "7208347611923090234",
                            "title": "红警直播",
                            "status": 2,
                            "user_count": 4321,
                            "create_time": 1678500000,
                            "stream_url": {
                                "id_str": "998877",
                                "hls_pull_url_map": { "FULL_HD1": "https://pull.example.com/a.m3u8" }
                            }
                        },
                        "anchor": {
                            "nickname": "红警直播舞虾",
                            "sec_uid": "MS4wLjABAAAAuw4X7CNDvaXlGM7HE-jp2jMtQC9U0lkICEE-Pg8i7AM",
                            "avatar_thumb": {
                                "url_list": [
                                    "https://p3.example.com/avatar_100.jpeg",
                                    "https://p6.example.com/avatar_100.jpeg"
                                ]
                            }
                        }
                    }
                }
            },
            "routeInitialProps": { "errorType": null }
        })
    }

    #[test]
    fn test_user_from_render_data() {
        let user = user_from_render_data(render_data_json()).unwrap();

        assert_eq!(user.id, Id(2885498311246734));
        assert_eq!(user.unique_id, Id(2885498311246734));
        assert_eq!(
            user.sec_uid,
            "MS4wLjABAAAAuw4X7CNDvaXlGM7HE-jp2jMtQC9U0lkICEE-Pg8i7AM"
        );
        assert_eq!(user.name, "hongjingzhibo");
        assert_eq!(user.nick_name, "红警直播舞虾");
        assert_eq!(user.picture, "https://p3.example.com/avatar_100.jpeg");

        let room = user.room.unwrap();
        assert_eq!(room.id, Id(7208347611923090234));
        assert_eq!(room.title, "红警直播");
        assert!(room.operating);
        assert_eq!(room.current_users_count, 4321);
        assert_eq!(room.stream_id, Id(998877));
    }

    #[test]
    fn test_server_error_wins_over_valid_fields() {
        let mut data = render_data_json();
        data["routeInitialProps"]["errorType"] = json!("server-error");

        let err = user_from_render_data(data).unwrap_err();
        assert!(matches!(err, ApiError::NoSuchUser));

        // 其他字段类型错误时同样优先返回 NoSuchUser
        let data = json!({
            "odin": "broken",
            "routeInitialProps": { "errorType": "server-error" }
        });
        let err = user_from_render_data(data).unwrap_err();
        assert!(matches!(err, ApiError::NoSuchUser));
    }

    #[test]
    fn test_missing_room_and_pictures() {
        let mut data = render_data_json();
        data["initialState"]["roomStore"]["roomInfo"]["room"] = Value::Null;
        data["initialState"]["roomStore"]["roomInfo"]["anchor"]["avatar_thumb"]["url_list"] =
            json!([]);

        let user = user_from_render_data(data).unwrap();
        assert!(user.room.is_none());
        assert_eq!(user.picture, "");
    }
}
