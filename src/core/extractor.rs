//! 从服务端渲染的 HTML 中提取内嵌的 JSON 状态
//!
//! 页面上有两种内嵌方式，各自对应一组标记字面量。标记缺失时返回
//! `ApiError::InvalidData`，与 JSON 本身损坏区分开：标记缺失通常意味着页面结构变了。

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// 直播页 `RENDER_DATA` 标记
#[derive(Debug, Clone, Copy)]
pub struct RenderDataMarkers {
    pub tag: &'static str,
}

impl RenderDataMarkers {
    pub const V1: Self = Self { tag: "RENDER_DATA" };
}

/// 分享页 `window.__INIT_PROPS__` 赋值标记
#[derive(Debug, Clone, Copy)]
pub struct InitPropsMarkers {
    pub open: &'static str,
    pub close: &'static str,
    /// 顶层路由键
    pub route: &'static str,
    /// 路由下的房间对象键
    pub object: &'static str,
}

impl InitPropsMarkers {
    pub const V1: Self = Self {
        open: "<script>window.__INIT_PROPS__ = ",
        close: "</script>",
        route: "/webcast/reflow/:id",
        object: "room",
    };
}

/// 方案 A：标记之后第一个 `>` 到下一个 `<` 之间是百分号编码的 JSON
#[derive(Debug, Clone, Copy)]
pub struct RenderDataExtractor {
    markers: RenderDataMarkers,
}

impl Default for RenderDataExtractor {
    fn default() -> Self {
        Self::new(RenderDataMarkers::V1)
    }
}

impl RenderDataExtractor {
    pub fn new(markers: RenderDataMarkers) -> Self {
        Self { markers }
    }

    /// 截取标记之间的原始文本（未解码）
    pub fn raw<'a>(&self, html: &'a str) -> ApiResult<&'a str> {
        let tag = self.markers.tag;
        let start = html
            .find(tag)
            .ok_or_else(|| ApiError::InvalidData(format!("页面中没有 {tag}")))?;
        let rest = &html[start..];

        let open_end = rest
            .find('>')
            .ok_or_else(|| ApiError::InvalidData(format!("{tag} 标签未闭合")))?;
        let rest = &rest[open_end + 1..];

        let end = rest
            .find('<')
            .ok_or_else(|| ApiError::InvalidData(format!("{tag} 内容未结束")))?;

        Ok(&rest[..end])
    }

    pub fn extract<T: DeserializeOwned>(&self, html: &str) -> ApiResult<T> {
        let decoded = query_unescape(self.raw(html)?)?;
        Ok(serde_json::from_str(&decoded)?)
    }
}

/// 方案 B：开闭标记之间是直接可解析的 JSON，不做百分号解码
#[derive(Debug, Clone, Copy)]
pub struct InitPropsExtractor {
    markers: InitPropsMarkers,
}

impl Default for InitPropsExtractor {
    fn default() -> Self {
        Self::new(InitPropsMarkers::V1)
    }
}

impl InitPropsExtractor {
    pub fn new(markers: InitPropsMarkers) -> Self {
        Self { markers }
    }

    pub fn raw<'a>(&self, html: &'a str) -> ApiResult<&'a str> {
        let InitPropsMarkers { open, close, .. } = self.markers;
        let start = html
            .find(open)
            .ok_or_else(|| ApiError::InvalidData(format!("页面中没有 {open}")))?;
        let rest = &html[start + open.len()..];

        let end = rest
            .find(close)
            .ok_or_else(|| ApiError::InvalidData(format!("{open} 之后没有 {close}")))?;

        Ok(&rest[..end])
    }

    pub fn extract(&self, html: &str) -> ApiResult<Value> {
        Ok(serde_json::from_str(self.raw(html)?)?)
    }

    /// 取出路由下的房间对象，路由或房间键不存在时返回 `None`
    ///
    /// 顶层其他路由的结构各不相同，只解析需要的那一支。
    pub fn extract_room(&self, html: &str) -> ApiResult<Option<Value>> {
        let mut props = self.extract(html)?;
        let room = props
            .get_mut(self.markers.route)
            .and_then(|route| route.get_mut(self.markers.object))
            .map(Value::take)
            .filter(|room| !room.is_null());

        Ok(room)
    }
}

/// 按查询串规则解码：`+` 视为空格，`%` 后必须跟两位十六进制，非法 UTF-8 按 U+FFFD 替换
pub fn query_unescape(raw: &str) -> ApiResult<String> {
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let snippet: String = raw[i..].chars().take(3).collect();
            return Err(ApiError::Unescape(format!("无效的转义序列 {snippet:?}")));
        }
    }

    let plus_as_space = raw.replace('+', " ");
    // 非法 UTF-8 替换为 U+FFFD，单个坏字节不影响整页
    Ok(percent_decode_str(&plus_as_space)
        .decode_utf8_lossy()
        .into_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_data_raw_slice() {
        let html = r#"<script id="RENDER_DATA" type="application/json">%7B%22a%22%3A1%7D</script>"#;
        let raw = RenderDataExtractor::default().raw(html).unwrap();
        assert_eq!(raw, "%7B%22a%22%3A1%7D");

        let value: Value = RenderDataExtractor::default().extract(html).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_render_data_missing_marker_is_invalid_data() {
        let err = RenderDataExtractor::default()
            .extract::<Value>("<html><body>验证码</body></html>")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));

        let err = RenderDataExtractor::default()
            .extract::<Value>("<script id=\"RENDER_DATA\"")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));
    }

    #[test]
    fn test_render_data_bad_payloads() {
        let html = r#"<script id="RENDER_DATA">%7B%zz</script>"#;
        let err = RenderDataExtractor::default().extract::<Value>(html).unwrap_err();
        assert!(matches!(err, ApiError::Unescape(_)));

        let html = r#"<script id="RENDER_DATA">%7B%22a%22</script>"#;
        let err = RenderDataExtractor::default().extract::<Value>(html).unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
    }

    #[test]
    fn test_query_unescape() {
        assert_eq!(query_unescape("a+b%20c").unwrap(), "a b c");
        assert_eq!(query_unescape("%E7%BA%A2%E8%AD%A6").unwrap(), "红警");
        assert_eq!(query_unescape("%2B").unwrap(), "+");
        assert!(query_unescape("100%").is_err());
        assert!(query_unescape("%4").is_err());
        assert_eq!(query_unescape("ab%FFcd").unwrap(), "ab\u{FFFD}cd");
    }

    #[test]
    fn test_init_props_room() {
        let html = concat!(
            "<html><script>window.__INIT_PROPS__ = ",
            r#"{"/webcast/reflow/:id":{"room":{"id_str":"12345"}},"/other":[1,2]}"#,
            "</script></html>"
        );
        let room = InitPropsExtractor::default().extract_room(html).unwrap().unwrap();
        assert_eq!(room["id_str"], "12345");
    }

    #[test]
    fn test_init_props_missing_route_or_room() {
        let html = r#"<script>window.__INIT_PROPS__ = {"/other":{}}</script>"#;
        assert_eq!(InitPropsExtractor::default().extract_room(html).unwrap(), None);

        let html = r#"<script>window.__INIT_PROPS__ = {"/webcast/reflow/:id":{"room":null}}</script>"#;
        assert_eq!(InitPropsExtractor::default().extract_room(html).unwrap(), None);
    }

    #[test]
    fn test_init_props_missing_markers() {
        let err = InitPropsExtractor::default()
            .extract("<html></html>")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));

        let err = InitPropsExtractor::default()
            .extract("<script>window.__INIT_PROPS__ = {}")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));
    }
}
