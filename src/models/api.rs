// src/models/api.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// --- 结构化解析接口的响应 ---
//
// 不同的第三方解析服务字段名各不相同，这里把已知字段都列出来。
// 字段类型一律宽松处理: 类型不符时视为缺失，而不是整体解析失败。

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ResolverPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    // TikTok 类解析服务 (tikwm 等)
    #[serde(default, deserialize_with = "lenient_string")]
    pub play: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hdplay: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wmplay: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub music: Option<String>,

    // Facebook 类解析服务
    #[serde(default, deserialize_with = "lenient_string")]
    pub hd: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sd: Option<String>,

    // 列表形式
    #[serde(default, deserialize_with = "lenient_links")]
    pub links: Vec<ResolverLink>,
    #[serde(default, deserialize_with = "lenient_links")]
    pub medias: Vec<ResolverLink>,

    // 单一链接字段
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub download_url: Option<String>,

    /// 很多服务把真正的内容包在 `data` 里
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverLink {
    pub url: String,
    pub quality: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(non_empty))
}

fn lenient_links<'de, D>(deserializer: D) -> Result<Vec<ResolverLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(vec![]);
    };
    let links = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => non_empty(s).map(|url| ResolverLink { url, quality: None }),
            Value::Object(map) => {
                let url = ["url", "link", "src"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str).and_then(non_empty))?;
                let quality = ["quality", "label", "resolution"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(Value::as_str).and_then(non_empty));
                Some(ResolverLink { url, quality })
            }
            _ => None,
        })
        .collect();
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_tolerates_wrong_types() {
        let v = serde_json::json!({
            "title": 42,
            "play": "https://cdn/x.mp4",
            "links": "not-a-list",
            "data": "oops"
        });
        let payload: ResolverPayload = serde_json::from_value(v).unwrap();
        assert_eq!(payload.title, None);
        assert_eq!(payload.play.as_deref(), Some("https://cdn/x.mp4"));
        assert!(payload.links.is_empty());
    }

    #[test]
    fn test_payload_links_accept_strings_and_objects() {
        let v = serde_json::json!({
            "medias": ["https://a/1.mp4", {"url": "https://a/2.mp4", "quality": "hd"}, {"nope": 1}, ""]
        });
        let payload: ResolverPayload = serde_json::from_value(v).unwrap();
        assert_eq!(
            payload.medias,
            vec![
                ResolverLink { url: "https://a/1.mp4".into(), quality: None },
                ResolverLink { url: "https://a/2.mp4".into(), quality: Some("hd".into()) },
            ]
        );
    }
}
