//! Third-party embeds, identified by the provider's id.

use super::{from_fields, mismatch, to_fields};
use crate::error::{ModelError, ModelResult};
use crate::external::{ExternalElement, ExternalNode};
use crate::format::ElementFormat;
use crate::import::DomConversion;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub format: ElementFormat,
}

impl Tweet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            format: ElementFormat::default(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://twitter.com/i/status/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouTube {
    #[serde(rename = "videoID")]
    pub video_id: String,
    #[serde(default)]
    pub format: ElementFormat,
}

impl YouTube {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            format: ElementFormat::default(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube-nocookie.com/embed/{}", self.video_id)
    }
}

fn require_id(node_type: &str, field: &str, value: &Value) -> ModelResult<()> {
    match value.get(field).and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(ModelError::invalid_field(
            node_type,
            field,
            "expected a non-empty string",
        )),
    }
}

pub mod tweet {
    use super::*;

    pub const TYPE: &str = "tweet";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::Tweet(tweet) => to_fields(TYPE, VERSION, tweet),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        require_id(TYPE, "id", value)?;
        Ok(NodeData::Tweet(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::Tweet(tweet) = data else {
            return Err(mismatch(TYPE, data));
        };
        Ok(ExternalNode::element("div")
            .with_attr("data-lexical-tweet-id", tweet.id.as_str())
            .with_child(ExternalNode::text(tweet.url())))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        let id = element.attr("data-lexical-tweet-id").filter(|id| !id.is_empty())?;
        Some(DomConversion::node(NodeData::Tweet(Tweet::new(id)), 2))
    }
}

pub mod youtube {
    use super::*;

    pub const TYPE: &str = "youtube";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::YouTube(video) => to_fields(TYPE, VERSION, video),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        require_id(TYPE, "videoID", value)?;
        Ok(NodeData::YouTube(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::YouTube(video) = data else {
            return Err(mismatch(TYPE, data));
        };
        Ok(ExternalNode::element("iframe")
            .with_attr("data-lexical-youtube", video.video_id.as_str())
            .with_attr("width", "560")
            .with_attr("height", "315")
            .with_attr("src", video.embed_url())
            .with_attr("frameborder", "0")
            .with_attr("allowfullscreen", "true")
            .with_attr("title", "YouTube video"))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        let id = element.attr("data-lexical-youtube").filter(|id| !id.is_empty())?;
        Some(DomConversion::node(NodeData::YouTube(YouTube::new(id)), 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tweet_export_carries_url() {
        let exported = tweet::export(&NodeData::Tweet(Tweet::new("123")), Vec::new()).unwrap();
        assert_eq!(
            exported.as_element().unwrap().attr("data-lexical-tweet-id"),
            Some("123")
        );
        assert_eq!(exported.text_content(), "https://twitter.com/i/status/123");
    }

    #[test]
    fn test_youtube_field_name() {
        let fields = youtube::serialize(&NodeData::YouTube(YouTube::new("abc"))).unwrap();
        assert_eq!(fields["videoID"], json!("abc"));
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(tweet::deserialize(&json!({"type": "tweet", "id": ""})).is_err());
        assert!(youtube::deserialize(&json!({"type": "youtube"})).is_err());
    }
}
