//! Message types: what the gateway reads back from a channel.
//!
//! Only the parts of a chat message the farm loop inspects are modelled: the
//! raw text body and the rich "embed" blocks bots use for formatted replies.
//! Every field is optional on the wire and decodes to an empty value when
//! absent, so scanning code never has to treat a missing field as an error.

use serde::{Deserialize, Serialize};

/// A single message fetched from a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Platform message ID (snowflake), if provided
    #[serde(default)]
    pub id: String,

    /// Raw text body (may be empty, e.g. for embed-only bot replies)
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    /// Rich embed blocks attached to the message
    #[serde(default, deserialize_with = "null_as_default")]
    pub embeds: Vec<Embed>,
}

/// A rich embed block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub fields: Vec<EmbedField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

/// A name/value pair inside an embed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// The author line of an embed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    /// Create a plain-text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Create a message carrying a single embed and no text body.
    pub fn with_embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }
}

impl Embed {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: Some(name.into()),
        });
        self
    }

    /// Title, or the empty string.
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Description, or the empty string.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Author display name, or the empty string.
    pub fn author_text(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_discord_payload_with_missing_fields() {
        let json = r#"[
            {"id": "1", "content": "hello", "embeds": []},
            {"id": "2", "content": "", "embeds": [
                {"title": "Inventory", "description": "051 x2",
                 "fields": [{"name": "note", "value": "ok"}],
                 "author": {"name": "OwO"}}
            ]},
            {"id": "3"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].embeds[0].title_text(), "Inventory");
        assert_eq!(messages[1].embeds[0].fields[0].value, "ok");
        assert_eq!(messages[1].embeds[0].author_text(), "OwO");
        assert!(messages[2].content.is_empty());
        assert!(messages[2].embeds.is_empty());
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let json = r#"{"content": null, "embeds": [{"title": null, "fields": null, "author": {}}]}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.content.is_empty());
        let embed = &msg.embeds[0];
        assert_eq!(embed.title_text(), "");
        assert_eq!(embed.description_text(), "");
        assert_eq!(embed.author_text(), "");
        assert!(embed.fields.is_empty());
    }

    #[test]
    fn embed_builder() {
        let embed = Embed::titled("t").description("d").field("n", "v").author("a");
        assert_eq!(embed.title_text(), "t");
        assert_eq!(embed.description_text(), "d");
        assert_eq!(embed.fields.len(), 1);
        assert_eq!(embed.author_text(), "a");
    }
}
