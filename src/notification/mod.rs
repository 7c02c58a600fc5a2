//! Outbound chat-webhook notifications.
//!
//! Every enabled channel receives the same flattened diagnostic text; only
//! the JSON envelope around it differs per channel.

pub mod webhook;

use crate::notifier::ChannelKind;
use serde::Serialize;

/// A channel-specific JSON message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `{"msgtype":"text","text":{"content":"..."}}`
    WeCom {
        msgtype: &'static str,
        text: WeComText,
    },
    /// `{"msg_type":"text","content":{"text":"..."}}`
    Feishu {
        msg_type: &'static str,
        content: FeishuText,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeComText {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeishuText {
    pub text: String,
}

impl Envelope {
    /// Wraps `text` in the envelope expected by `kind`.
    pub fn text(kind: ChannelKind, text: impl Into<String>) -> Self {
        match kind {
            ChannelKind::WeCom => Envelope::WeCom {
                msgtype: "text",
                text: WeComText {
                    content: text.into(),
                },
            },
            ChannelKind::Feishu => Envelope::Feishu {
                msg_type: "text",
                content: FeishuText { text: text.into() },
            },
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Envelope::WeCom { .. } => ChannelKind::WeCom,
            Envelope::Feishu { .. } => ChannelKind::Feishu,
        }
    }

    /// The wrapped text, whatever the channel.
    pub fn content(&self) -> &str {
        match self {
            Envelope::WeCom { text, .. } => &text.content,
            Envelope::Feishu { content, .. } => &content.text,
        }
    }
}
