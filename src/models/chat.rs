//! 对话数据模型
//!
//! 按日期落盘的对话记录，字段名与存量 JSON 文件保持 camelCase

use serde::{Deserialize, Serialize};

/// 单条对话消息
///
/// role 取 "system" / "user" / "assistant"；tag 仅用于标注自动生成的消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

/// 单日对话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRecord {
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            created_at: None,
            updated_at: None,
            messages: Vec::new(),
        }
    }
}
