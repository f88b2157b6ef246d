//! 快讯数据模型
//!
//! 快讯接口返回的条目结构，showTime/realSort 在上游既可能是字符串也可能是数字

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};

/// 单条快讯
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastNewsItem {
    /// 排序游标（微秒级，字符串或数字）
    #[serde(default)]
    pub real_sort: serde_json::Value,
    /// 展示时间（"YYYY-MM-DD HH:MM:SS" 或毫秒时间戳）
    #[serde(default)]
    pub show_time: serde_json::Value,
    #[serde(default)]
    pub summary: String,
}

impl FastNewsItem {
    /// realSort 转为整数，无法解析时为 None
    pub fn real_sort_i64(&self) -> Option<i64> {
        match &self.real_sort {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// showTime 转为毫秒时间戳（字符串按北京时间解析）
    pub fn show_time_ms(&self) -> Option<i64> {
        match &self.show_time {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => {
                let s = s.trim();
                if let Ok(ms) = s.parse::<i64>() {
                    return Some(ms);
                }
                let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()?;
                Shanghai
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.timestamp_millis())
            }
            _ => None,
        }
    }

    /// showTime 的展示文本
    pub fn show_time_text(&self) -> String {
        match &self.show_time {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// 快讯列表响应
#[derive(Debug, Deserialize)]
pub struct FastNewsResponse {
    #[serde(default)]
    pub data: Option<FastNewsData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastNewsData {
    #[serde(default)]
    pub fast_news_list: Vec<FastNewsItem>,
}

/// 快讯内容（对外响应体）
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsContent {
    pub content: String,
}
