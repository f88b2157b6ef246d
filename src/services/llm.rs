//! 大模型客户端
//!
//! OpenAI 兼容的 chat/completions 流式客户端：
//! 始终以 stream 模式请求，逐行消费 SSE 响应体，
//! 每个增量片段回调一次，结束后返回完整文本

use anyhow::{anyhow, Result};
use futures::StreamExt;
use reqwest::Client;
use serde_json::json;

use crate::config::LlmConfig;
use crate::models::ChatMessage;

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// SSE 响应中的一行
enum StreamEvent {
    /// 增量文本
    Delta(String),
    /// 流结束标记
    Done,
    /// 其它行（注释、心跳、空行、非内容增量）
    Skip,
}

/// 解析一行流式响应
fn parse_stream_line(line: &str) -> StreamEvent {
    let Some(payload) = line.strip_prefix("data:") else {
        return StreamEvent::Skip;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return StreamEvent::Done;
    }
    if payload.is_empty() {
        return StreamEvent::Skip;
    }
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(chunk) => match chunk["choices"][0]["delta"]["content"].as_str() {
            Some(delta) if !delta.is_empty() => StreamEvent::Delta(delta.to_string()),
            _ => StreamEvent::Skip,
        },
        Err(_) => StreamEvent::Skip,
    }
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// 以给定消息列表发起流式对话
    ///
    /// 每收到一个增量片段调用一次 on_delta，返回拼接后的完整回复
    pub async fn generate_with_list<F>(
        &self,
        messages: &[ChatMessage],
        mut on_delta: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("请求大模型接口失败: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("大模型接口返回错误: {}", response.status()));
        }

        let mut stream = response.bytes_stream();
        // 按字节缓冲，整行再转字符串，避免多字节字符被分块截断
        let mut buf: Vec<u8> = Vec::new();
        let mut text = String::new();

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| anyhow!("读取大模型响应流失败: {}", e))?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                match parse_stream_line(line.trim()) {
                    StreamEvent::Delta(delta) => {
                        text.push_str(&delta);
                        on_delta(&delta);
                    }
                    StreamEvent::Done => break 'outer,
                    StreamEvent::Skip => {}
                }
            }
        }

        Ok(text)
    }
}

// ==================== 测试模块 ====================
