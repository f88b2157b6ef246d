//! 对话接口处理器
//!
//! 按日期管理与大模型的对话记录，并在每次生成前拼装
//! 实时上下文（仓位快照、时间、期货K线分析），上下文本身不落盘。
//!
//! ## API 列表
//! - GET  /chats - 有对话记录的日期列表
//! - GET  /chat/{date} - 读取对话记录
//! - POST /chat/start/{date} - 以最新快讯开启对话并生成建议
//! - POST /chat/{date}/message - 追加一条用户消息并生成回复
//! - POST /chat/{date}/sync-previous - 将前一天的对话同步到该日期
//! - GET  /chat/{date}/message/stream - 发送消息并以 SSE 流式返回回复
//! - GET  /chat/{date}/news/latest/stream - 基于最新快讯流式生成增量建议

use std::convert::Infallible;
use std::fs;
use std::path::Path;

use actix_web::{http::header, web, HttpResponse, Result};
use anyhow::{anyhow, Result as AnyResult};
use chrono::{Days, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Asia::Shanghai;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::handlers::assets::{json_finite_number, read_asset_snapshot};
use crate::models::{ApiResponse, ChatMessage, ChatRecord, DateList};
use crate::services::paths::list_dated_files;
use crate::services::{agent, kline};
use crate::state::AppState;

// ==================== 纯函数辅助 ====================

/// UTC ISO 8601 时间串（落盘用）
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 北京时间的本地化时间串（提示词用）
fn now_local() -> String {
    Utc::now()
        .with_timezone(&Shanghai)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// 前一天的日期串；解析失败时取今天（北京时间）的前一天
fn prev_date_str(date: &str) -> String {
    let base = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().with_timezone(&Shanghai).date_naive());
    (base - Days::new(1)).format("%Y-%m-%d").to_string()
}

/// JSON 值的文本形式（字符串原样、数字转串），空串与 null 视为缺失
fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 按键名顺序取第一个非 null 的值
fn first_defined<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| entry.get(*k).filter(|v| !v.is_null()))
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 将资产条目渲染为仓位快照文本
///
/// 按条目形状区分：资产（assetName+amount）、基金（fundCode/fundName）、
/// 合约（symbol），无法识别的条目按 JSON 原样列出
pub fn format_positions(entries: &[Value], total_assets: f64) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|e| {
            let t = value_text(e.get("time"))
                .map(|time| format!("@{}", time))
                .unwrap_or_default();

            let amount = json_finite_number(e.get("amount"));
            if let (Some(name), Some(amount)) =
                (value_text(e.get("assetName")), amount)
            {
                let pct = if total_assets > 0.0 && amount >= 0.0 {
                    Some(format!("{:.2}%", amount / total_assets * 100.0))
                } else {
                    None
                };
                return match pct {
                    Some(pct) => format!("{} 资产 {} 金额 {}，占比 {}", t, name, amount, pct),
                    None => format!("{} 资产 {} 金额 {}", t, name, amount),
                };
            }

            if value_text(e.get("fundCode")).is_some() || value_text(e.get("fundName")).is_some() {
                let name = value_text(e.get("fundName"))
                    .or_else(|| value_text(e.get("fundCode")))
                    .or_else(|| value_text(e.get("code")))
                    .unwrap_or_default();
                let shares = first_defined(e, &["shares", "qty", "volume"])
                    .map(raw_text)
                    .unwrap_or_else(|| "0".to_string());
                let cost = first_defined(e, &["cost", "price"])
                    .map(raw_text)
                    .unwrap_or_else(|| "-".to_string());
                let platform = value_text(e.get("platform")).unwrap_or_default();
                return format!(
                    "{} 基金 {} 持有 {} 份，平台 {}，成本 {}",
                    t, name, shares, platform, cost
                );
            }

            if let Some(symbol) = value_text(e.get("symbol")) {
                let side = value_text(e.get("side"))
                    .or_else(|| value_text(e.get("direction")))
                    .unwrap_or_default()
                    .to_uppercase();
                let qty = first_defined(e, &["qty", "volume"])
                    .map(raw_text)
                    .unwrap_or_else(|| "0".to_string());
                let price = first_defined(e, &["cost", "price"])
                    .map(raw_text)
                    .unwrap_or_else(|| "-".to_string());
                return format!("{} 合约 {} {} {} 手，均价 {}", t, symbol, side, qty, price);
            }

            format!("{} 未知项 {}", t, e)
        })
        .collect();

    let prefix = if total_assets > 0.0 {
        format!("总资产：{} 元\n", total_assets)
    } else {
        String::new()
    };
    format!("仓位快照：\n{}{}", prefix, lines.join("\n"))
}

/// 时间上下文消息（每次生成前注入，不落盘）
fn build_time_context(date: &str) -> ChatMessage {
    ChatMessage::system(format!("当前日期：{}\n当前时间：{}\n", date, now_local()))
}

/// 拼装本次生成的实时上下文：仓位快照、时间、期货K线分析
fn build_prompt_context(
    state: &AppState,
    date: &str,
) -> (Option<ChatMessage>, ChatMessage, ChatMessage) {
    let positions = read_asset_snapshot(&state.paths)
        .map(|(entries, total)| format_positions(&entries, total))
        .filter(|s| !s.is_empty())
        .map(ChatMessage::system);
    let time_ctx = build_time_context(date);
    let summary = ChatMessage::system(format!(
        "期货K线分析：\n{}",
        kline::analyze_futures_for_date(&state.paths, date)
    ));
    (positions, time_ctx, summary)
}

// ==================== 文件读写 ====================

fn load_chat(path: &Path) -> AnyResult<ChatRecord> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("读取对话文件 {} 失败: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| anyhow!("对话文件格式无效: {}", e))
}

/// 读取对话记录，缺失或损坏时返回 None
fn read_chat_opt(path: &Path) -> Option<ChatRecord> {
    path.exists().then(|| load_chat(path).ok()).flatten()
}

fn write_chat(path: &Path, chat: &ChatRecord) -> AnyResult<()> {
    let text = serde_json::to_string_pretty(chat)?;
    fs::write(path, text).map_err(|e| anyhow!("写入对话文件 {} 失败: {}", path.display(), e))
}

// ==================== SSE 辅助 ====================

type SseSender = mpsc::UnboundedSender<web::Bytes>;

fn sse_response(rx: mpsc::UnboundedReceiver<web::Bytes>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>))
}

/// 增量片段封帧（多行内容按 SSE 规范逐行 data:）
fn sse_data(delta: &str) -> web::Bytes {
    let mut frame = String::new();
    for line in delta.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    web::Bytes::from(frame)
}

fn sse_done() -> web::Bytes {
    web::Bytes::from_static(b"event: done\ndata: end\n\n")
}

fn sse_error(message: &str) -> web::Bytes {
    web::Bytes::from(format!(
        "event: error\ndata: {}\n\n",
        serde_json::json!({ "message": message })
    ))
}

// ==================== 接口 ====================

/// 对话日期列表（侧边栏高亮用）
/// GET /chats
pub async fn list_chats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let dates = list_dated_files(&state.paths.chats_dir(), ".json");
    Ok(HttpResponse::Ok().json(ApiResponse::success(DateList { dates })))
}

/// 读取对话记录
/// GET /chat/{date}
pub async fn get_chat(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let date = path.into_inner();
    let file = state.paths.chat_for_date(&date);
    if !file.exists() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error("not_found")));
    }
    match load_chat(&file) {
        Ok(chat) => Ok(HttpResponse::Ok().json(ApiResponse::success(chat))),
        Err(e) => {
            log::error!("读取对话 {} 失败: {:#}", date, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("invalid_chat_format")))
        }
    }
}

/// 将前一天的对话同步到该日期（仅当该日期还没有对话时）
/// POST /chat/{date}/sync-previous
pub async fn sync_previous(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let date = path.into_inner();
    let target = state.paths.chat_for_date(&date);
    if target.exists() {
        return Ok(HttpResponse::Conflict()
            .json(ApiResponse::<()>::error("该日期已有对话，无法同步上一天。")));
    }
    let prev = prev_date_str(&date);
    let prev_path = state.paths.chat_for_date(&prev);
    if !prev_path.exists() {
        return Ok(
            HttpResponse::NotFound().json(ApiResponse::<()>::error("上一天没有对话可同步。"))
        );
    }

    let result = load_chat(&prev_path).and_then(|prev_chat| {
        let now = now_iso();
        let mut messages = vec![build_time_context(&date)];
        messages.extend(prev_chat.messages);
        let chat = ChatRecord {
            date: date.clone(),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            messages,
        };
        write_chat(&target, &chat)?;
        Ok(chat)
    });
    match result {
        Ok(chat) => Ok(HttpResponse::Ok().json(ApiResponse::success(chat))),
        Err(e) => {
            log::error!("同步上一天对话失败: {:#}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error("sync_failed")))
        }
    }
}

/// 以最新快讯开启对话并生成投资建议
/// POST /chat/start/{date}
pub async fn start_chat(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let date = path.into_inner();
    match run_start_chat(&state, &date).await {
        Ok(chat) => Ok(HttpResponse::Ok().json(ApiResponse::success(chat))),
        Err(e) => {
            log::error!("开启对话失败: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("chat_start_failed")))
        }
    }
}

async fn run_start_chat(state: &AppState, date: &str) -> AnyResult<ChatRecord> {
    let news_mixed = agent::mix_news(&state.paths).await?;
    let (positions, time_ctx, summary) = build_prompt_context(state, date);
    let positions_summary = positions
        .as_ref()
        .map(|m| format!("{}\n\n", m.content))
        .unwrap_or_default();
    let opener = format!(
        "{}\n\n{}{}",
        agent::PROMPT_OPENER,
        positions_summary,
        news_mixed
    );

    let mut messages = vec![
        ChatMessage::assistant(agent::PROMPT_AI_STRATEGY),
        time_ctx,
        summary,
        ChatMessage::user(opener),
    ];
    let advice = state.llm.generate_with_list(&messages, |_| {}).await?;
    messages.push(ChatMessage::assistant(advice));

    let chat = ChatRecord {
        date: date.to_string(),
        created_at: Some(now_iso()),
        updated_at: None,
        messages,
    };
    write_chat(&state.paths.chat_for_date(date), &chat)?;
    Ok(chat)
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub text: Option<String>,
}

/// 追加一条用户消息并生成回复
/// POST /chat/{date}/message
pub async fn post_message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<MessageBody>,
) -> Result<HttpResponse> {
    let date = path.into_inner();
    let text = body.text.clone().unwrap_or_default().trim().to_string();
    if text.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error("empty_text")));
    }
    if !state.paths.chat_for_date(&date).exists() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error("not_found")));
    }
    match run_post_message(&state, &date, &text).await {
        Ok(chat) => Ok(HttpResponse::Ok().json(ApiResponse::success(chat))),
        Err(e) => {
            log::error!("对话回复失败: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("chat_message_failed")))
        }
    }
}

async fn run_post_message(state: &AppState, date: &str, text: &str) -> AnyResult<ChatRecord> {
    let file = state.paths.chat_for_date(date);
    let mut chat = load_chat(&file)?;
    let base = chat.messages.clone();

    let (positions, time_ctx, summary) = build_prompt_context(state, date);
    let mut prompt = Vec::new();
    if let Some(p) = positions {
        prompt.push(p);
    }
    prompt.push(time_ctx);
    prompt.push(summary);
    prompt.extend(base.iter().cloned());
    prompt.push(ChatMessage::user(text));

    let reply = state.llm.generate_with_list(&prompt, |_| {}).await?;

    chat.messages = base;
    chat.messages.push(ChatMessage::user(text));
    chat.messages.push(ChatMessage::assistant(reply));
    chat.updated_at = Some(now_iso());
    write_chat(&file, &chat)?;
    Ok(chat)
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub text: Option<String>,
}

/// 发送消息并以 SSE 流式返回回复
/// GET /chat/{date}/message/stream?text=...
pub async fn message_stream(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<StreamQuery>,
) -> Result<HttpResponse> {
    let date = path.into_inner();
    let text = query.text.clone().unwrap_or_default().trim().to_string();
    if text.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error("empty_text")));
    }
    if !state.paths.chat_for_date(&date).exists() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error("not_found")));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let app = state.get_ref().clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = stream_message_reply(&app, &date, &text, &tx).await {
            log::error!("对话流式回复失败: {:#}", e);
            let _ = tx.send(sse_error(&e.to_string()));
        }
    });
    Ok(sse_response(rx))
}

async fn stream_message_reply(
    state: &AppState,
    date: &str,
    text: &str,
    tx: &SseSender,
) -> AnyResult<()> {
    let file = state.paths.chat_for_date(date);
    let mut chat = load_chat(&file)?;
    let base = chat.messages.clone();

    let (positions, time_ctx, summary) = build_prompt_context(state, date);
    let mut prompt = Vec::new();
    if let Some(p) = positions {
        prompt.push(p);
    }
    prompt.push(time_ctx);
    prompt.push(summary);
    prompt.extend(base.iter().cloned());
    prompt.push(ChatMessage::user(text));

    let sender = tx.clone();
    let reply = state
        .llm
        .generate_with_list(&prompt, move |delta| {
            let _ = sender.send(sse_data(delta));
        })
        .await?;

    chat.messages = base;
    chat.messages.push(ChatMessage::user(text));
    chat.messages.push(ChatMessage::assistant(reply));
    chat.updated_at = Some(now_iso());
    write_chat(&file, &chat)?;

    let _ = tx.send(sse_done());
    Ok(())
}

/// 基于最新快讯流式生成增量建议，必要时自动创建当日对话
/// GET /chat/{date}/news/latest/stream
pub async fn news_stream(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let date = path.into_inner();
    let (tx, rx) = mpsc::unbounded_channel();
    let app = state.get_ref().clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = stream_news_reply(&app, &date, &tx).await {
            log::error!("快讯流式建议失败: {:#}", e);
            let _ = tx.send(sse_error(&e.to_string()));
        }
    });
    Ok(sse_response(rx))
}

async fn stream_news_reply(state: &AppState, date: &str, tx: &SseSender) -> AnyResult<()> {
    let news_mixed = agent::mix_news(&state.paths).await?;

    let file = state.paths.chat_for_date(date);
    let chat = read_chat_opt(&file).unwrap_or_else(|| {
        let mut fresh = ChatRecord::new(date);
        fresh.created_at = Some(now_iso());
        fresh
            .messages
            .push(ChatMessage::assistant(agent::PROMPT_AI_STRATEGY));
        fresh
    });
    let base = chat.messages;

    let (positions, time_ctx, summary) = build_prompt_context(state, date);
    let user_msg = ChatMessage::user(agent::PROMPT_AUTO_NEWS);
    let news_msg = ChatMessage::system(news_mixed);

    let mut prompt = Vec::new();
    if let Some(p) = positions {
        prompt.push(p);
    }
    prompt.push(time_ctx.clone());
    prompt.push(summary.clone());
    prompt.extend(base.iter().cloned());
    prompt.push(user_msg.clone());
    prompt.push(news_msg.clone());

    let sender = tx.clone();
    let reply = state
        .llm
        .generate_with_list(&prompt, move |delta| {
            let _ = sender.send(sse_data(delta));
        })
        .await?;

    // 生成期间文件可能被其它请求改写，落盘前重读一次
    let mut persisted = read_chat_opt(&file).unwrap_or_else(|| ChatRecord::new(date));
    let assistant = ChatMessage::assistant(reply).with_tag("latest_news");
    let mut messages = base;
    messages.extend([user_msg, news_msg, summary, time_ctx, assistant]);
    persisted.messages = messages;
    persisted.updated_at = Some(now_iso());
    write_chat(&file, &persisted)?;

    let _ = tx.send(sse_done());
    Ok(())
}

/// 配置对话相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/chats", web::get().to(list_chats))
        .route("/chat/start/{date}", web::post().to(start_chat))
        .route("/chat/{date}/sync-previous", web::post().to(sync_previous))
        .route("/chat/{date}/message", web::post().to(post_message))
        .route("/chat/{date}/message/stream", web::get().to(message_stream))
        .route("/chat/{date}/news/latest/stream", web::get().to(news_stream))
        .route("/chat/{date}", web::get().to(get_chat));
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::llm::LlmClient;
    use crate::services::paths::DataPaths;
    use actix_web::{test, App};
    use serde_json::json;

    fn test_state(root: &std::path::Path) -> web::Data<AppState> {
        let config = AppConfig::default();
        let paths = DataPaths::new(root);
        paths.ensure_dirs().unwrap();
        let llm = LlmClient::new(&config.llm);
        web::Data::new(AppState { config, paths, llm })
    }

    // ==================== 仓位快照渲染 ====================

    #[::core::prelude::v1::test]
    fn test_format_positions_asset_with_pct() {
        let entries = vec![json!({"time": "08:00", "assetName": "货基", "amount": 2500})];
        let text = format_positions(&entries, 10000.0);
        assert_eq!(
            text,
            "仓位快照：\n总资产：10000 元\n@08:00 资产 货基 金额 2500，占比 25.00%"
        );
    }

    #[::core::prelude::v1::test]
    fn test_format_positions_no_total() {
        let entries = vec![json!({"assetName": "货基", "amount": 2500})];
        let text = format_positions(&entries, 0.0);
        // 总资产为零：无前缀、无占比
        assert_eq!(text, "仓位快照：\n 资产 货基 金额 2500");
    }

    #[::core::prelude::v1::test]
    fn test_format_positions_fund_and_contract() {
        let entries = vec![
            json!({"fundName": "纳指ETF", "fundCode": "513100", "shares": 3000, "cost": 1.52, "platform": "支付宝"}),
            json!({"symbol": "NQ2503", "side": "long", "qty": 2, "price": 21500}),
        ];
        let text = format_positions(&entries, 0.0);
        assert!(text.contains("基金 纳指ETF 持有 3000 份，平台 支付宝，成本 1.52"));
        assert!(text.contains("合约 NQ2503 LONG 2 手，均价 21500"));
    }

    #[::core::prelude::v1::test]
    fn test_format_positions_fund_aliases_and_unknown() {
        let entries = vec![
            json!({"fundCode": "513100", "qty": 5}),
            json!({"note": "现金"}),
        ];
        let text = format_positions(&entries, 0.0);
        // 基金名缺失时退回代码，份额走 qty 别名
        assert!(text.contains("基金 513100 持有 5 份"));
        assert!(text.contains("未知项"));
        assert!(text.contains("现金"));
    }

    #[::core::prelude::v1::test]
    fn test_format_positions_empty() {
        assert_eq!(format_positions(&[], 100.0), "");
    }

    // ==================== 日期与上下文 ====================

    #[::core::prelude::v1::test]
    fn test_prev_date_str() {
        assert_eq!(prev_date_str("2025-01-01"), "2024-12-31");
        assert_eq!(prev_date_str("2025-03-01"), "2025-02-28");
        // 无效输入退回今天的前一天，仍是合法日期
        assert!(NaiveDate::parse_from_str(&prev_date_str("垃圾输入"), "%Y-%m-%d").is_ok());
    }

    #[::core::prelude::v1::test]
    fn test_build_time_context() {
        let msg = build_time_context("2025-01-02");
        assert_eq!(msg.role, "system");
        assert!(msg.content.contains("当前日期：2025-01-02"));
        assert!(msg.content.contains("当前时间："));
    }

    // ==================== SSE 封帧 ====================

    #[::core::prelude::v1::test]
    fn test_sse_data_single_line() {
        assert_eq!(&sse_data("建议观望")[..], b"data: \xe5\xbb\xba\xe8\xae\xae\xe8\xa7\x82\xe6\x9c\x9b\n\n");
    }

    #[::core::prelude::v1::test]
    fn test_sse_data_multiline() {
        let frame = String::from_utf8(sse_data("第一行\n第二行").to_vec()).unwrap();
        assert_eq!(frame, "data: 第一行\ndata: 第二行\n\n");
    }

    #[::core::prelude::v1::test]
    fn test_sse_error_is_json() {
        let frame = String::from_utf8(sse_error("boom").to_vec()).unwrap();
        assert!(frame.starts_with("event: error\ndata: {"));
        assert!(frame.contains(r#""message":"boom""#));
    }

    // ==================== 接口（不触网的路径） ====================

    #[actix_web::test]
    async fn test_get_chat_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::get().uri("/chat/2099-01-01").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_sync_previous_flow() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let paths = state.paths.clone();
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        // 上一天没有对话 -> 404
        let req = test::TestRequest::post()
            .uri("/chat/2025-01-02/sync-previous")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        // 准备前一天的对话
        let prev = ChatRecord {
            date: "2025-01-01".to_string(),
            created_at: Some("2025-01-01T00:00:00.000Z".to_string()),
            updated_at: None,
            messages: vec![ChatMessage::assistant("历史建议")],
        };
        write_chat(&paths.chat_for_date("2025-01-01"), &prev).unwrap();

        let req = test::TestRequest::post()
            .uri("/chat/2025-01-02/sync-previous")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let synced = load_chat(&paths.chat_for_date("2025-01-02")).unwrap();
        assert_eq!(synced.date, "2025-01-02");
        // 时间上下文在前，历史消息完整保留
        assert_eq!(synced.messages[0].role, "system");
        assert!(synced.messages[0].content.contains("当前日期：2025-01-02"));
        assert_eq!(synced.messages[1].content, "历史建议");

        // 目标日期已有对话 -> 409
        let req = test::TestRequest::post()
            .uri("/chat/2025-01-02/sync-previous")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn test_list_chats() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let paths = state.paths.clone();
        write_chat(&paths.chat_for_date("2025-01-02"), &ChatRecord::new("2025-01-02")).unwrap();
        write_chat(&paths.chat_for_date("2025-01-01"), &ChatRecord::new("2025-01-01")).unwrap();

        let app = test::init_service(App::new().app_data(state).configure(config)).await;
        let req = test::TestRequest::get().uri("/chats").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["dates"], json!(["2025-01-01", "2025-01-02"]));
    }

    #[actix_web::test]
    async fn test_message_requires_text_and_chat() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/chat/2025-01-02/message")
            .set_json(json!({"text": "  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/chat/2025-01-02/message")
            .set_json(json!({"text": "帮我看看"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    /// 对话记录读写往返，保留 tag 字段
    #[::core::prelude::v1::test]
    fn test_chat_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        paths.ensure_dirs().unwrap();

        let mut chat = ChatRecord::new("2025-01-02");
        chat.messages.push(ChatMessage::user("你好"));
        chat.messages.push(ChatMessage::assistant("建议观望").with_tag("latest_news"));
        let path = paths.chat_for_date("2025-01-02");
        write_chat(&path, &chat).unwrap();

        let loaded = load_chat(&path).unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1].tag.as_deref(), Some("latest_news"));
    }
}
