//! 财经快讯服务
//!
//! 对接东方财富 7x24 快讯接口（JSONP），按排序游标增量拉取：
//! 游标为微秒级整数，保存在 newssort 目录下，
//! 全局文件 sort 优先于当日文件，每次读取后回写当日文件

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Shanghai;
use reqwest::Client;

use crate::models::{FastNewsItem, FastNewsResponse};
use crate::services::paths::DataPaths;

/// 东方财富快讯列表 API
const FAST_NEWS_API: &str = "https://np-weblist.eastmoney.com/comm/web/getFastNewsList";
/// 快讯栏目（111 为全球，101 为美国）
const FAST_COLUMN: &str = "111";

/// 无新增快讯时的固定文案
pub const NO_NEWS: &str = "无最新消息";

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn today_shanghai() -> String {
    Utc::now()
        .with_timezone(&Shanghai)
        .format("%Y-%m-%d")
        .to_string()
}

/// 当日零点（北京时间）的毫秒时间戳
fn beijing_midnight_ms() -> i64 {
    let midnight = Utc::now()
        .with_timezone(&Shanghai)
        .date_naive()
        .and_time(NaiveTime::MIN);
    Shanghai
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(now_ms)
}

/// 读取游标文件中的微秒级时间戳
fn read_cursor(path: &Path) -> Option<i64> {
    let raw = fs::read_to_string(path).ok()?;
    let ts = raw.trim().parse::<i64>().ok()?;
    (ts > 0).then_some(ts)
}

/// 覆盖写入当日游标文件
fn write_cursor(paths: &DataPaths, value_us: i64) {
    let dated = paths.news_sort_for_date(&today_shanghai());
    if let Err(e) = fs::create_dir_all(paths.news_sort_dir()) {
        log::warn!("创建快讯游标目录失败: {}", e);
        return;
    }
    if let Err(e) = fs::write(&dated, value_us.to_string()) {
        log::warn!("写入快讯游标 {} 失败: {}", dated.display(), e);
    }
}

/// 取上次拉取位置（毫秒）
///
/// 全局游标文件存在时只读它，否则读当日文件；
/// 两者都没有时取当日零点。读到的值同时回写到当日文件
pub fn get_last_trade_time(paths: &DataPaths) -> i64 {
    let global = paths.news_sort_global();
    let dated = paths.news_sort_for_date(&today_shanghai());

    let last_us = if global.exists() {
        read_cursor(&global)
    } else if dated.exists() {
        read_cursor(&dated)
    } else {
        None
    };

    let (last_ms, last_us) = match last_us {
        // 原始值为微秒级，截掉末尾 3 位转毫秒
        Some(us) => (us / 1000, us),
        None => {
            let ms = beijing_midnight_ms();
            (ms, ms * 1000)
        }
    };

    write_cursor(paths, last_us);
    last_ms
}

/// 生成 JSONP 回调名（jQuery{随机}_{毫秒}）
fn jsonp_callback() -> String {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "jQuery{}_{}",
        elapsed.as_nanos() % 10u128.pow(16),
        elapsed.as_millis()
    )
}

/// 去掉 JSONP 回调包装，取出括号内的 JSON
fn strip_jsonp<'a>(text: &'a str, callback: &str) -> Result<&'a str> {
    let rest = text.strip_prefix(callback).unwrap_or(text);
    let start = rest.find('(').ok_or_else(|| anyhow!("无效的快讯响应格式"))?;
    let end = rest.rfind(')').ok_or_else(|| anyhow!("无效的快讯响应格式"))?;
    if end <= start {
        return Err(anyhow!("无效的快讯响应格式"));
    }
    Ok(&rest[start + 1..end])
}

/// 拉取一批快讯
async fn fetch_fast_news(req_trace_ms: i64) -> Result<Vec<FastNewsItem>> {
    let client = Client::new();
    let callback = jsonp_callback();
    let response = client
        .get(FAST_NEWS_API)
        .query(&[
            ("client", "web"),
            ("biz", "web_724"),
            ("fastColumn", FAST_COLUMN),
            ("sortEnd", ""),
            ("pageSize", "50"),
            ("req_trace", &req_trace_ms.to_string()),
            ("_", &now_ms().to_string()),
            ("callback", &callback),
        ])
        .send()
        .await
        .map_err(|e| anyhow!("请求快讯接口失败: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!("快讯接口返回错误: {}", response.status()));
    }

    let text = response.text().await?;
    let body = strip_jsonp(&text, &callback)?;
    let parsed: FastNewsResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("解析快讯响应失败: {}", e))?;
    Ok(parsed.data.map(|d| d.fast_news_list).unwrap_or_default())
}

/// 过滤出游标之后的快讯并渲染为文本
fn render_news(list: &[FastNewsItem], cutoff_ms: i64) -> String {
    let joined = list
        .iter()
        .filter(|item| item.show_time_ms().map_or(false, |ms| ms > cutoff_ms))
        .map(|item| format!("{}\n{}", item.show_time_text(), item.summary))
        .collect::<Vec<_>>()
        .join("\n");
    if joined.is_empty() {
        NO_NEWS.to_string()
    } else {
        joined
    }
}

/// 增量拉取最新快讯
///
/// 成功后将本批最大的 realSort 写入当日游标，作为下一次的起点
pub async fn get_fast_news_list(paths: &DataPaths) -> Result<String> {
    let last_trade_time = get_last_trade_time(paths);
    let list = fetch_fast_news(last_trade_time).await?;

    if let Some(max_sort) = list
        .iter()
        .filter_map(FastNewsItem::real_sort_i64)
        .max()
        .filter(|&s| s > 0)
    {
        write_cursor(paths, max_sort);
    }

    Ok(render_news(&list, last_trade_time))
}

/// 拉取今日快讯（零点起，不更新游标）
pub async fn get_today_news_list() -> Result<String> {
    let cutoff = beijing_midnight_ms();
    let list = fetch_fast_news(cutoff).await?;
    Ok(render_news(&list, cutoff))
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonp() {
        let cb = "jQuery123_456";
        let text = r#"jQuery123_456({"data":{"fastNewsList":[]}})"#;
        assert_eq!(strip_jsonp(text, cb).unwrap(), r#"{"data":{"fastNewsList":[]}}"#);
        assert!(strip_jsonp("no parens", cb).is_err());
    }

    #[test]
    fn test_parse_fast_news_payload() {
        let body = r#"{"data":{"fastNewsList":[
            {"realSort":"1761955112049170","showTime":"2025-11-01 08:00:00","summary":"消息一"},
            {"realSort":1761955112049180,"showTime":1761955200000,"summary":"消息二"}
        ]}}"#;
        let parsed: FastNewsResponse = serde_json::from_str(body).unwrap();
        let list = parsed.data.unwrap().fast_news_list;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].real_sort_i64(), Some(1761955112049170));
        assert_eq!(list[1].real_sort_i64(), Some(1761955112049180));
        assert_eq!(list[1].show_time_ms(), Some(1761955200000));
        // 字符串时间按北京时间解析
        assert!(list[0].show_time_ms().is_some());
    }

    #[test]
    fn test_render_news_filters_by_cutoff() {
        let list: Vec<FastNewsItem> = serde_json::from_str(
            r#"[
                {"realSort":"1","showTime":1000,"summary":"旧消息"},
                {"realSort":"2","showTime":2000,"summary":"新消息"}
            ]"#,
        )
        .unwrap();
        let text = render_news(&list, 1500);
        assert!(text.contains("新消息"));
        assert!(!text.contains("旧消息"));
        assert_eq!(render_news(&list, 3000), NO_NEWS);
    }

    #[test]
    fn test_last_trade_time_prefers_global_cursor() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        paths.ensure_dirs().unwrap();

        // 无游标：落到当日零点并回写当日文件
        let ms = get_last_trade_time(&paths);
        assert!(ms > 0);
        let dated = paths.news_sort_for_date(&today_shanghai());
        assert_eq!(read_cursor(&dated), Some(ms * 1000));

        // 全局文件优先
        fs::write(paths.news_sort_global(), "1761955112049170").unwrap();
        assert_eq!(get_last_trade_time(&paths), 1761955112049);
        // 读取后回写到当日文件
        assert_eq!(read_cursor(&dated), Some(1761955112049170));
    }

    #[test]
    fn test_jsonp_callback_shape() {
        let cb = jsonp_callback();
        assert!(cb.starts_with("jQuery"));
        assert!(cb.contains('_'));
    }
}
