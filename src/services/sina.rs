//! 新浪行情服务
//!
//! 对接 https://hq.sinajs.cn 获取外盘期货实时快照（GB18030 编码），
//! 以及美股列表行情接口

use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;

use crate::models::{FuturesQuote, StockHqQuery};

/// 新浪外盘期货实时行情 API
const SINA_HQ_API: &str = "https://hq.sinajs.cn/etag.php";
/// 新浪美股列表 API
const SINA_US_LIST_API: &str =
    "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/US_CategoryService.getList";
/// 轮询的期货品种（纳指期货）
const FUTURES_LIST: &str = "hf_NQ";

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// 获取期货实时快照
pub async fn get_futures() -> Result<FuturesQuote> {
    let client = Client::new();
    let response = client
        .get(SINA_HQ_API)
        .query(&[("list", FUTURES_LIST)])
        .header("Host", "hq.sinajs.cn")
        .header("Referer", "https://finance.sina.com.cn/futures/quotes/NQ.shtml")
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取期货行情失败: {}", response.status()));
    }

    let bytes = response.bytes().await?;
    let text = encoding_rs::GB18030.decode(&bytes).0.to_string();
    parse_futures_quote(&text)
}

/// 解析新浪期货实时数据
///
/// 格式: var hq_str_hf_NQ="23950.5,...,NQ纳指期货"; 取引号内逗号分隔的字段
pub fn parse_futures_quote(text: &str) -> Result<FuturesQuote> {
    let re = Regex::new(r#""([^"]+)""#).unwrap();
    let payload = re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| anyhow!("无法解析行情响应"))?;

    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() < 14 {
        return Err(anyhow!(
            "数据字段不足: 期望至少14个，实际{}个",
            fields.len()
        ));
    }

    Ok(FuturesQuote {
        now_price: fields[0].to_string(),
        buy_price: fields[2].to_string(),
        sell_price: fields[3].to_string(),
        high_price: fields[4].to_string(),
        low_price: fields[5].to_string(),
        time: fields[6].to_string(),
        open_price: fields[8].to_string(),
        trade_date: fields[12].to_string(),
        name: fields[13].to_string(),
    })
}

/// 渲染为期货日内文件的一行（K线解析使用同一键名词表）
pub fn format_day_line(quote: &FuturesQuote) -> String {
    format!(
        "名称:{}|现价:{}|买价:{}|卖价:{}|最高价:{}|最低价:{}|今日时间:{}|当前时间:{}|今日开盘价:{}\n",
        quote.name,
        quote.now_price,
        quote.buy_price,
        quote.sell_price,
        quote.high_price,
        quote.low_price,
        quote.trade_date,
        quote.time,
        quote.open_price,
    )
}

/// 获取美股列表行情
pub async fn get_us_stock_list(query: &StockHqQuery) -> Result<Vec<serde_json::Value>> {
    let client = Client::new();
    let response = client
        .get(SINA_US_LIST_API)
        .query(&[
            ("page", query.page.unwrap_or(1).to_string()),
            ("num", query.num.unwrap_or(20).to_string()),
            ("sort", query.sort.clone().unwrap_or_default()),
            ("asc", query.asc.unwrap_or(0).to_string()),
            ("market", query.market.clone().unwrap_or_else(|| "O".to_string())),
            ("id", query.id.clone().unwrap_or_default()),
        ])
        .header("Referer", "https://finance.sina.com.cn/")
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取美股列表失败: {}", response.status()));
    }

    let text = response.text().await?;
    parse_us_stock_list(&text)
}

/// 解析美股列表响应，兼容裸 JSON 与 IIFE 包装两种返回
fn parse_us_stock_list(text: &str) -> Result<Vec<serde_json::Value>> {
    let trimmed = text.trim().trim_end_matches(';');
    let json_str = match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => trimmed,
    };

    let value: serde_json::Value =
        serde_json::from_str(json_str.trim()).map_err(|e| anyhow!("解析美股列表失败: {}", e))?;

    let list = match &value {
        serde_json::Value::Array(arr) => arr.clone(),
        serde_json::Value::Object(obj) => obj
            .get("data")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    Ok(list)
}

// ==================== 测试模块 ====================
