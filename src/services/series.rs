//! 前端图表用的K线序列合成
//!
//! 与分析流水线不同的第二种读取方式：逐行取价（现价/最新价/收盘价按序回退），
//! 由收盘序列合成每周期 OHLC（open=上一收盘），供前端蜡烛图渲染。
//! 周度接口将周一至截止日的逐日序列拼接在一起，开盘链在日界处重置

use std::collections::HashMap;
use std::fs;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, NaiveDate};

use crate::models::{KlineSeries, WeeklySeries};
use crate::services::paths::DataPaths;

/// 行内键值对解析（仅保留键非空的段）
fn parse_line_map(line: &str) -> HashMap<&str, &str> {
    let mut map = HashMap::new();
    for part in line.split('|').map(str::trim) {
        if let Some(idx) = part.find(':') {
            if idx > 0 {
                map.insert(part[..idx].trim(), part[idx + 1..].trim());
            }
        }
    }
    map
}

/// 按优先级取该行的价格：现价 > 最新价 > 收盘价，取首个非空值
fn line_close(map: &HashMap<&str, &str>) -> Option<f64> {
    let raw = ["现价", "最新价", "收盘价"]
        .iter()
        .find_map(|k| map.get(k).filter(|v| !v.is_empty()))?;
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 该行的开盘价：今日开盘价 > 开盘价
fn line_open(map: &HashMap<&str, &str>) -> Option<f64> {
    let raw = ["今日开盘价", "开盘价"]
        .iter()
        .find_map(|k| map.get(k).filter(|v| !v.is_empty()))?;
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 由收盘序列合成一个周期的 OHLC，元素顺序 [open, close, low, high]
fn synth_period(prev_close: Option<f64>, close: f64) -> [f64; 4] {
    let open = prev_close.unwrap_or(close);
    [open, close, open.min(close), open.max(close)]
}

/// 解析一天的行情文本为图表序列
pub fn day_kline_series(text: &str) -> KlineSeries {
    let mut name = String::new();
    let mut times = Vec::new();
    let mut closes: Vec<f64> = Vec::new();
    let mut day_open = None;
    let mut last_close = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let map = parse_line_map(line);
        if name.is_empty() {
            // 名称由首行决定，缺失时使用默认值
            name = map
                .get("名称")
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .unwrap_or_else(|| "期货".to_string());
        }
        // 当日开盘价/昨日收盘价：以文件中最后一次出现的有效值为准
        if let Some(open) = line_open(&map) {
            day_open = Some(open);
        }
        if let Some(raw) = map.get("昨日收盘价").filter(|v| !v.is_empty()) {
            if let Ok(n) = raw.parse::<f64>() {
                if n.is_finite() {
                    last_close = Some(n);
                }
            }
        }
        if let Some(close) = line_close(&map) {
            times.push(map.get("当前时间").unwrap_or(&"").to_string());
            closes.push(close);
        }
    }

    let values = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| synth_period((i > 0).then(|| closes[i - 1]), c))
        .collect();

    KlineSeries {
        name,
        times,
        values,
        day_open,
        last_close,
    }
}

/// 两位小数取整
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// 聚合一周的数据：周一至 min(请求日期, 周一+5天)
///
/// 每天独立合成周期序列后顺序拼接；周一开盘价与最后交易日收盘价
/// 同时存在时给出周度涨跌与涨跌幅
pub fn weekly_series(paths: &DataPaths, date: &str) -> Result<WeeklySeries> {
    let req_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| anyhow!("无效日期 {}: {}", date, e))?;
    let monday = req_date - Days::new(u64::from(req_date.weekday().num_days_from_monday()));
    let week_cap = monday + Days::new(5);
    let end = req_date.min(week_cap);

    let name = "期货".to_string();
    let mut monday_open = None;
    let mut week_last_close = None;
    let mut week_last_close_date = None;
    let mut times = Vec::new();
    let mut values = Vec::new();

    let mut day = monday;
    while day <= end {
        let day_str = day.format("%Y-%m-%d").to_string();
        let path = paths.futures_for_date(&day_str);
        day = day + Days::new(1);
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(&path)?;

        let mut closes: Vec<f64> = Vec::new();
        let mut day_open = None;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let map = parse_line_map(line);
            if let Some(open) = line_open(&map) {
                day_open = Some(open);
            }
            if let Some(close) = line_close(&map) {
                times.push(format!(
                    "{} {}",
                    day_str,
                    map.get("当前时间").unwrap_or(&"")
                ));
                values.push(synth_period(closes.last().copied(), close));
                closes.push(close);
            }
        }

        if monday_open.is_none() && day_open.is_some() && day_str == monday.format("%Y-%m-%d").to_string() {
            monday_open = day_open;
        }
        if let Some(&last) = closes.last() {
            week_last_close = Some(last);
            week_last_close_date = Some(day_str);
        }
    }

    let (weekly_change, weekly_change_pct) = match (monday_open, week_last_close) {
        (Some(open), Some(close)) => {
            let change = round2(close - open);
            (Some(change), Some(round2(change / open * 100.0)))
        }
        _ => (None, None),
    };

    Ok(WeeklySeries {
        name,
        week_start: monday.format("%Y-%m-%d").to_string(),
        week_end: end.format("%Y-%m-%d").to_string(),
        times,
        values,
        monday_open,
        week_last_close,
        week_last_close_date,
        weekly_change,
        weekly_change_pct,
    })
}

// ==================== 测试模块 ====================
