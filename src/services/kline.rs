//! 期货日内数据解析与K线分析
//!
//! 纯函数流水线：原始行情文本 -> Tick 序列 -> 当日K线分析 -> 文本报告。
//! 每次调用都从文件内容重新推导，无缓存、无共享状态；
//! 任何失败都转换为固定的说明文本，不向调用方抛出结构化错误

use std::collections::VecDeque;
use std::fs;

use chrono::Utc;
use chrono_tz::Asia::Shanghai;

use crate::models::{CandleShape, FuturesTick, KlineAnalysis, MaSignal, Trend};
use crate::services::paths::DataPaths;

/// 数据文件不存在时的固定回退文案
pub const FALLBACK_NO_FILE: &str = "期货数据文件不存在，跳过分析。";
/// 无有效数据时的固定回退文案
pub const FALLBACK_NO_DATA: &str = "无有效期货数据或字段不完整，暂不分析。";
/// 文件读取/解析失败时的固定回退文案
pub const FALLBACK_PARSE_FAILED: &str = "期货数据解析失败，跳过分析。";

/// 短期均线周期
const MA_SHORT_PERIOD: usize = 5;
/// 长期均线周期
const MA_LONG_PERIOD: usize = 10;
/// RSI 最多取的差分个数
const RSI_PERIOD: usize = 14;

/// 字符串转有限浮点数，空串/非数字/无穷大均视为缺失
fn to_finite_number(v: &str) -> Option<f64> {
    v.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 解析单行行情记录
///
/// 行内以 `|` 分段，每段在第一个 `:` 处切分为键值（值本身可含 `:`）。
/// 无法识别的键忽略；无法解析的值对应字段保持缺失。
/// 整行没有任何键值对时返回 None
pub fn parse_futures_line(line: &str) -> Option<FuturesTick> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut tick = FuturesTick::default();
    let mut pairs = 0usize;

    for part in line.split('|') {
        let Some(idx) = part.find(':') else {
            continue;
        };
        pairs += 1;
        let key = part[..idx].trim();
        let val = part[idx + 1..].trim();
        match key {
            "当前时间" => tick.time = Some(val.to_string()),
            "现价" => tick.price = to_finite_number(val),
            "最高价" => tick.high = to_finite_number(val),
            "最低价" => tick.low = to_finite_number(val),
            "今日开盘价" => tick.open_today = to_finite_number(val),
            "昨日收盘价" => tick.prev_close = to_finite_number(val),
            _ => {}
        }
    }

    (pairs > 0).then_some(tick)
}

/// 解析一天的行情文本，保持文件行序（后续计算将行序视为时间序）
pub fn parse_futures_text(text: &str) -> Vec<FuturesTick> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(parse_futures_line)
        .collect()
}

/// 固定窗口滑动均值
///
/// 增量维护窗口内容，读取时按入窗顺序求和，
/// 结果与每次从切片重新计算完全一致；同时保留上一步的均值供交叉判断
struct SlidingMean {
    window: VecDeque<f64>,
    period: usize,
    prev: Option<f64>,
    curr: Option<f64>,
}

impl SlidingMean {
    fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period + 1),
            period,
            prev: None,
            curr: None,
        }
    }

    fn push(&mut self, value: f64) {
        self.prev = self.curr;
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.curr = (self.window.len() == self.period)
            .then(|| self.window.iter().sum::<f64>() / self.period as f64);
    }
}

/// 收盘序列对下标 1..n 的最小二乘回归斜率，样本不足时为 0
fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mean_x = (n as f64 + 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = (i + 1) as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// 形态分类，固定优先级，首个命中的规则生效
fn classify_shape(range: f64, body: f64, upper: f64, lower: f64) -> CandleShape {
    if range <= 0.0 {
        return CandleShape::Ordinary;
    }
    let body_abs = body.abs();
    let body_ratio = body_abs / range;
    if body_ratio < 0.1 {
        CandleShape::Doji
    } else if lower >= body_abs * 2.0 && upper <= body_abs {
        CandleShape::Hammer
    } else if upper >= body_abs * 2.0 && lower <= body_abs {
        CandleShape::ShootingStar
    } else if body > 0.0 && body_ratio > 0.6 {
        CandleShape::Bullish
    } else if body < 0.0 && body_ratio > 0.6 {
        CandleShape::Bearish
    } else {
        CandleShape::Ordinary
    }
}

/// 分析一天的 Tick 序列
///
/// 现价/最高价/最低价三个序列各自独立取样，任一序列为空则无法分析。
/// open 取首条记录的今日开盘价，缺失时退回现价序列首值；
/// close 取现价序列末值（盘中即最新价）；
/// high/low 取行情源累计极值，不从现价序列重算
pub fn analyze_kline(ticks: &[FuturesTick]) -> Option<KlineAnalysis> {
    if ticks.is_empty() {
        return None;
    }

    let closes: Vec<f64> = ticks.iter().filter_map(|t| t.price).collect();
    let highs: Vec<f64> = ticks.iter().filter_map(|t| t.high).collect();
    let lows: Vec<f64> = ticks.iter().filter_map(|t| t.low).collect();
    if closes.is_empty() || highs.is_empty() || lows.is_empty() {
        return None;
    }

    let open = ticks[0].open_today.unwrap_or(closes[0]);
    let close = closes[closes.len() - 1];
    let high = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = lows.iter().copied().fold(f64::INFINITY, f64::min);
    let range = high - low;
    let body = close - open;
    let upper = high - open.max(close);
    let lower = open.min(close) - low;

    let shape = classify_shape(range, body, upper, lower);

    let slope = regression_slope(&closes);
    let trend = if slope > 0.0 {
        Trend::Rising
    } else if slope < 0.0 {
        Trend::Falling
    } else {
        Trend::Flat
    };

    // 均线与交叉信号
    let mut ma5 = SlidingMean::new(MA_SHORT_PERIOD);
    let mut ma10 = SlidingMean::new(MA_LONG_PERIOD);
    for &c in &closes {
        ma5.push(c);
        ma10.push(c);
    }
    let ma_signal = match (ma5.curr, ma10.curr, ma5.prev, ma10.prev) {
        (Some(short), Some(long), Some(prev_short), Some(prev_long)) => {
            let before = prev_short - prev_long;
            let now = short - long;
            if before <= 0.0 && now > 0.0 {
                MaSignal::GoldenCross
            } else if before >= 0.0 && now < 0.0 {
                MaSignal::DeathCross
            } else if now > 0.0 {
                MaSignal::ShortAboveLong
            } else if now < 0.0 {
                MaSignal::ShortBelowLong
            } else {
                MaSignal::Level
            }
        }
        _ => MaSignal::None,
    };

    // RSI：最多取前 min(14, n-1) 个差分
    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in closes.windows(2).take(RSI_PERIOD) {
        let diff = w[1] - w[0];
        if diff > 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }
    let rsi = if losses > 0.0 {
        100.0 - 100.0 / (1.0 + gains / losses)
    } else {
        100.0
    };

    Some(KlineAnalysis {
        open,
        high,
        low,
        close,
        range,
        body,
        upper,
        lower,
        shape,
        trend,
        slope,
        ma_short: ma5.curr,
        ma_long: ma10.curr,
        ma_signal,
        rsi,
    })
}

/// 将分析结果汇总为固定顺序的多行报告
pub fn summarize_kline(ana: Option<&KlineAnalysis>) -> String {
    let Some(a) = ana else {
        return FALLBACK_NO_DATA.to_string();
    };

    let ma_line = match (a.ma_short, a.ma_long) {
        (Some(short), Some(long)) => format!(
            "均线：MA5={:.2}, MA10={:.2}；信号：{}",
            short,
            long,
            a.ma_signal.as_str()
        ),
        _ => "均线：样本不足，暂不判断".to_string(),
    };
    let rsi_text = if a.rsi.is_finite() {
        format!("{:.2}", a.rsi)
    } else {
        "N/A".to_string()
    };

    [
        format!(
            "当日K线：开盘 {}, 最高 {}, 最低 {}, 最新价 {}",
            a.open, a.high, a.low, a.close
        ),
        format!("形态判断：{}", a.shape.as_str()),
        format!("趋势判断：{}", a.trend.as_str()),
        ma_line,
        format!("RSI(≤14)：{}(≥70偏热，≤30偏冷)", rsi_text),
    ]
    .join("\n")
}

/// 北京时间的本地化时间串（用于报告落款）
fn now_shanghai() -> String {
    Utc::now()
        .with_timezone(&Shanghai)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// 分析指定日期的期货数据文件，返回可直接嵌入提示词的文本
///
/// 文件缺失、无有效数据、读取失败分别对应固定回退文案，均不报错
pub fn analyze_futures_for_date(paths: &DataPaths, date: &str) -> String {
    let path = paths.futures_for_date(date);
    if !path.exists() {
        return FALLBACK_NO_FILE.to_string();
    }
    match fs::read_to_string(&path) {
        Ok(text) => {
            let ticks = parse_futures_text(&text);
            let ana = analyze_kline(&ticks);
            format!("{}\n分析时间：{}", summarize_kline(ana.as_ref()), now_shanghai())
        }
        Err(e) => {
            log::warn!("读取期货数据文件 {} 失败: {}", path.display(), e);
            FALLBACK_PARSE_FAILED.to_string()
        }
    }
}

// ==================== 测试模块 ====================
