//! K线分析数据模型
//!
//! 定义期货日内行情的结构化记录与分析结果：
//! - 单条行情记录（FuturesTick）
//! - 当日K线分析结果（KlineAnalysis）
//! - 形态/趋势/均线信号枚举

#![allow(dead_code)]

use serde::Serialize;

/// 单条行情记录（日内数据文件中的一行）
///
/// 任一字段缺失或无法解析为有限数时保持 None，整行不会因此被丢弃
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuturesTick {
    /// 当前时间（HH:MM:SS，不做格式校验）
    pub time: Option<String>,
    /// 现价
    pub price: Option<f64>,
    /// 最高价（行情源累计值）
    pub high: Option<f64>,
    /// 最低价（行情源累计值）
    pub low: Option<f64>,
    /// 今日开盘价
    pub open_today: Option<f64>,
    /// 昨日收盘价（解析保留，分析暂未使用）
    pub prev_close: Option<f64>,
}

/// K线形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandleShape {
    /// 十字线/多空犹豫
    Doji,
    /// 锤子线(底部信号可能)
    Hammer,
    /// 射击之星(顶部信号可能)
    ShootingStar,
    /// 大阳线(强势)
    Bullish,
    /// 大阴线(弱势)
    Bearish,
    /// 普通K线
    Ordinary,
}

impl CandleShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleShape::Doji => "十字线/多空犹豫",
            CandleShape::Hammer => "锤子线(底部信号可能)",
            CandleShape::ShootingStar => "射击之星(顶部信号可能)",
            CandleShape::Bullish => "大阳线(强势)",
            CandleShape::Bearish => "大阴线(弱势)",
            CandleShape::Ordinary => "普通K线",
        }
    }
}

/// 趋势方向（收盘序列线性回归斜率的符号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "上升",
            Trend::Falling => "下降",
            Trend::Flat => "横盘",
        }
    }
}

/// 均线交叉信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaSignal {
    /// 黄金交叉(偏多)
    GoldenCross,
    /// 死亡交叉(偏空)
    DeathCross,
    /// 短期强于长期(偏多)
    ShortAboveLong,
    /// 短期弱于长期(偏空)
    ShortBelowLong,
    /// 持平
    Level,
    /// 样本不足，无法判断
    None,
}

impl MaSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaSignal::GoldenCross => "黄金交叉(偏多)",
            MaSignal::DeathCross => "死亡交叉(偏空)",
            MaSignal::ShortAboveLong => "短期强于长期(偏多)",
            MaSignal::ShortBelowLong => "短期弱于长期(偏空)",
            MaSignal::Level => "持平",
            MaSignal::None => "无",
        }
    }
}

/// 当日K线分析结果
///
/// open/close 取自现价序列，high/low 取自行情源累计极值，
/// 两者来源不同，形态计算按观测行为混用
#[derive(Debug, Clone, PartialEq)]
pub struct KlineAnalysis {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 振幅 high - low
    pub range: f64,
    /// 实体 close - open
    pub body: f64,
    /// 上影线长度
    pub upper: f64,
    /// 下影线长度
    pub lower: f64,
    pub shape: CandleShape,
    pub trend: Trend,
    /// 回归斜率
    pub slope: f64,
    /// MA5，样本不足时为 None
    pub ma_short: Option<f64>,
    /// MA10，样本不足时为 None
    pub ma_long: Option<f64>,
    pub ma_signal: MaSignal,
    /// RSI（最多取前14个价格差分）
    pub rsi: f64,
}
