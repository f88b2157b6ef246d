//! 期货数据模型
//!
//! 定义期货相关的数据结构，包括：
//! - 行情快照（轮询写入日内文件的来源）
//! - 前端K线图使用的日内/周度序列

use serde::{Deserialize, Serialize};

/// 期货行情快照（单品种实时数据）
///
/// 字段保持行情源的原始字符串，落盘与展示时不做数值转换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesQuote {
    /// 品种名称
    pub name: String,
    /// 现价
    pub now_price: String,
    /// 买价
    pub buy_price: String,
    /// 卖价
    pub sell_price: String,
    /// 最高价
    pub high_price: String,
    /// 最低价
    pub low_price: String,
    /// 今日开盘价
    pub open_price: String,
    /// 交易日
    pub trade_date: String,
    /// 行情时间（HH:MM:SS）
    pub time: String,
}

/// 有数据的日期列表
#[derive(Debug, Serialize, Deserialize)]
pub struct DateList {
    pub dates: Vec<String>,
}

/// 单日K线序列（由收盘序列合成每周期 OHLC）
///
/// values 的元素顺序为 [open, close, low, high]，与前端图表库一致
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KlineSeries {
    pub name: String,
    pub times: Vec<String>,
    pub values: Vec<[f64; 4]>,
    /// 当日开盘价（文件中最后一次出现的有效值）
    pub day_open: Option<f64>,
    /// 昨日收盘价（文件中最后一次出现的有效值）
    pub last_close: Option<f64>,
}

/// 周度K线序列（周一至请求日期/周内截止日的逐日拼接）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySeries {
    pub name: String,
    pub week_start: String,
    pub week_end: String,
    pub times: Vec<String>,
    pub values: Vec<[f64; 4]>,
    pub monday_open: Option<f64>,
    pub week_last_close: Option<f64>,
    pub week_last_close_date: Option<String>,
    pub weekly_change: Option<f64>,
    pub weekly_change_pct: Option<f64>,
}
