//! 投资顾问内容编排
//!
//! 固定的策略提示词，以及把快讯与期货价格快照拼装为提示词内容

use anyhow::Result;

use crate::services::news;
use crate::services::paths::DataPaths;
use crate::services::sina;

/// 投资顾问策略提示词（作为对话的首条 assistant 消息）
pub const PROMPT_AI_STRATEGY: &str = "你是一名智能投资顾问，主营业务是美股，主要关注美股相关的新闻，通过分析新闻内容和期货的价格，把控投资方向，给出合理的投资建议。
例如你当察觉到利空时，你需要判断是否减仓，一般的利空信号有
“利空”、“加息”、“下调资本支出”、“裁员”、“下降”、“跌破”、“警告”、“危险”、“风险”、“害怕”、“担忧”
例如你当察觉到利好时，你需要判断是否加仓，一般的利好信号有
“利好”、“降息”、“上调资本支出”、“加速落地”、“提升”、“有望”、“突破”、“探底”、“回升”
然后注意下述规则
当期货当前跌幅小于1%时，判断为理性下跌，一般会很快修复，不建议操作
当期货当前跌幅超1%但小于2%时，判断为正常下跌，一般会很快修复，不建议操作
当期货当前跌幅超过2%时，判断为异常下跌，需要注意风险，建议保持观望，一周后判断K线是否修复，如果没修复，建议定投开始，等到月K修复结束定投
以上是交易规则和约束

请注意，在回答操作建议时，需要将当前的期货价格和涨跌幅计算并展示出来

下面，我会给你新闻内容和期货价格，你需要根据新闻内容提取关键信息，从期货价格判断新闻对于市场的影响，从而给出投资建议。";

/// 对话开场白（用户消息的引导语）
pub const PROMPT_OPENER: &str =
    "阅读下面内容并结合我的仓位，给出投资建议；当没有明确信号时，请保持观望。";

/// 自动推送最新消息时的用户消息
pub const PROMPT_AUTO_NEWS: &str = "最新消息更新（自动）";

/// 拉取最新快讯与期货价格快照，拼装为提示词内容
pub async fn mix_news(paths: &DataPaths) -> Result<String> {
    let news_list = news::get_fast_news_list(paths).await?;
    let quote = sina::get_futures().await?;

    let mut futures_str = String::new();
    for (key, value) in [
        ("名称", &quote.name),
        ("现价", &quote.now_price),
        ("买价", &quote.buy_price),
        ("卖价", &quote.sell_price),
        ("最高价", &quote.high_price),
        ("最低价", &quote.low_price),
        ("今日时间", &quote.trade_date),
        ("当前时间", &quote.time),
        ("今日开盘价", &quote.open_price),
    ] {
        futures_str.push_str(key);
        futures_str.push_str(value);
        futures_str.push('\n');
    }

    Ok(format!(
        "新闻列表:{}\n以下是当前期货价格\n{}",
        news_list, futures_str
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_constants() {
        assert!(PROMPT_AI_STRATEGY.contains("智能投资顾问"));
        assert!(PROMPT_AI_STRATEGY.contains("利空"));
        assert!(PROMPT_OPENER.contains("保持观望"));
    }
}
