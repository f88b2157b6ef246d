//! 美股行情接口处理器
//!
//! ## API 列表
//! - GET /stockhq - 美股实时行情列表（默认纳斯达克）

use actix_web::{web, HttpResponse, Result};
use serde_json::{json, Value};

use crate::handlers::assets::json_finite_number;
use crate::models::{ApiResponse, StockHqQuery};
use crate::services::sina;

/// 不展示的标的（中文名或英文名包含即过滤）
const FILTER_STOCK: [&str; 9] = [
    "谷歌A类股",
    "领航 国际股票 ETF",
    "奈飞公司",
    "开市客公司",
    "思科系统公司",
    "直觉外科公司",
    "林氏研究公司",
    "拼多多公司",
    "财捷集团",
];

/// 补充市值展示字段：原始值、亿为单位的数值、展示文本
fn normalize_mktcap(mut item: Value) -> Value {
    match json_finite_number(item.get("mktcap")) {
        Some(raw) => {
            let billion = (raw / 1e8 * 100.0).round() / 100.0;
            item["mktcap"] = json!(raw);
            item["mktcap_billion"] = json!(billion);
            item["mktcap_display"] = json!(format!("{:.2} 亿", raw / 1e8));
        }
        None => {
            item["mktcap_billion"] = Value::Null;
            item["mktcap_display"] = json!("-");
        }
    }
    item
}

/// 名称命中过滤列表的标的剔除
fn is_filtered(item: &Value) -> bool {
    let cname = item.get("cname").and_then(Value::as_str).unwrap_or("");
    let name = item.get("name").and_then(Value::as_str).unwrap_or("");
    FILTER_STOCK
        .iter()
        .any(|s| cname.contains(s) || name.contains(s))
}

/// 美股实时行情列表
/// GET /stockhq?page=1&num=20&market=O&sort=&asc=0&id=
pub async fn stock_hq(query: web::Query<StockHqQuery>) -> Result<HttpResponse> {
    match sina::get_us_stock_list(&query).await {
        Ok(list) => {
            let data: Vec<Value> = list
                .into_iter()
                .map(normalize_mktcap)
                .filter(|item| !is_filtered(item))
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "data": data }))))
        }
        Err(e) => {
            log::error!("拉取美股列表失败: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("stockhq_fetch_failed")))
        }
    }
}

/// 配置美股相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stockhq", web::get().to(stock_hq));
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mktcap_number() {
        let item = normalize_mktcap(json!({"symbol": "AAPL", "mktcap": 2.5e12}));
        assert_eq!(item["mktcap_billion"], json!(25000.0));
        assert_eq!(item["mktcap_display"], json!("25000.00 亿"));
    }

    #[test]
    fn test_normalize_mktcap_string_and_missing() {
        let item = normalize_mktcap(json!({"mktcap": "150000000"}));
        assert_eq!(item["mktcap"], json!(150000000.0));
        assert_eq!(item["mktcap_billion"], json!(1.5));

        let item = normalize_mktcap(json!({"symbol": "X"}));
        assert_eq!(item["mktcap_billion"], Value::Null);
        assert_eq!(item["mktcap_display"], json!("-"));
    }

    #[test]
    fn test_is_filtered() {
        assert!(is_filtered(&json!({"cname": "奈飞公司", "name": "NFLX"})));
        assert!(is_filtered(&json!({"cname": "", "name": "拼多多公司ADR"})));
        assert!(!is_filtered(&json!({"cname": "苹果公司", "name": "AAPL"})));
        assert!(!is_filtered(&json!({})));
    }
}
