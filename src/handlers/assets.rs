//! 资产快照接口处理器
//!
//! 全局资产文件的读写（整文件覆盖，后写者胜）
//!
//! ## API 列表
//! - GET /assets - 读取资产快照
//! - PUT /assets - 覆盖写入资产快照

use std::fs;

use actix_web::{web, HttpResponse, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::models::ApiResponse;
use crate::services::paths::DataPaths;
use crate::state::AppState;

/// JSON 值转有限数：数字直接取值，字符串尝试解析
pub(crate) fn json_finite_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// 读取资产快照（entries + totalAssets），文件缺失或解析失败返回 None
pub(crate) fn read_asset_snapshot(paths: &DataPaths) -> Option<(Vec<Value>, f64)> {
    let text = fs::read_to_string(paths.assets()).ok()?;
    let json: Value = serde_json::from_str(&text).ok()?;
    let entries = json
        .get("entries")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let total = json_finite_number(json.get("totalAssets")).unwrap_or(0.0);
    Some((entries, total))
}

/// 读取资产快照
/// GET /assets
pub async fn get_assets(state: web::Data<AppState>) -> Result<HttpResponse> {
    let path = state.paths.assets();
    if !path.exists() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
            "entries": [],
            "totalAssets": 0,
            "updatedAt": null,
        }))));
    }

    let parsed = fs::read_to_string(&path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok());
    match parsed {
        Some(stored) => {
            let entries = stored
                .get("entries")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let total = json_finite_number(stored.get("totalAssets")).unwrap_or(0.0);
            let updated_at = stored.get("updatedAt").cloned().unwrap_or(Value::Null);
            Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
                "entries": entries,
                "totalAssets": total,
                "updatedAt": updated_at,
            }))))
        }
        None => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error("invalid_assets_format"))),
    }
}

/// 覆盖写入资产快照
/// PUT /assets
pub async fn put_assets(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let Some(entries) = body.get("entries").and_then(Value::as_array) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error("entries_required")));
    };
    let total = json_finite_number(body.get("totalAssets")).unwrap_or(0.0);

    let payload = json!({
        "updatedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "entries": entries,
        "totalAssets": total,
    });
    let text = serde_json::to_string_pretty(&payload).unwrap_or_default();
    match fs::write(state.paths.assets(), text) {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(payload))),
        Err(e) => {
            log::error!("写入资产文件失败: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("assets_write_failed")))
        }
    }
}

/// 配置资产相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/assets", web::get().to(get_assets))
        .route("/assets", web::put().to(put_assets));
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::llm::LlmClient;
    use actix_web::{test, App};

    fn test_state(root: &std::path::Path) -> web::Data<AppState> {
        let config = AppConfig::default();
        let paths = DataPaths::new(root);
        paths.ensure_dirs().unwrap();
        let llm = LlmClient::new(&config.llm);
        web::Data::new(AppState { config, paths, llm })
    }

    #[::core::prelude::v1::test]
    fn test_json_finite_number() {
        assert_eq!(json_finite_number(Some(&json!(3.5))), Some(3.5));
        assert_eq!(json_finite_number(Some(&json!("120"))), Some(120.0));
        assert_eq!(json_finite_number(Some(&json!("abc"))), None);
        assert_eq!(json_finite_number(Some(&json!(""))), None);
        assert_eq!(json_finite_number(Some(&json!(null))), None);
        assert_eq!(json_finite_number(None), None);
    }

    #[actix_web::test]
    async fn test_assets_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        // 初始为空快照
        let req = test::TestRequest::get().uri("/assets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["entries"], json!([]));
        assert_eq!(body["data"]["totalAssets"], json!(0));

        // 写入后读回
        let req = test::TestRequest::put()
            .uri("/assets")
            .set_json(json!({
                "entries": [{"assetName": "货基", "amount": 2500}],
                "totalAssets": "10000",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get().uri("/assets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["entries"][0]["assetName"], json!("货基"));
        // 字符串形式的总资产被转为数字
        assert_eq!(body["data"]["totalAssets"], json!(10000.0));
        assert!(body["data"]["updatedAt"].is_string());
    }

    #[actix_web::test]
    async fn test_put_assets_requires_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::put()
            .uri("/assets")
            .set_json(json!({"totalAssets": 100}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[::core::prelude::v1::test]
    fn test_read_asset_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        paths.ensure_dirs().unwrap();
        assert!(read_asset_snapshot(&paths).is_none());

        fs::write(
            paths.assets(),
            r#"{"entries": [{"assetName": "货基", "amount": 1}], "totalAssets": 9}"#,
        )
        .unwrap();
        let (entries, total) = read_asset_snapshot(&paths).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(total, 9.0);
    }
}
