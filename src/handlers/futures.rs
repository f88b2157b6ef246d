//! 期货数据接口处理器
//!
//! 面向前端K线图的日内/周度序列
//!
//! ## API 列表
//! - GET /futures - 有数据的日期列表
//! - GET /futures/{date} - 单日K线序列
//! - GET /futures/week/{date} - 周度K线序列

use std::fs;

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, DateList};
use crate::services::paths::list_dated_files;
use crate::services::series;
use crate::state::AppState;

/// 有期货数据的日期列表
/// GET /futures
pub async fn list_dates(state: web::Data<AppState>) -> Result<HttpResponse> {
    let dates = list_dated_files(&state.paths.futures_dir(), ".txt");
    Ok(HttpResponse::Ok().json(ApiResponse::success(DateList { dates })))
}

/// 单日K线序列
/// GET /futures/{date}
pub async fn get_day(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let date = path.into_inner();
    let file = state.paths.futures_for_date(&date);
    if !file.exists() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error("not_found")));
    }
    match fs::read_to_string(&file) {
        Ok(text) => {
            let series = series::day_kline_series(&text);
            Ok(HttpResponse::Ok().json(ApiResponse::success(series)))
        }
        Err(e) => {
            log::error!("读取期货数据 {} 失败: {}", date, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("invalid_futures_format")))
        }
    }
}

/// 周度K线序列（周一至请求日期）
/// GET /futures/week/{date}
pub async fn get_week(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let date = path.into_inner();
    match series::weekly_series(&state.paths, &date) {
        Ok(weekly) => Ok(HttpResponse::Ok().json(ApiResponse::success(weekly))),
        Err(e) => {
            log::error!("聚合周度数据 {} 失败: {:#}", date, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("invalid_weekly_futures")))
        }
    }
}

/// 配置期货相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/futures", web::get().to(list_dates))
        .route("/futures/week/{date}", web::get().to(get_week))
        .route("/futures/{date}", web::get().to(get_day));
}

// ==================== 测试模块 ====================
