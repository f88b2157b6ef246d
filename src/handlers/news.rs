//! 快讯接口处理器
//!
//! ## API 列表
//! - GET /news/latest - 最新快讯（增量，按游标）
//! - GET /news/latest?scope=today - 今日全部快讯（不推进游标）

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::models::{ApiResponse, NewsContent};
use crate::services::news;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub scope: Option<String>,
}

/// 最新快讯（轮询获取，内容可直接按文本渲染）
/// GET /news/latest
pub async fn latest(
    state: web::Data<AppState>,
    query: web::Query<NewsQuery>,
) -> Result<HttpResponse> {
    let result = if query.scope.as_deref() == Some("today") {
        news::get_today_news_list().await
    } else {
        news::get_fast_news_list(&state.paths).await
    };

    match result {
        Ok(content) => Ok(HttpResponse::Ok().json(ApiResponse::success(NewsContent { content }))),
        Err(e) => {
            log::error!("拉取快讯失败: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("news_fetch_failed: {}", e))))
        }
    }
}

/// 配置快讯相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/news/latest", web::get().to(latest));
}
