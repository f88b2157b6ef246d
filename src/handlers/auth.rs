//! 登录与登出接口处理器
//!
//! 单用户 Cookie 鉴权：凭据与配置一致时种下登录 Cookie
//!
//! ## API 列表
//! - POST /login - 登录
//! - POST /logout - 登出

use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    web, HttpResponse, Result,
};
use serde::Deserialize;
use serde_json::json;

use crate::models::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn auth_cookie(value: &str, max_age: Duration) -> Cookie<'static> {
    Cookie::build("auth", value.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

/// 登录
/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let auth = &state.config.auth;
    if body.username == auth.username && body.password == auth.password {
        Ok(HttpResponse::Ok()
            .cookie(auth_cookie("1", Duration::days(7)))
            .json(ApiResponse::success(json!({ "ok": true }))))
    } else {
        Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error("invalid_credentials")))
    }
}

/// 登出（清除登录 Cookie）
/// POST /logout
pub async fn logout() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(auth_cookie("", Duration::ZERO))
        .json(ApiResponse::success(json!({ "ok": true }))))
}

/// 配置登录相关路由
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout));
}

// ==================== 测试模块 ====================
