//! 登录态校验中间件
//!
//! 基于 Cookie 的单用户鉴权：登录相关路径与健康检查放行，
//! 携带有效登录 Cookie 的请求放行，
//! 未登录的 GET 请求跳转登录页，其余请求返回 401

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    Error, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::collections::HashMap;
use std::rc::Rc;

use crate::models::ApiResponse;

/// 免鉴权路径
const ALLOW_PATHS: [&str; 4] = ["/login", "/logout", "/login.html", "/health"];

/// 解析 Cookie 头为键值对
///
/// 仅做朴素切分：分号分段、首个等号切键值，键为空的段丢弃
pub fn parse_cookies(cookie_header: Option<&str>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Some(raw) = cookie_header else {
        return map;
    };
    for part in raw.split(';') {
        let part = part.trim();
        let mut pieces = part.split('=');
        let key = pieces.next().unwrap_or("");
        if key.is_empty() {
            continue;
        }
        let value = pieces.next().unwrap_or("");
        map.insert(key.to_string(), value.to_string());
    }
    map
}

/// 请求是否已登录（Cookie auth=1）
pub fn is_authenticated(cookie_header: Option<&str>) -> bool {
    parse_cookies(cookie_header).get("auth").map(String::as_str) == Some("1")
}

/// 鉴权门禁中间件
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthGateService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if ALLOW_PATHS.contains(&req.path()) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let cookie_header = req
                .headers()
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok());
            if is_authenticated(cookie_header) {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            // 未登录：页面请求跳转登录页，接口请求返回 401
            if req.method() == Method::GET {
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, "/login.html"))
                    .finish();
                return Ok(req.into_response(response).map_into_right_body());
            }
            let response =
                HttpResponse::Unauthorized().json(ApiResponse::<()>::error("unauthorized"));
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}
