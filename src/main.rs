//! 个人投资顾问后端服务
//!
//! 轮询期货行情与财经快讯，调用大模型生成投资建议，
//! 按日期保存对话与建议历史，通过 HTTP + SSE 对外提供接口
//! 数据来源：新浪财经行情、东方财富快讯

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::middleware::AuthGate;
use crate::services::llm::LlmClient;
use crate::services::paths::DataPaths;
use crate::services::scheduler;
use crate::state::AppState;

/// 应用程序入口
///
/// 加载配置、准备数据目录、启动行情轮询任务与 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.clone()));

    // 确保数据目录存在
    let paths = DataPaths::new(&config.data.root);
    paths.ensure_dirs()?;

    // 大模型客户端全局共享，避免重复初始化
    let llm = LlmClient::new(&config.llm);
    let state = web::Data::new(AppState {
        config: config.clone(),
        paths: paths.clone(),
        llm,
    });

    // 行情轮询任务随服务启动
    scheduler::spawn(paths, config.schedule.quote_interval_secs);

    let bind_addr = config.bind_addr();
    let public_dir = config.data.public_dir.clone();
    log::info!("启动投资顾问后端服务 http://{}", bind_addr);

    // 先挂载业务路由（含登录），静态资源兜底；鉴权门禁包在外层
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(AuthGate)
            .configure(handlers::config)
            .service(Files::new("/", public_dir.clone()).index_file("index.html"))
    })
    .bind(bind_addr)?
    .run()
    .await
}
