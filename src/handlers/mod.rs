pub mod assets;
pub mod auth;
pub mod chats;
pub mod futures;
pub mod health;
pub mod news;
pub mod stock;

use actix_web::web;

/// 汇总全部业务路由（挂载在根路径，前端直接按原路径访问）
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::config)
        .configure(auth::config)
        .configure(futures::config)
        .configure(stock::config)
        .configure(assets::config)
        .configure(news::config)
        .configure(chats::config);
}
