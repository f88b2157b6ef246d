pub mod chat;
pub mod futures;
pub mod kline;
pub mod news;
pub mod response;
pub mod stock;

pub use chat::*;
pub use futures::*;
pub use kline::*;
pub use news::*;
pub use response::*;
pub use stock::*;
