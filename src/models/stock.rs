//! 美股行情查询模型

use serde::Deserialize;

/// 美股列表查询参数
///
/// GET /stockhq?page=1&num=20&market=O&sort=&asc=0&id=
#[derive(Debug, Clone, Deserialize)]
pub struct StockHqQuery {
    pub page: Option<u32>,
    pub num: Option<u32>,
    pub sort: Option<String>,
    pub asc: Option<u8>,
    pub market: Option<String>,
    pub id: Option<String>,
}
