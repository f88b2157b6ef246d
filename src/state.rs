//! 应用共享状态

use crate::config::AppConfig;
use crate::services::llm::LlmClient;
use crate::services::paths::DataPaths;

/// 各请求处理器共享的应用状态
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: AppConfig,
    /// 数据目录布局
    pub paths: DataPaths,
    /// 大模型客户端（启动时创建一次，避免重复初始化）
    pub llm: LlmClient,
}
