//! 通用 API 响应模型
//!
//! 所有 JSON 接口返回统一信封（SSE 接口除外），包含：
//! - success: 请求是否成功
//! - data: 响应数据（成功时有值）
//! - message: 响应消息（失败时为错误说明）
//! - timestamp: 响应时间戳（北京时间）

use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
fn beijing_now() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 统一 API 响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: beijing_now(),
        }
    }

    /// 创建错误响应
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            timestamp: beijing_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let ok = ApiResponse::success(1);
        assert!(ok.success);
        assert_eq!(ok.data, Some(1));
        assert!(ok.timestamp.contains("+08:00"));

        let err = ApiResponse::<()>::error("not_found");
        assert!(!err.success);
        assert_eq!(err.message, "not_found");
        assert!(err.data.is_none());
    }
}
