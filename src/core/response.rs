//! 核心响应模块

use serde::{Deserialize, Serialize};

/// 不返回记录的操作使用的 `{ "message": ... }` 响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
