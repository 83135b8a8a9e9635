//! 核心模块：错误处理、响应体与中间件

pub mod error;
pub mod middleware;
pub mod response;
