//! 基础设施：日志与数据库连接池

#[cfg(feature = "database")]
pub mod database;
pub mod logger;
