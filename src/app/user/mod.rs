//! 用户模块：存储层已支持，暂无路由

pub mod model;

pub use model::{NewUser, User};
