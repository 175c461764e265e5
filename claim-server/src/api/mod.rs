//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 会话信息接口
//! - [`claims`] - 生命周期操作和看板查询
//! - [`profiles`] - 人员目录接口
//! - [`lookup`] - 客户公开查询 (无需认证)
//! - [`telegram`] - Telegram webhook (无需认证)

pub mod auth;
pub mod claims;
pub mod health;
pub mod lookup;
pub mod profiles;
pub mod telegram;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
