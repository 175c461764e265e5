//! Claim Tracking Server
//!
//! # 架构概述
//!
//! Tracks product-quality claims ("reclamos") through a three-role
//! workflow: a sales agent files a claim, the quality lab issues a
//! technical verdict, and the sales agent closes the case with a
//! commercial resolution. A public lookup and a Telegram notification
//! channel complete the loop.
//!
//! # 模块结构
//!
//! ```text
//! claim-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色检查
//! ├── db/            # 嵌入式 SurrealDB 存储层
//! ├── claims/        # 生命周期引擎 + 通知
//! ├── services/      # Telegram 网关
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod claims;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use claims::{Actor, LifecycleEngine};
pub use core::{Config, Server, ServerState, setup_environment};
pub use services::{NotificationGateway, TelegramGateway};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
