use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::services::{NoopGateway, NotificationGateway, TelegramGateway};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是服务器的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 令牌校验 |
/// | gateway | Arc<dyn NotificationGateway> | 通知网关 (Telegram) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 通知网关
    pub gateway: Arc<dyn NotificationGateway>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替；测试用它注入
    /// mock 网关和临时数据库。
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            gateway,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database)
    /// 3. JWT 服务和 Telegram 网关
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db = crate::db::open(&db_dir)
            .await
            .expect("Failed to initialize database");

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let gateway: Arc<dyn NotificationGateway> = if config.telegram_bot_token.is_empty() {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set, notifications will be logged only");
            Arc::new(NoopGateway)
        } else {
            Arc::new(TelegramGateway::new(config.telegram_bot_token.clone()))
        };

        Self::new(config.clone(), db, jwt_service, gateway)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
