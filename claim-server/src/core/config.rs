use crate::auth::JwtConfig;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/claim-server | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TELEGRAM_BOT_TOKEN | (空) | Telegram Bot API 令牌 |
/// | TELEGRAM_BOT_NAME | claims_bot | 深链接使用的 bot 用户名 |
/// | WEBHOOK_SECRET | (空) | Webhook 路径密钥 |
/// | RESTRICT_CLOSE_TO_FILER | false | 仅允许建单人关闭 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/claims HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置 (外部身份提供方签发的令牌)
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === Telegram 通知配置 ===
    /// Bot API 令牌 (空则通知只记日志不发送)
    pub telegram_bot_token: String,
    /// Bot 用户名，用于 t.me 深链接
    pub telegram_bot_name: String,
    /// Webhook 共享密钥 (NOTIFY 中继和入站校验)
    pub webhook_secret: String,

    // === 生命周期策略 ===
    /// 是否限制只有建单的业务员可以关闭案件
    pub restrict_close_to_filer: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/claim-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_bot_name: std::env::var("TELEGRAM_BOT_NAME")
                .unwrap_or_else(|_| "claims_bot".into()),
            webhook_secret: std::env::var("WEBHOOK_SECRET").unwrap_or_default(),

            restrict_close_to_filer: std::env::var("RESTRICT_CLOSE_TO_FILER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("database")
    }

    /// Deep link a customer scans to self-link their chat to a claim
    pub fn claim_deep_link(&self, code: &str) -> String {
        format!("https://t.me/{}?start={}", self.telegram_bot_name, code)
    }

    /// Deep link an employee scans to self-link their chat to a profile
    pub fn employee_deep_link(&self, profile_id: &str) -> String {
        format!("https://t.me/{}?start=EMP-{}", self.telegram_bot_name, profile_id)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
