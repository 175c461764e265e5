//! 外部服务边界

pub mod telegram;

pub use telegram::{
    NoopGateway, NotificationGateway, NotifyError, RecordingGateway, TelegramGateway,
};
