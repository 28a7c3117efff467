//! 客户通知
//!
//! 外发短信通道 ([`SmsSender`]) 和各类消息文案。发送失败只记日志，
//! 永远不会让预约创建或调度器 pass 失败。

pub mod sms;

pub use sms::{HttpGatewaySmsSender, SimulatedSmsSender, SmsSender};

use std::sync::Arc;

use crate::core::Config;

/// Text-send failure, caught and logged at the notify boundary
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMS gateway error: {0}")]
    Gateway(String),

    #[error("SMS rejected: {0}")]
    Rejected(String),
}

/// Pick the sender implementation from configuration
///
/// A configured gateway URL selects the HTTP sender; otherwise every send is
/// simulated (logged) and reported as success.
pub fn sender_from_config(config: &Config) -> Arc<dyn SmsSender> {
    match &config.sms_gateway_url {
        Some(url) => Arc::new(HttpGatewaySmsSender::new(
            url.clone(),
            config.sms_from.clone(),
        )),
        None => Arc::new(SimulatedSmsSender),
    }
}

// ── Message texts ───────────────────────────────────────────────────

pub fn confirmation_message(
    customer_name: &str,
    shop_name: &str,
    queue_number: i64,
    estimated_wait: i64,
) -> String {
    format!(
        "Hello {customer_name}! Your booking at {shop_name} is confirmed. \
         Queue number: {queue_number}. Estimated wait: {estimated_wait} minutes."
    )
}

pub fn reminder_message(shop_name: &str, queue_number: i64) -> String {
    format!(
        "Reminder: Your appointment at {shop_name} is in 15 minutes. \
         Queue number: {queue_number}"
    )
}

pub fn turn_message(shop_name: &str, queue_number: i64) -> String {
    format!(
        "It's almost your turn! You're next in line at {shop_name}. \
         Please be ready. Queue number: {queue_number}"
    )
}
