//! 排队引擎
//!
//! 入队、位置计算和状态流转的业务核心。引擎只依赖注入进来的
//! 数据库句柄、短信通道和事件出口，本身不持有后台任务。

pub mod admission;
pub mod position;
pub mod status;

#[cfg(test)]
mod tests;

pub use position::QueuePosition;

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{BookingRepository, QueueRepository, ShopRepository};
use crate::notify::SmsSender;
use crate::realtime::EventSink;

/// Booking lifecycle engine
///
/// Cheap to construct per call site; all fields are handles.
#[derive(Clone)]
pub struct QueueEngine {
    db: Surreal<Db>,
    sms: Arc<dyn SmsSender>,
    events: Arc<dyn EventSink>,
}

impl QueueEngine {
    pub fn new(db: Surreal<Db>, sms: Arc<dyn SmsSender>, events: Arc<dyn EventSink>) -> Self {
        Self { db, sms, events }
    }

    pub(crate) fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.db.clone())
    }

    pub(crate) fn queues(&self) -> QueueRepository {
        QueueRepository::new(self.db.clone())
    }

    pub(crate) fn shops(&self) -> ShopRepository {
        ShopRepository::new(self.db.clone())
    }

    pub(crate) fn sms(&self) -> &Arc<dyn SmsSender> {
        &self.sms
    }

    pub(crate) fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Shop name for outbound messages, falling back to the queue name
    pub(crate) async fn display_name(&self, shop: &surrealdb::RecordId, queue_name: &str) -> String {
        match self.shops().find_by_id(&shop.to_string()).await {
            Ok(Some(shop)) => shop.name,
            _ => queue_name.to_string(),
        }
    }
}
