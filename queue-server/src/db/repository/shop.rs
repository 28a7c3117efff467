//! Shop Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Shop, ShopCreate};
use crate::utils::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "shop";

#[derive(Clone)]
pub struct ShopRepository {
    base: BaseRepository,
}

impl ShopRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find shop by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Shop>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let shop: Option<Shop> = self.base.db().select(thing).await?;
        Ok(shop)
    }

    /// Create a new shop
    pub async fn create(&self, data: ShopCreate) -> RepoResult<Shop> {
        let shop = Shop {
            id: None,
            name: data.name,
            description: data.description,
            owner_name: data.owner_name,
            phone: data.phone,
            address: data.address,
            allow_walk_ins: data.allow_walk_ins.unwrap_or(true),
            created_at: now_millis(),
        };

        let created: Option<Shop> = self.base.db().create(TABLE).content(shop).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create shop".to_string()))
    }
}
