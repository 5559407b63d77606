use async_trait::async_trait;
use models::{NewPokemon, Pokemon};
use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Trait abstraction for the pokemon catalog.
/// Every write is persisted before the call returns.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_page(&self, pagination: Pagination) -> Page<Pokemon>;
    async fn find_by_name(&self, name: &str) -> Result<Pokemon, ServiceError>;
    async fn find_by_id(&self, id: u64) -> Result<Pokemon, ServiceError>;
    async fn create(&self, input: NewPokemon) -> Result<Pokemon, ServiceError>;
    async fn update(&self, id: u64, patch: Map<String, Value>) -> Result<Pokemon, ServiceError>;
    async fn delete(&self, id: u64) -> Result<Pokemon, ServiceError>;
}
