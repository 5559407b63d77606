use std::{collections::HashSet, path::PathBuf, sync::Arc};

use models::{NewPokemon, Pokemon};
use serde_json::{Map, Value};
use tracing::info;

use crate::catalog::CatalogStore;
use crate::errors::ServiceError;
use crate::pagination::{Page, PageInfo, Pagination};
use crate::storage::json_list_store::JsonListStore;

/// File-backed pokemon catalog.
/// The whole catalog lives in memory in insertion order and the data file is
/// rewritten after every create/update/delete.
#[derive(Clone)]
pub struct PokemonStore {
    store: Arc<JsonListStore<Pokemon>>,
    public_base_url: String,
}

impl PokemonStore {
    /// Load the catalog from `path`; an absent file starts an empty catalog.
    /// `public_base_url` prefixes generated image URLs.
    pub async fn new<P: Into<PathBuf>>(
        path: P,
        public_base_url: impl Into<String>,
    ) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<Pokemon>::new(path).await?;

        let mut seen = HashSet::new();
        for p in store.list().await {
            if !seen.insert(p.id) {
                return Err(ServiceError::Storage(format!(
                    "duplicate pokemon id {} in {}",
                    p.id,
                    store.path().display()
                )));
            }
        }

        Ok(Arc::new(Self { store, public_base_url: public_base_url.into() }))
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn list_page(&self, pagination: Pagination) -> Page<Pokemon> {
        let (data, total) = self.store.slice(pagination.offset(), pagination.per_page).await;
        Page { data, pagination: PageInfo::new(pagination, total) }
    }

    /// First pokemon whose english or french name equals `name`, ignoring case.
    pub async fn find_by_name(&self, name: &str) -> Result<Pokemon, ServiceError> {
        self.store
            .find(|p| p.matches_name(name))
            .await
            .ok_or_else(|| ServiceError::not_found("pokemon"))
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Pokemon, ServiceError> {
        self.store
            .find(|p| p.id == id)
            .await
            .ok_or_else(|| ServiceError::not_found("pokemon"))
    }

    /// Validate, assign the next id and append.
    pub async fn create(&self, input: NewPokemon) -> Result<Pokemon, ServiceError> {
        let base_url = self.public_base_url.as_str();
        let created = self
            .store
            .update_list(move |items| {
                let id = next_id(items)?;
                let pokemon = input.into_pokemon(id, base_url)?;
                items.push(pokemon.clone());
                Ok(pokemon)
            })
            .await?;
        info!(id = created.id, name = %created.name.english, "created pokemon");
        Ok(created)
    }

    /// Shallow top-level merge of `patch` over the stored pokemon.
    pub async fn update(
        &self,
        id: u64,
        patch: Map<String, Value>,
    ) -> Result<Pokemon, ServiceError> {
        let updated = self
            .store
            .update_list(move |items| {
                let slot = items
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found("pokemon"))?;
                let merged = slot.merge_patch(patch)?;
                *slot = merged.clone();
                Ok(merged)
            })
            .await?;
        info!(id, "updated pokemon");
        Ok(updated)
    }

    /// Remove and return the pokemon; the remaining order is unchanged.
    pub async fn delete(&self, id: u64) -> Result<Pokemon, ServiceError> {
        let removed = self
            .store
            .update_list(move |items| {
                let idx = items
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found("pokemon"))?;
                Ok(items.remove(idx))
            })
            .await?;
        info!(id, name = %removed.name.english, "deleted pokemon");
        Ok(removed)
    }
}

/// `max(id) + 1`, or 1 for an empty catalog.
fn next_id(items: &[Pokemon]) -> Result<u64, ServiceError> {
    match items.iter().map(|p| p.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| ServiceError::Storage(format!("no pokemon id left after {max}"))),
    }
}

#[async_trait::async_trait]
impl CatalogStore for PokemonStore {
    async fn list_page(&self, pagination: Pagination) -> Page<Pokemon> {
        self.list_page(pagination).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Pokemon, ServiceError> {
        self.find_by_name(name).await
    }

    async fn find_by_id(&self, id: u64) -> Result<Pokemon, ServiceError> {
        self.find_by_id(id).await
    }

    async fn create(&self, input: NewPokemon) -> Result<Pokemon, ServiceError> {
        self.create(input).await
    }

    async fn update(&self, id: u64, patch: Map<String, Value>) -> Result<Pokemon, ServiceError> {
        self.update(id, patch).await
    }

    async fn delete(&self, id: u64) -> Result<Pokemon, ServiceError> {
        self.delete(id).await
    }
}
