pub mod http;
pub mod token;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::BoardError;
use crate::model::actor::Actor;
use crate::model::work_item::{ItemPatch, NewItem, Status, WorkItem};

/// Remote source of truth for tickets. The board only ever holds a copy.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_items(&self) -> Result<Vec<WorkItem>>;
    async fn create_item(&self, item: &NewItem) -> Result<WorkItem>;
    async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<WorkItem>;
    /// Returns whether the backend acknowledged the deletion.
    async fn delete_item(&self, id: &str) -> Result<bool>;
    async fn update_status(&self, id: &str, status: Status) -> Result<WorkItem>;
    async fn assign_item(&self, id: &str, assignee: &str) -> Result<WorkItem>;
}

/// Who is driving the board right now.
pub trait ActorSource: Send + Sync {
    fn current_actor(&self) -> Result<Actor, BoardError>;
}

impl ActorSource for Actor {
    fn current_actor(&self) -> Result<Actor, BoardError> {
        Ok(self.clone())
    }
}


pub fn create_backend(config: &AppConfig) -> Result<Arc<dyn Backend>> {
    let backend = http::HttpBackend::new(&config.api)?;
    Ok(Arc::new(backend))
}

/// A configured token wins over a configured actor; with neither, every
/// status change is refused.
pub fn create_actor_source(config: &AppConfig) -> Box<dyn ActorSource> {
    if let Some(token) = &config.api.token {
        return Box::new(token::TokenActor::new(token.clone()));
    }
    if let Some(actor) = &config.actor {
        return Box::new(actor.clone());
    }
    Box::new(token::Anonymous)
}
