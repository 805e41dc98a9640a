use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ShortLinkRepositoryTrait;
use crate::errors::RepositoryError;
use crate::models::ShortLink;

type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Default)]
struct Tables {
    by_code: HashMap<String, ShortLink>,
    /// target -> code of the first link created for it
    first_by_target: HashMap<String, String>,
}

/// Process-local store; uniqueness is enforced under the write lock
#[derive(Debug, Default)]
pub struct InMemoryShortLinkRepository {
    tables: RwLock<Tables>,
}

impl InMemoryShortLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShortLinkRepositoryTrait for InMemoryShortLinkRepository {
    async fn create(&self, link: &ShortLink) -> Result<ShortLink> {
        let mut tables = self.tables.write().await;

        if tables.by_code.contains_key(&link.code) {
            return Err(RepositoryError::Duplicate(format!(
                "code '{}' already exists",
                link.code
            )));
        }

        let stored = ShortLink {
            hits: 0,
            ..link.clone()
        };
        tables
            .first_by_target
            .entry(stored.target.clone())
            .or_insert_with(|| stored.code.clone());
        tables.by_code.insert(stored.code.clone(), stored.clone());

        Ok(stored)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        Ok(self.tables.read().await.by_code.get(code).cloned())
    }

    async fn find_by_target(&self, target: &str) -> Result<Option<ShortLink>> {
        let tables = self.tables.read().await;
        Ok(tables
            .first_by_target
            .get(target)
            .and_then(|code| tables.by_code.get(code))
            .cloned())
    }

    async fn increment_hits(&self, code: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.by_code.get_mut(code) {
            Some(link) => {
                link.hits = link.hits.saturating_add(1);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "Short link '{}' not found",
                code
            ))),
        }
    }
}
