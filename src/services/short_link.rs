// src/services/short_link.rs - Business logic
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::errors::{RepositoryError, ServiceError};
use crate::models::ShortLink;
use crate::repositories::ShortLinkRepositoryTrait;
use crate::utils::{CodeGenerator, SecureCodeGenerator};

type Result<T> = std::result::Result<T, ServiceError>;

/// Length of generated codes
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generated candidates tried before giving up
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Upper bound on how long a resolve waits for the hit counter update
const HIT_RECORD_TIMEOUT: Duration = Duration::from_millis(500);

#[async_trait]
pub trait ShortLinkServiceTrait {
    /// Claims `custom_alias` for `long_url`, or returns a generated (possibly existing) link
    async fn allocate(&self, long_url: &str, custom_alias: Option<&str>) -> Result<ShortLink>;
    /// Looks up a code and counts the hit
    async fn resolve(&self, code: &str) -> Result<ShortLink>;
    /// Looks up a code without counting a hit
    async fn get_stats(&self, code: &str) -> Result<ShortLink>;
}

pub struct ShortLinkService {
    repository: Arc<dyn ShortLinkRepositoryTrait>,
    generator: Arc<dyn CodeGenerator>,
    code_length: usize,
    max_attempts: usize,
}

impl ShortLinkService {
    pub fn new(repository: Arc<dyn ShortLinkRepositoryTrait>) -> Self {
        Self::with_generator(repository, Arc::new(SecureCodeGenerator))
    }

    pub fn with_generator(
        repository: Arc<dyn ShortLinkRepositoryTrait>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            repository,
            generator,
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    async fn claim_alias(&self, long_url: &str, alias: &str) -> Result<ShortLink> {
        if self.repository.find_by_code(alias).await?.is_some() {
            debug!("Custom alias '{}' is already taken", alias);
            return Err(ServiceError::AlreadyExists(alias.to_string()));
        }

        // The lookup above can race with another claim; the insert decides.
        match self.repository.create(&ShortLink::new(alias, long_url)).await {
            Ok(link) => {
                info!("Created short link '{}' (custom alias)", link.code);
                Ok(link)
            }
            Err(RepositoryError::Duplicate(_)) => {
                debug!("Custom alias '{}' was claimed concurrently", alias);
                Err(ServiceError::AlreadyExists(alias.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn allocate_generated(&self, long_url: &str) -> Result<ShortLink> {
        if let Some(existing) = self.repository.find_by_target(long_url).await? {
            debug!("Reusing short link '{}' for {}", existing.code, long_url);
            return Ok(existing);
        }

        for attempt in 1..=self.max_attempts {
            // Entropy failures abort the allocation instead of consuming an attempt
            let code = self.generator.generate(self.code_length)?;

            match self.repository.create(&ShortLink::new(code, long_url)).await {
                Ok(link) => {
                    info!("Created short link '{}' on attempt {}", link.code, attempt);
                    return Ok(link);
                }
                Err(RepositoryError::Duplicate(_)) => {
                    debug!("Generated code collided on attempt {}", attempt);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "Gave up allocating a code for {} after {} attempts",
            long_url, self.max_attempts
        );
        Err(ServiceError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Best-effort hit counter update. The outcome is deliberately discarded;
    /// a failing or stalled store must not fail or hold up a resolve.
    async fn record_hit(&self, code: &str) {
        match tokio::time::timeout(HIT_RECORD_TIMEOUT, self.repository.increment_hits(code)).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to record hit for '{}': {}", code, e),
            Err(_) => warn!("Timed out recording hit for '{}'", code),
        }
    }
}

#[async_trait]
impl ShortLinkServiceTrait for ShortLinkService {
    async fn allocate(&self, long_url: &str, custom_alias: Option<&str>) -> Result<ShortLink> {
        if long_url.trim().is_empty() {
            return Err(ServiceError::InvalidInput("long URL is required".to_string()));
        }

        match custom_alias.filter(|alias| !alias.is_empty()) {
            Some(alias) => self.claim_alias(long_url, alias).await,
            None => self.allocate_generated(long_url).await,
        }
    }

    async fn resolve(&self, code: &str) -> Result<ShortLink> {
        let link = match self.repository.find_by_code(code).await {
            Ok(Some(link)) => link,
            // A duplicate signal on a read is an anomaly; treat the code as unknown
            Ok(None) | Err(RepositoryError::Duplicate(_)) => {
                return Err(ServiceError::NotFound(code.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.record_hit(code).await;

        Ok(link)
    }

    async fn get_stats(&self, code: &str) -> Result<ShortLink> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(code.to_string()))
    }
}
