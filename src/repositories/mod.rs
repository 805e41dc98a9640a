mod memory;
mod short_link;

pub use memory::InMemoryShortLinkRepository;
pub use short_link::{PostgresShortLinkRepository, ShortLinkRepositoryTrait};

#[cfg(test)]
pub use short_link::MockShortLinkRepositoryTrait;
