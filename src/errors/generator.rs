use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The operating system random source could not be read
    #[error("Entropy source failure: {0}")]
    Entropy(String),
}
