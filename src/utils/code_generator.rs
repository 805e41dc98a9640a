use rand::{rngs::OsRng, TryRngCore};

use crate::errors::GeneratorError;

/// Base62 alphabet (0-9, a-z, A-Z)
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest multiple of 62 that fits in a byte; bytes at or above it are
/// discarded so every character stays equally likely.
const REJECTION_BOUND: u8 = 248;

/// Produces random short codes
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Returns exactly `length` characters drawn from [`ALPHABET`]
    fn generate(&self, length: usize) -> Result<String, GeneratorError>;
}

/// Generator backed by the operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self, length: usize) -> Result<String, GeneratorError> {
        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 32];

        while code.len() < length {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| GeneratorError::Entropy(e.to_string()))?;

            for &byte in buf.iter().filter(|&&b| b < REJECTION_BOUND) {
                if code.len() == length {
                    break;
                }
                code.push(ALPHABET[(byte % 62) as usize] as char);
            }
        }

        Ok(code)
    }
}
