pub mod code_generator;

pub use code_generator::{CodeGenerator, SecureCodeGenerator};

#[cfg(test)]
pub use code_generator::MockCodeGenerator;
