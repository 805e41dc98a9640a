use url::Url;
use validator::ValidationError;

/// Longest accepted custom alias
const MAX_ALIAS_LENGTH: usize = 32;

/// Path segments routed elsewhere; an alias with these names could never resolve
const RESERVED_ALIASES: &[&str] = &["health", "shorten", "stats"];

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a URL string is properly formatted and uses http/https
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.host().is_none() {
                return Err(validation_error("url_host", "URL must have a host"));
            }

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(validation_error(
                    "url_scheme",
                    "URL scheme must be http or https",
                ));
            }

            Ok(())
        }
        Err(_) => Err(validation_error("url_format", "Invalid URL format")),
    }
}

/// Validates a custom alias. An empty alias means "generate one" and passes.
pub fn validate_custom_alias(alias: &str) -> Result<(), ValidationError> {
    if alias.is_empty() {
        return Ok(());
    }

    if alias.len() > MAX_ALIAS_LENGTH {
        return Err(validation_error(
            "custom_alias_length",
            "Custom alias must be between 1 and 32 characters",
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(validation_error(
            "custom_alias_charset",
            "Custom alias can only contain alphanumeric characters, hyphens, and underscores",
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(validation_error(
            "custom_alias_reserved",
            "Custom alias is reserved",
        ));
    }

    Ok(())
}
