//! Standardized error handling for network failures and input validation

use crate::error::{HarborError, Result};
use reqwest::StatusCode;

/// Standard error handler for registry HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Describe a non-success registry response for the given operation
    pub fn describe_status(status: StatusCode, operation: &str) -> String {
        match status.as_u16() {
            401 => format!("Unauthorized to perform {}", operation),
            403 => format!("Forbidden: insufficient permissions for {}", operation),
            404 => format!("Resource not found for {}", operation),
            409 => format!("Conflict during {}", operation),
            500 => format!("Registry server error during {}", operation),
            502 | 503 => format!("Registry unavailable for {}", operation),
            _ => format!("{} failed (status {})", operation, status),
        }
    }
}

/// Network error categorization and handling
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    /// Categorize and format network errors with helpful context
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> HarborError {
        if error.is_timeout() {
            HarborError::Timeout(format!("{} timeout: {}", context, error))
        } else if error.is_connect() {
            HarborError::Network(format!("Connection error during {}: {}", context, error))
        } else if error.to_string().contains("certificate") {
            HarborError::Network(format!(
                "TLS certificate error during {} (consider --insecure for self-signed registries): {}",
                context, error
            ))
        } else {
            HarborError::Network(format!("{} network error: {}", context, error))
        }
    }
}

/// Validation error utilities
pub struct ValidationErrorHandler;

impl ValidationErrorHandler {
    /// Registry address is a bare host[:port], the scheme comes from the TLS flag
    pub fn validate_registry_address(address: &str) -> Result<()> {
        if address.is_empty() {
            return Err(HarborError::Validation(
                "Registry address cannot be empty (set --registry or HARBOR_URL)".to_string(),
            ));
        }

        if address.contains("://") {
            return Err(HarborError::Validation(format!(
                "Registry address must not include a scheme, use --tls instead: {}",
                address
            )));
        }

        if address.contains('/') {
            return Err(HarborError::Validation(format!(
                "Registry address must be host[:port] only: {}",
                address
            )));
        }

        Ok(())
    }

    pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
        if username.is_empty() {
            return Err(HarborError::Validation(
                "Username cannot be empty (set --username or HARBOR_USERNAME)".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(HarborError::Validation(
                "Password cannot be empty (set --password or HARBOR_PASSWORD)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(HarborError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if timeout > 86400 {
            // 24 hours
            return Err(HarborError::Validation(
                "Timeout cannot exceed 24 hours (86400 seconds)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_address_rejects_scheme_and_path() {
        assert!(ValidationErrorHandler::validate_registry_address("harbor.local:8443").is_ok());
        assert!(ValidationErrorHandler::validate_registry_address("").is_err());
        assert!(ValidationErrorHandler::validate_registry_address("https://harbor.local").is_err());
        assert!(ValidationErrorHandler::validate_registry_address("harbor.local/api").is_err());
    }

    #[test]
    fn timeout_bounds() {
        assert!(ValidationErrorHandler::validate_timeout(0).is_err());
        assert!(ValidationErrorHandler::validate_timeout(300).is_ok());
        assert!(ValidationErrorHandler::validate_timeout(86401).is_err());
    }

    #[test]
    fn status_descriptions_name_the_operation() {
        let msg = HttpErrorHandler::describe_status(StatusCode::NOT_FOUND, "tag lookup");
        assert_eq!(msg, "Resource not found for tag lookup");
        let msg = HttpErrorHandler::describe_status(StatusCode::IM_A_TEAPOT, "tag lookup");
        assert!(msg.starts_with("tag lookup failed (status 418"));
    }
}
