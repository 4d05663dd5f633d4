//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (guard targets reference existing routes)
//! - Validate value ranges (thresholds and timeouts > 0, URL scheme)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "backend.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }

    let health = &config.health_check;
    if health.failure_threshold == 0 {
        errors.push(ValidationError::new("health_check.failure_threshold", "must be at least 1"));
    }
    if health.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be greater than 0"));
    }
    if health.timeout_secs == 0 {
        errors.push(ValidationError::new("health_check.timeout_secs", "must be greater than 0"));
    }
    if !health.path.starts_with('/') {
        errors.push(ValidationError::new("health_check.path", "must start with '/'"));
    }

    if config.timeouts.authenticated_request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.authenticated_request_secs",
            "must be greater than 0",
        ));
    }
    if config.timeouts.plain_request_secs == 0 {
        errors.push(ValidationError::new("timeouts.plain_request_secs", "must be greater than 0"));
    }
    if config.retries.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new("retries.attempt_timeout_ms", "must be greater than 0"));
    }

    let routing = &config.routing;
    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    for (i, route) in routing.routes.iter().enumerate() {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::new(
                format!("routing.routes[{}].path", i),
                "must start with '/'",
            ));
        }
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::new(
                format!("routing.routes[{}].name", i),
                format!("duplicate route name '{}'", route.name),
            ));
        }
        if !paths.insert(route.path.as_str()) {
            errors.push(ValidationError::new(
                format!("routing.routes[{}].path", i),
                format!("duplicate route path '{}'", route.path),
            ));
        }
    }
    if !names.contains(routing.sign_in_route.as_str()) {
        errors.push(ValidationError::new(
            "routing.sign_in_route",
            format!("no route named '{}'", routing.sign_in_route),
        ));
    }
    if !names.contains(routing.landing_route.as_str()) {
        errors.push(ValidationError::new(
            "routing.landing_route",
            format!("no route named '{}'", routing.landing_route),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "ftp://example.com".into();
        config.health_check.failure_threshold = 0;
        config.routing.landing_route = "Nowhere".into();
        config.routing.routes.push(RouteConfig::new("Home", "relative", false));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"backend.base_url"));
        assert!(fields.contains(&"health_check.failure_threshold"));
        assert!(fields.contains(&"routing.landing_route"));
        assert!(fields.contains(&"routing.routes[4].path"));
        assert!(fields.contains(&"routing.routes[4].name"));
    }

    #[test]
    fn test_unparseable_base_url() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "backend.base_url");
    }
}
