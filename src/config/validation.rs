use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("validator.batch_size must be positive")]
    ZeroBatchSize,

    #[error("breaker.failure_threshold must be positive")]
    ZeroFailureThreshold,

    #[error("{field} must be positive")]
    ZeroTimeout { field: &'static str },

    #[error("{field} is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("assets.public_prefix must not be empty")]
    EmptyPublicPrefix,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_breaker(config)?;
    validate_validator(config)?;
    validate_remote(config)?;
    validate_assets(config)?;
    Ok(())
}

fn validate_breaker(config: &Config) -> Result<(), ValidationError> {
    if config.breaker.failure_threshold == 0 {
        return Err(ValidationError::ZeroFailureThreshold);
    }
    if config.breaker.open_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "breaker.open_timeout_secs",
        });
    }
    Ok(())
}

fn validate_validator(config: &Config) -> Result<(), ValidationError> {
    if config.validator.batch_size == 0 {
        return Err(ValidationError::ZeroBatchSize);
    }
    if config.validator.probe_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "validator.probe_timeout_secs",
        });
    }
    validate_url("validator.probe_base_url", &config.validator.probe_base_url)
}

fn validate_remote(config: &Config) -> Result<(), ValidationError> {
    if config.remote.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "remote.request_timeout_secs",
        });
    }
    validate_url("remote.base_url", &config.remote.base_url)
}

fn validate_assets(config: &Config) -> Result<(), ValidationError> {
    if config.assets.public_prefix.is_empty() {
        return Err(ValidationError::EmptyPublicPrefix);
    }
    Ok(())
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            remote: RemoteConfig::default(),
            breaker: BreakerConfig::default(),
            validator: ValidatorConfig::default(),
            assets: AssetsConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = create_test_config();
        config.validator.batch_size = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroBatchSize)));
    }

    #[test]
    fn test_zero_failure_threshold() {
        let mut config = create_test_config();
        config.breaker.failure_threshold = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroFailureThreshold)));
    }

    #[test]
    fn test_zero_open_timeout() {
        let mut config = create_test_config();
        config.breaker.open_timeout_secs = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroTimeout { .. })));
    }

    #[test]
    fn test_invalid_remote_base_url() {
        let mut config = create_test_config();
        config.remote.base_url = "not a url".to_string();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidUrl {
                field: "remote.base_url",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_public_prefix() {
        let mut config = create_test_config();
        config.assets.public_prefix = String::new();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyPublicPrefix)));
    }
}
