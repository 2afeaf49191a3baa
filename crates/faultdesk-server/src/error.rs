use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Environment variable that sets a dotted configuration key
pub fn to_env_var(field_path: &str) -> String {
    format!("FAULTDESK_{}", field_path.to_uppercase().replace('.', "__"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.api_key"), "FAULTDESK_PROVIDER__API_KEY");
        assert_eq!(to_env_var("server.port"), "FAULTDESK_SERVER__PORT");
    }

    #[test]
    fn test_missing_env_var_message() {
        let err = ConfigError::MissingEnvVar {
            env_var: to_env_var("provider.api_key"),
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: FAULTDESK_PROVIDER__API_KEY"
        );
    }
}
