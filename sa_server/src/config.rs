//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use stake_arena::PlayerId;
use stake_arena::auth::manager::MIN_SECRET_LEN;
use std::{net::SocketAddr, str::FromStr, time::Duration};

/// Default server bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Default seconds between background transition sweeps
pub const DEFAULT_EVALUATE_INTERVAL_SECS: u64 = 5;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Security configuration
    pub security: SecurityConfig,
    /// Platform role configuration
    pub platform: PlatformConfig,
    /// Interval of the background `evaluate_all` sweep
    pub evaluate_interval: Duration,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

/// Platform identities
#[derive(Debug, Clone, Copy)]
pub struct PlatformConfig {
    /// May emergency-cancel, report standings and collect platform fees
    pub admin_id: PlayerId,
    /// Receives platform fees
    pub treasury_id: PlayerId,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            metrics_bind_override,
        )
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address
        let bind = match bind_override {
            Some(bind) => bind,
            None => match parse_var::<SocketAddr, _>(&lookup, "SERVER_BIND")? {
                Some(bind) => bind,
                None => DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: "Default bind address is invalid".to_string(),
                })?,
            },
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        // Platform identities
        let admin_id: PlayerId =
            parse_var(&lookup, "PLATFORM_ADMIN_ID")?.ok_or_else(|| {
                ConfigError::MissingRequired {
                    var: "PLATFORM_ADMIN_ID".to_string(),
                    hint: "Participant id acting as platform operator".to_string(),
                }
            })?;
        let treasury_id = parse_var(&lookup, "PLATFORM_TREASURY_ID")?.unwrap_or(admin_id);

        let evaluate_interval_secs = parse_var(&lookup, "EVALUATE_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_EVALUATE_INTERVAL_SECS);

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        let config = ServerConfig {
            bind,
            security: SecurityConfig { jwt_secret },
            platform: PlatformConfig {
                admin_id,
                treasury_id,
            },
            evaluate_interval: Duration::from_secs(evaluate_interval_secs),
            metrics_bind,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!(
                    "Must be at least {MIN_SECRET_LEN} characters (128-bit security)"
                ),
            });
        }

        if self.evaluate_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "EVALUATE_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an optional variable, rejecting unparsable values
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned(), None, None)
    }

    fn test_secret() -> String {
        "a".repeat(32)
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_defaults() {
        let secret = test_secret();
        let secret = secret.as_str();
        let config = load(&[("JWT_SECRET", secret), ("PLATFORM_ADMIN_ID", "7")]).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.platform.admin_id, 7);
        assert_eq!(config.platform.treasury_id, 7);
        assert_eq!(config.evaluate_interval, Duration::from_secs(5));
        assert!(config.metrics_bind.is_none());
    }

    #[test]
    fn test_missing_secret() {
        let err = load(&[("PLATFORM_ADMIN_ID", "7")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_secret() {
        let err = load(&[("JWT_SECRET", "short"), ("PLATFORM_ADMIN_ID", "7")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_missing_admin() {
        let secret = test_secret();
        let secret = secret.as_str();
        let err = load(&[("JWT_SECRET", secret)]).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "PLATFORM_ADMIN_ID")
        );
    }

    #[test]
    fn test_unparsable_values_rejected() {
        let secret = test_secret();
        let secret = secret.as_str();
        let err = load(&[
            ("JWT_SECRET", secret),
            ("PLATFORM_ADMIN_ID", "7"),
            ("SERVER_BIND", "not-an-address"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "SERVER_BIND"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let secret = test_secret();
        let secret = secret.as_str();
        let err = load(&[
            ("JWT_SECRET", secret),
            ("PLATFORM_ADMIN_ID", "7"),
            ("EVALUATE_INTERVAL_SECS", "0"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref var, .. } if var == "EVALUATE_INTERVAL_SECS")
        );
    }

    #[test]
    fn test_overrides_win() {
        let secret = test_secret();
        let secret = secret.as_str();
        let vars: HashMap<String, String> = [
            ("JWT_SECRET".to_string(), secret.to_string()),
            ("PLATFORM_ADMIN_ID".to_string(), "7".to_string()),
            ("PLATFORM_TREASURY_ID".to_string(), "8".to_string()),
            ("SERVER_BIND".to_string(), "0.0.0.0:1".to_string()),
        ]
        .into_iter()
        .collect();
        let bind: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let metrics: SocketAddr = "127.0.0.1:9090".parse().unwrap();

        let config =
            ServerConfig::from_lookup(|key| vars.get(key).cloned(), Some(bind), Some(metrics))
                .unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(config.metrics_bind, Some(metrics));
        assert_eq!(config.platform.treasury_id, 8);
    }
}
