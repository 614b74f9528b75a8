use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub eligibility: EligibilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub invalid_rule_policy: InvalidRulePolicy,
    pub max_condition_depth: u32,
    pub log_outcomes: bool,
}

/// What to do when a stored scheme rule fails to parse during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidRulePolicy {
    /// Exclude the scheme and report it in the evaluation issues.
    Skip,
    /// Abort the whole evaluation with an error naming the scheme.
    Fail,
}

impl InvalidRulePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "skip" | "report" => Some(Self::Skip),
            "fail" | "strict" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Eligibility overrides
        if let Ok(v) = env::var("ELIGIBILITY_INVALID_RULE_POLICY") {
            self.eligibility.invalid_rule_policy =
                InvalidRulePolicy::parse(&v).unwrap_or(self.eligibility.invalid_rule_policy);
        }
        if let Ok(v) = env::var("ELIGIBILITY_MAX_CONDITION_DEPTH") {
            self.eligibility.max_condition_depth = v.parse().unwrap_or(self.eligibility.max_condition_depth);
        }
        if let Ok(v) = env::var("ELIGIBILITY_LOG_OUTCOMES") {
            self.eligibility.log_outcomes = v.parse().unwrap_or(self.eligibility.log_outcomes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            eligibility: EligibilityConfig {
                invalid_rule_policy: InvalidRulePolicy::Skip,
                max_condition_depth: 32,
                log_outcomes: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            eligibility: EligibilityConfig {
                invalid_rule_policy: InvalidRulePolicy::Skip,
                max_condition_depth: 16,
                log_outcomes: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            eligibility: EligibilityConfig {
                invalid_rule_policy: InvalidRulePolicy::Skip,
                max_condition_depth: 8,
                log_outcomes: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
