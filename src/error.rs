//! Error types for LifeOps.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("No LLM provider configured")]
    NotConfigured,
}

/// Account and session errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session missing or expired")]
    Unauthorized,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Analysis pipeline errors.
///
/// These never escape `AnalysisPipeline::run`; they are logged and recorded
/// on the result when a fallback path is taken.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{domain} stage failed: {source}")]
    Stage {
        domain: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("Empty response from {domain} stage")]
    EmptyResponse { domain: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_name_the_domain_and_provider() {
        let err = PipelineError::Stage {
            domain: "finance",
            source: LlmError::RequestFailed {
                provider: "gpt-4o".to_string(),
                reason: "HTTP 429".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "finance stage failed: Provider gpt-4o request failed: HTTP 429"
        );
        assert_eq!(LlmError::NotConfigured.to_string(), "No LLM provider configured");
    }
}
