use std::env;

/// Process-wide configuration, built once at startup and threaded into every
/// component's constructor. Nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres (pgvector) connection string for the schema vector index.
    pub vector_database_url: String,
    /// Path to the SQLite database the generated SQL runs against.
    pub source_database_path: String,
    pub ollama_base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Must match the configured embedding model (1024 for mxbai, 768 for nomic).
    pub embedding_dimension: usize,
    /// Number of schema records retrieved per question.
    pub retrieval_k: usize,
    /// Row cap applied to statements synthesized from natural language.
    pub max_result_rows: usize,
    /// Row cap for schema-preview fetches.
    pub preview_rows: usize,
    /// Maximum tool round trips allowed inside one chat exchange.
    pub max_tool_rounds: usize,
    pub request_timeout_secs: u64,
    pub port: u16,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(&'static str),
    InvalidValue { variable: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(name) => write!(f, "{} not set", name),
            ConfigError::InvalidValue { variable, message } => {
                write!(f, "invalid value for {}: {}", variable, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vector_database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVariable("DATABASE_URL"))?;

        let source_database_path =
            env::var("SOURCE_DATABASE_PATH").unwrap_or_else(|_| "./app.db".to_string());

        let ollama_base_url = env::var("OLLAMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());

        let embedding_model = env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "mxbai-embed-large:latest".to_string());

        let generation_model =
            env::var("GENERATION_MODEL").unwrap_or_else(|_| "granite-code:8b".to_string());

        Ok(Self {
            vector_database_url,
            source_database_path,
            ollama_base_url,
            embedding_model,
            generation_model,
            embedding_dimension: parse_var("EMBEDDING_DIMENSION", 1024)?,
            retrieval_k: parse_var("RETRIEVAL_K", 4)?,
            max_result_rows: parse_var("MAX_RESULT_ROWS", 1000)?,
            preview_rows: parse_var("PREVIEW_ROWS", 10)?,
            max_tool_rounds: parse_var("MAX_TOOL_ROUNDS", 8)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)?,
            port: parse_var("PORT", 3000)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(variable) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            variable,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let value: usize = parse_var("DBINSIGHT_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn config_error_display_names_the_variable() {
        let err = ConfigError::MissingVariable("DATABASE_URL");
        assert_eq!(err.to_string(), "DATABASE_URL not set");
    }
}
