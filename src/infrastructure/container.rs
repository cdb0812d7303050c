use std::sync::Arc;

use crate::{
    application::{
        ports::{EmbeddingProvider, GenerationProvider, RelationalStore},
        services::{
            MarkerToolCallDetector, QueryExecutor, SchemaDescriptorBuilder, SqlSynthesizer,
            ToolOrchestrator,
        },
        use_cases::{AskQuestionUseCase, ExecuteToolUseCase, RefreshSchemaIndexUseCase},
    },
    config::AppConfig,
    domain::repositories::SchemaIndexRepository,
    infrastructure::{
        database::{
            PostgresSchemaIndexRepository, SqliteStore, create_connection_pool, run_migrations,
        },
        external_services::{OllamaClient, OllamaClientConfig},
    },
    presentation::http::handlers::{ChatHandler, QueryHandler, SchemaHandler, ToolHandler},
};

pub struct AppContainer {
    pub config: AppConfig,

    // Backing stores and gateways
    pub relational_store: Arc<dyn RelationalStore>,
    pub schema_index: Arc<dyn SchemaIndexRepository>,
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub generation_provider: Arc<dyn GenerationProvider>,

    // Application services
    pub schema_builder: Arc<SchemaDescriptorBuilder>,
    pub sql_synthesizer: Arc<SqlSynthesizer>,
    pub query_executor: Arc<QueryExecutor>,
    pub tool_orchestrator: Arc<ToolOrchestrator>,

    // Use cases
    pub ask_question_use_case: Arc<AskQuestionUseCase>,
    pub refresh_schema_use_case: Arc<RefreshSchemaIndexUseCase>,
    pub execute_tool_use_case: Arc<ExecuteToolUseCase>,

    // HTTP handlers
    pub query_handler: Arc<QueryHandler>,
    pub schema_handler: Arc<SchemaHandler>,
    pub chat_handler: Arc<ChatHandler>,
    pub tool_handler: Arc<ToolHandler>,
}

impl AppContainer {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Vector store
        let db_pool = create_connection_pool(&config.vector_database_url)?;
        run_migrations(&db_pool)?;

        let schema_index_repository =
            PostgresSchemaIndexRepository::new(db_pool, config.embedding_dimension);
        schema_index_repository.verify_column_dimension()?;
        let schema_index: Arc<dyn SchemaIndexRepository> = Arc::new(schema_index_repository);

        // Relational store
        let relational_store: Arc<dyn RelationalStore> =
            Arc::new(SqliteStore::open(&config.source_database_path)?);

        // Model gateways
        let ollama = Arc::new(OllamaClient::new(OllamaClientConfig::from_app_config(
            &config,
        ))?);
        let embedding_provider: Arc<dyn EmbeddingProvider> = ollama.clone();
        let generation_provider: Arc<dyn GenerationProvider> = ollama;

        // Application services
        let schema_builder = Arc::new(SchemaDescriptorBuilder::new(relational_store.clone()));

        let sql_synthesizer = Arc::new(SqlSynthesizer::new(
            embedding_provider.clone(),
            generation_provider.clone(),
            schema_index.clone(),
            config.retrieval_k,
        ));

        let query_executor = Arc::new(QueryExecutor::new(
            relational_store.clone(),
            generation_provider.clone(),
            embedding_provider.clone(),
            schema_index.clone(),
            config.max_result_rows,
        ));

        let tool_orchestrator = Arc::new(ToolOrchestrator::new(
            generation_provider.clone(),
            Arc::new(MarkerToolCallDetector),
            config.max_tool_rounds,
        ));

        // Use cases
        let ask_question_use_case = Arc::new(AskQuestionUseCase::new(
            sql_synthesizer.clone(),
            query_executor.clone(),
        ));

        let refresh_schema_use_case = Arc::new(RefreshSchemaIndexUseCase::new(
            schema_builder.clone(),
            embedding_provider.clone(),
            schema_index.clone(),
        ));

        let execute_tool_use_case = Arc::new(ExecuteToolUseCase::new(
            ask_question_use_case.clone(),
            schema_builder.clone(),
        ));

        // HTTP handlers
        let query_handler = Arc::new(QueryHandler::new(ask_question_use_case.clone()));
        let schema_handler = Arc::new(SchemaHandler::new(
            refresh_schema_use_case.clone(),
            schema_builder.clone(),
            schema_index.clone(),
            config.preview_rows,
        ));
        let chat_handler = Arc::new(ChatHandler::new(tool_orchestrator.clone()));
        let tool_handler = Arc::new(ToolHandler::new(execute_tool_use_case.clone()));

        Ok(Self {
            config,
            relational_store,
            schema_index,
            embedding_provider,
            generation_provider,
            schema_builder,
            sql_synthesizer,
            query_executor,
            tool_orchestrator,
            ask_question_use_case,
            refresh_schema_use_case,
            execute_tool_use_case,
            query_handler,
            schema_handler,
            chat_handler,
            tool_handler,
        })
    }
}
