use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{ChatHandler, QueryHandler, SchemaHandler, ToolHandler},
    routes::{chat_routes, health_routes, query_routes, schema_routes, tool_routes},
};

pub struct HttpServer {
    query_handler: Arc<QueryHandler>,
    schema_handler: Arc<SchemaHandler>,
    chat_handler: Arc<ChatHandler>,
    tool_handler: Arc<ToolHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        query_handler: Arc<QueryHandler>,
        schema_handler: Arc<SchemaHandler>,
        chat_handler: Arc<ChatHandler>,
        tool_handler: Arc<ToolHandler>,
        port: Option<u16>,
    ) -> Self {
        Self {
            query_handler,
            schema_handler,
            chat_handler,
            tool_handler,
            port: port.unwrap_or(3000),
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .merge(health_routes())
            .merge(query_routes(self.query_handler))
            .merge(schema_routes(self.schema_handler))
            .merge(chat_routes(self.chat_handler))
            .merge(tool_routes(self.tool_handler))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024)) // 2MB cap
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
