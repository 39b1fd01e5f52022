use crate::handlers;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use supportdesk_agent::SupportAgent;
use supportdesk_session::SessionManager;

/// Shared application state.
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub agent: Arc<SupportAgent>,
    /// Longest accepted query, in characters.
    pub max_query_length: usize,
}

/// The HTTP front of the support service.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router. `/health` sits at the root, everything else under `/api`.
    pub fn build(
        sessions: Arc<SessionManager>,
        agent: Arc<SupportAgent>,
        max_query_length: usize,
    ) -> Router {
        let state = Arc::new(AppState {
            sessions,
            agent,
            max_query_length,
        });

        let api = Router::new()
            .route("/query", post(handlers::query))
            .route("/session/create", post(handlers::create_session))
            .route(
                "/session/{id}",
                get(handlers::get_session).delete(handlers::delete_session),
            )
            .route("/sessions", get(handlers::list_sessions))
            .route("/summarize/{id}", post(handlers::summarize))
            .route("/next-actions/{id}", post(handlers::next_actions));

        Router::new()
            .route("/health", get(handlers::health_handler))
            .nest("/api", api)
            .with_state(state)
    }
}
