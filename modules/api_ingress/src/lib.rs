//! HTTP host for the contacts server.
//!
//! Owns the global middleware stack and the listener. Feature modules hand
//! over a plain `axum::Router` plus an optional OpenAPI document; the ingress
//! adds `/health`, `/openapi.json`, `/docs` and the layers, then serves it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::header,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wrap module routes with the shared endpoints and middleware.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes);

        if self.config.enable_docs {
            if let Some(doc) = openapi {
                // Serialized once, served as static JSON
                let value = Arc::new(serde_json::to_value(&doc)?);
                tracing::info!(
                    paths = doc.paths.paths.len(),
                    "Serving OpenAPI document at /openapi.json"
                );
                router = router
                    .route(
                        "/openapi.json",
                        get(move || {
                            let v = value.clone();
                            async move {
                                ([(header::CACHE_CONTROL, "no-store")], Json((*v).clone()))
                                    .into_response()
                            }
                        }),
                    )
                    .route("/docs", get(web::serve_docs));
            }
        }

        router = router.fallback(web::not_found);

        // Layers are added innermost first:
        // SetRequestId -> PropagateRequestId -> push_req_id -> Trace -> Timeout -> CORS -> BodyLimit
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            self.config.request_timeout_secs.max(1),
        )));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind `addr` and serve `router` until `cancel` fires.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
