//! Server assembly: wiring adapters to ports, router composition, startup
//! and graceful shutdown.
//!
//! ```text
//! /ws                              websocket_router      (token auth in handler)
//! /health                          health_routes
//! /api/channels/:channel/presence  presence_routes       (auth_middleware)
//! /internal/events                 internal_routes       (service_key_middleware)
//! /internal/diagnostics/events     internal_routes       (diagnostics only)
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::auth::{OidcConfig, OidcSessionValidator};
use crate::adapters::enrollment::{HttpEnrollmentChecker, InMemoryEnrollmentDirectory};
use crate::adapters::http::middleware::{
    auth_middleware, service_key_middleware, AuthState, ServiceKeyState,
};
use crate::adapters::http::realtime::{
    health_routes, internal_routes, presence_routes, RealtimeAppState,
};
use crate::adapters::websocket::{
    websocket_router, PresenceTracker, RecordingObserver, RoomRegistry, TracingObserver,
    WebSocketEventBridge, WebSocketState,
};
use crate::config::{AppConfig, ConfigError, RealtimeConfig, ServerConfig, ValidationError};
use crate::domain::foundation::{AuthError, DomainError};
use crate::ports::{EnrollmentChecker, EventPublisher, RoomMembership, SessionValidator};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Auth setup failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Enrollment client setup failed: {0}")]
    Enrollment(#[from] DomainError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the routers need, built once per process.
#[derive(Clone)]
pub struct AppComponents {
    pub registry: Arc<RoomRegistry>,
    pub validator: Arc<dyn SessionValidator>,
    pub publisher: Arc<dyn EventPublisher>,
    pub websocket: WebSocketState,
    pub http: RealtimeAppState,
    pub internal_key: Option<ServiceKeyState>,
    pub diagnostics: bool,
}

impl AppComponents {
    /// Wires the registry, fan-out and handlers around the given ports.
    pub fn new(
        validator: Arc<dyn SessionValidator>,
        enrollment: Arc<dyn EnrollmentChecker>,
        realtime: &RealtimeConfig,
    ) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let membership: Arc<dyn RoomMembership> = Arc::new(PresenceTracker::new(registry.clone()));

        let mut bridge = WebSocketEventBridge::new(registry.clone());
        let recorder = if realtime.diagnostics_enabled {
            let recorder = Arc::new(RecordingObserver::new(realtime.diagnostics_capacity));
            bridge = bridge
                .with_observer(Arc::new(TracingObserver))
                .with_observer(recorder.clone());
            Some(recorder)
        } else {
            None
        };
        let publisher: Arc<dyn EventPublisher> = Arc::new(bridge);

        let websocket = WebSocketState::new(
            registry.clone(),
            validator.clone(),
            enrollment.clone(),
            realtime.max_frame_bytes,
        );
        let http = RealtimeAppState {
            registry: registry.clone(),
            membership,
            enrollment,
            publisher: publisher.clone(),
            recorder,
        };

        Self {
            registry,
            validator,
            publisher,
            websocket,
            http,
            internal_key: realtime.internal_api_key.clone().map(Arc::new),
            diagnostics: realtime.diagnostics_enabled,
        }
    }

    /// Builds production adapters from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let oidc = OidcConfig::new(&config.auth.issuer_url, &config.auth.audience)
            .with_cache_ttl(config.auth.jwks_cache_ttl());
        let validator: Arc<dyn SessionValidator> = Arc::new(OidcSessionValidator::new(oidc)?);

        let enrollment: Arc<dyn EnrollmentChecker> =
            match (&config.enrollment.base_url, &config.enrollment.service_key) {
                (Some(base_url), Some(key)) => Arc::new(HttpEnrollmentChecker::new(
                    base_url.clone(),
                    key.clone(),
                    config.enrollment.timeout(),
                )?),
                _ => {
                    tracing::warn!("no enrollment service configured, using empty in-memory directory");
                    Arc::new(InMemoryEnrollmentDirectory::new())
                }
            };

        Ok(Self::new(validator, enrollment, &config.realtime))
    }
}

/// HTTP-level router settings.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServerConfig> for RouterOptions {
    fn from(server: &ServerConfig) -> Self {
        Self {
            cors_origins: server.cors_origins_list(),
            request_timeout: server.request_timeout(),
        }
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

/// Build the Axum router with all routes.
pub fn build_router(components: &AppComponents, options: &RouterOptions) -> Router {
    let auth: AuthState = components.validator.clone();

    let mut http_routes = Router::new()
        .merge(health_routes())
        .nest(
            "/api",
            presence_routes().layer(middleware::from_fn_with_state(auth, auth_middleware)),
        );

    match &components.internal_key {
        Some(key) => {
            http_routes = http_routes.nest(
                "/internal",
                internal_routes(components.diagnostics).layer(middleware::from_fn_with_state(
                    key.clone(),
                    service_key_middleware,
                )),
            );
        }
        None => tracing::info!("no internal API key configured, /internal routes disabled"),
    }

    let http_routes = http_routes
        .with_state(components.http.clone())
        .layer(TimeoutLayer::new(options.request_timeout));

    let router = Router::new()
        .merge(websocket_router().with_state(components.websocket.clone()))
        .merge(http_routes)
        .layer(TraceLayer::new_for_http());

    match cors_layer(&options.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// configured filter.
pub fn init_tracing(server: &ServerConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Binds, serves until SIGINT/SIGTERM, then tears down the registry.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let addr = config.server.socket_addr()?;
    let components = AppComponents::from_config(&config)?;
    let router = build_router(&components, &RouterOptions::from(&config.server));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        environment = ?config.server.environment,
        internal_routes = components.internal_key.is_some(),
        diagnostics = components.diagnostics,
        "campus-realtime listening"
    );

    let registry = components.registry.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            // Closing every outbound queue ends the socket writers, which
            // lets upgraded connections finish.
            let closed = registry.shutdown().await;
            tracing::info!(connections = closed, "registry shut down");
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("could not register signal handlers, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
