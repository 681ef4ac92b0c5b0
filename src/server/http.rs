//! HTTP server implementation
//!
//! hyper http1 accept loop with manual `(method, path)` dispatch. The
//! collection segment of `/api/{collection}[/{id}]` resolves through the
//! closed `Entity` enum in `routes`.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::routes::envelope::{self, ApiBody};
use crate::types::Result;

/// Shared application state.
///
/// The database handle is owned here and injected into handlers; there is
/// no process-global connection. `None` means the service runs without a
/// configured or reachable database and data endpoints answer
/// `DB_UNAVAILABLE`.
pub struct AppState {
    pub args: Args,
    pub mongo: Option<MongoClient>,
}

impl AppState {
    pub fn new(args: Args, mongo: Option<MongoClient>) -> Self {
        Self { args, mongo }
    }
}

/// Run the HTTP server until the process is terminated
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Annuaire listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.mongo.is_none() {
        warn!("No database connection - data endpoints will report DB_UNAVAILABLE");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<ApiBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // CORS preflight
    if method == Method::OPTIONS {
        return Ok(envelope::preflight());
    }

    let response = match (method, path.as_str()) {
        // Liveness probe - returns 200 if the service is running
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(&state),

        // Readiness probe - returns 200 only if the database is connected
        (Method::GET, "/ready") | (Method::GET, "/readyz") => routes::readiness_check(&state),

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Directory statistics
        (Method::GET, "/api/stats") => routes::stats(&state).await,

        // Entity CRUD under /api/{collection}[/{id}]
        _ if path.starts_with("/api/") => {
            routes::handle_api_request(req, Arc::clone(&state), &path).await
        }

        _ => envelope::failure_status(
            StatusCode::NOT_FOUND,
            format!("No route for {path}"),
            "NOT_FOUND",
        ),
    };

    Ok(response)
}
