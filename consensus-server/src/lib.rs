use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod auth;
mod consensus;
mod context;
mod docs;
mod errors;
mod lobbies;
mod results;
mod schemas;
mod serialized;

pub mod logging;

pub use context::*;

/// The default port the server will listen on, matching the base URL the
/// client ships with.
pub const DEFAULT_PORT: u16 = 5001;

pub type Router = axum::Router<ServerContext>;

/// Starts the consensus server
pub async fn run_server(engine: Arc<Engine>) {
    let port = env::var("CONSENSUS_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    // The client is a separate mobile process, so any origin is fine
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let context = ServerContext { engine };

    let root_router = Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/lobbies", lobbies::router())
        .nest("/api/consensus", consensus::router())
        .nest("/api/results", results::router())
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("listening on port {port}");

    axum::serve(listener, root_router.into_make_service())
        .await
        .unwrap();
}
