use std::{
    future::Future,
    net::{Ipv4Addr, SocketAddr},
};

use axum::{extract::FromRef, Router};
use derive_more::derive::{Display, Error, From};
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{instrument, Instrument};
use utoipa::openapi::{Info, License, OpenApiBuilder};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use versions_server_migration::{Migrator, MigratorTrait};

use crate::domains;

pub mod connection;

pub use connection::{ConnectOptions, ConnectOptionsLarge, UrlOrParts};

/// Configuration of the app itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database to connect to
    #[serde(default)]
    pub db: ConnectOptions,
}

/// Configuration of the app, and where to serve it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Address to listen on
    pub socket_addr: SocketAddr,
    #[serde(flatten)]
    pub app: AppConfig,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            socket_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            app: Default::default(),
        }
    }
}

/// An unrecoverable error while building the app
#[derive(Debug, Display, Error)]
pub enum BuildError {
    #[display("Cannot connect to the database")]
    DbConnection(DbErr),
    #[display("Cannot apply the migrations to the database")]
    Migration(DbErr),
}

/// An unrecoverable error while serving
#[derive(Debug, Display, Error, From)]
pub enum FatalError {
    #[display("Cannot bind to the address `{addr}`")]
    BindAddress {
        source: std::io::Error,
        addr: SocketAddr,
    },
    #[display("Fatal io error while serving")]
    IOError(std::io::Error),
    #[display("Cannot close the database connection")]
    DbErr(DbErr),
}

/// The versions app, with its shared state
#[derive(Debug, Clone, FromRef)]
pub struct App {
    db: DatabaseConnection,
}

impl App {
    /// Connect to the database and bring its schema up to date
    #[instrument(name = "build-app", skip_all)]
    pub async fn build(AppConfig { db }: AppConfig) -> Result<Self, BuildError> {
        tracing::info!("Connecting to the database");
        let db = Database::connect(db)
            .instrument(tracing::info_span!("initial-db-connection"))
            .await
            .map_err(BuildError::DbConnection)?;

        tracing::info!("Applying eventual migrations to the database");
        Migrator::up(&db, None)
            .instrument(tracing::info_span!("apply-pending-migrations"))
            .await
            .map_err(BuildError::Migration)?;

        Ok(Self { db })
    }

    /// The full service: api, documentation and request tracing
    pub fn service(self) -> Router {
        let (router, api) = OpenApiRouter::with_openapi(openapi())
            .merge(domains::router())
            .split_for_parts();

        router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    /// Serve the app until a shutdown signal is received
    pub async fn serve(self, socket_addr: SocketAddr) -> Result<(), FatalError> {
        self.serve_with_shutdown(socket_addr, shutdown_signal())
            .await
    }

    #[instrument(skip(self, shutdown))]
    pub async fn serve_with_shutdown<S>(
        self,
        socket_addr: SocketAddr,
        shutdown: S,
    ) -> Result<(), FatalError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        #[cfg(debug_assertions)]
        tracing::warn!("This is a debug build. As such, it is slower. Use a release build in production");

        tracing::debug!(%socket_addr, "Creating the listener");
        let listener = TcpListener::bind(socket_addr)
            .await
            .map_err(|source| FatalError::BindAddress {
                source,
                addr: socket_addr,
            })?;

        let db = self.db.clone();
        tracing::info!(%socket_addr, "Start serving the app");
        axum::serve(listener, self.service())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Closing the database connection");
        db.close().await?;
        Ok(())
    }

    /// Close the connection to the database
    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}

#[instrument]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {err}");
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    tracing::info!("Received shutdown signal")
}

fn openapi() -> utoipa::openapi::OpenApi {
    OpenApiBuilder::new()
        .info(
            Info::builder()
                .title("Versions Server")
                .description(Some(env!("CARGO_PKG_DESCRIPTION")))
                .license(Some(License::new(env!("CARGO_PKG_LICENSE"))))
                .version(env!("CARGO_PKG_VERSION")),
        )
        .build()
}
