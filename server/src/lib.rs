//! # Versions server
//!
//! HTTP server exposing the `Version` resource: listing, lookup, creation,
//! replacement, deletion and fulltext search, backed by a relational database.

use clap::Parser;
use derive_more::derive::{Display, Error, From};

pub mod app;
mod config;
mod domains;
mod logging;

pub use app::{App, AppConfig, BuildError, FatalError, ServeConfig};
pub use clap::Parser as ClapParser;
use config::ConfigArgs;

#[derive(Debug, Parser)]
#[command(version, about)]
/// Serve the versions api
pub struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Display, Error, From)]
pub enum MainError {
    #[display("Error in reading the configuration")]
    Config(figment::Error),
    #[display("Error in setting up the logging")]
    Logging(tracing_config::TracingConfigError),
    #[display("Cannot start the async runtime")]
    Runtime(std::io::Error),
    #[display("Error while building the app")]
    Build(BuildError),
    #[display("Fatal error while serving the app")]
    Fatal(FatalError),
}

pub fn main(Cli { config }: Cli) -> Result<(), MainError> {
    let config = config::configure(config)?;
    // the guard keeps the writers flushing until the end of main
    let _guard = logging::init(&config.logging)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(config.serve))
}

async fn serve(ServeConfig { socket_addr, app }: ServeConfig) -> Result<(), MainError> {
    let app = App::build(app).await?;
    app.serve(socket_addr).await?;
    Ok(())
}
