pub mod errors;
pub mod valid;
pub mod version;

use errors::ErrorChain;

fn internal_server_error<E: std::error::Error>(error: &E) {
    tracing::error!("Internal server error: {}", ErrorChain(error));
}
