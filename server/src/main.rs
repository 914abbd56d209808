use std::process::ExitCode;

use versions_server::{ClapParser, Cli};
use versions_server_dtos::errors::ErrorChain;

fn main() -> ExitCode {
    match versions_server::main(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorChain(&err));
            ExitCode::FAILURE
        }
    }
}
