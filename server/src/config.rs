use std::{convert::Infallible, path::PathBuf};

use clap::Args;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map, Tag, Value},
    Figment, Metadata, Profile, Provider,
};
use serde::{de::Error, Deserialize, Serialize};
use tracing_config::config::model::TracingConfig;

use crate::{app::ServeConfig, logging::default_tracing_config};

/// Name of the config file searched in the working directory
const DEFAULT_CONFIG_FILE: &str = "VersionsServer.toml";
/// Prefix of the environment variables read as configuration
const ENV_PREFIX: &str = "VERSIONS_SERVER_";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    /// General app configs
    pub serve: ServeConfig,
    /// Configs about loggings
    pub logging: TracingConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            serve: Default::default(),
            logging: default_tracing_config(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[clap(short, long)]
    /// Config file to load
    config_file: Option<PathBuf>,
    #[clap(long)]
    /// Do not search for the default config file
    no_default_config_file: bool,
    #[clap(long)]
    /// Do not load enviroment variables
    no_env: bool,
    #[clap(long)]
    /// Do not use defaults, load every config from other sources
    no_defaults: bool,

    #[clap(short = 'C')]
    /// Command line configuration
    ///
    /// Formatted as `conf.name=value`. Will overwrite any other source.
    configs: Vec<String>,
}

/// Insert `value` in `data` at the dotted `path`, creating the intermediate tables
fn insert_at(data: &mut Dict, path: &str, value: Value) -> Result<(), figment::Error> {
    let (parents, name) = match path.rsplit_once('.') {
        Some((parents, name)) => (Some(parents), name),
        None => (None, path),
    };
    let mut data = data;
    for component in parents.into_iter().flat_map(|parents| parents.split('.')) {
        let entry = data
            .entry(component.to_owned())
            .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
        let Value::Dict(_, inner) = entry else {
            return Err(figment::Error::custom(format!(
                "Invalid configuration `{path}`: `{component}` was already given a value"
            )));
        };
        data = inner;
    }
    data.insert(name.to_owned(), value);
    Ok(())
}

impl Provider for ConfigArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("command line arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut data = Dict::new();

        for item in &self.configs {
            let (path, value) = item.split_once('=').ok_or_else(|| {
                figment::Error::custom(format!(
                    "Invalid configuration {item}: expected string of the type `conf.name=value`"
                ))
            })?;
            let value = value
                .parse::<Value>()
                .unwrap_or_else(|never: Infallible| match never {});
            insert_at(&mut data, path, value)?;
        }

        Ok(Map::from_iter([(Profile::Global, data)]))
    }
}

/// Build the figment from the multiple configuration sources
fn figment(config_args: ConfigArgs) -> Figment {
    // First, the defaults values
    let mut figment = if !config_args.no_defaults {
        Figment::from(Serialized::defaults(Config::default()))
    } else {
        Figment::new()
    };
    // Then the default config file
    if !config_args.no_default_config_file {
        figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
    }
    // Then the one provided by the user
    if let Some(config_file) = &config_args.config_file {
        figment = figment.merge(Toml::file_exact(config_file));
    }
    // Then, the enviroment variables and the arguments
    if !config_args.no_env {
        match dotenv::dotenv() {
            Ok(_) => (),
            Err(err) if err.not_found() => (),
            Err(err) => eprintln!("Cannot open `.env` to load enviroment variable: {err}"),
        };
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").global());
    }
    // Finally the cli arguments
    figment.merge(config_args)
}

pub fn configure(config_args: ConfigArgs) -> figment::Result<Config> {
    figment(config_args).extract()
}
