use config::{Config, Environment, File};
use serde::{de::DeserializeOwned, Serialize};

/// Parses a config struct from three layered sources, weakest first:
/// the struct's `Default`, an optional TOML/JSON/YAML file, and
/// `{env_prefix}_*` environment variables.
pub fn parse<T>(config_file: &str, env_prefix: &str) -> Result<T, config::ConfigError>
where
    T: DeserializeOwned + Serialize + Default,
{
    Config::builder()
        .add_source(Config::try_from(&T::default())?)
        .add_source(File::with_name(config_file).required(false))
        .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
        .build()?
        .try_deserialize()
}
