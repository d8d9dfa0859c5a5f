//! Generic configuration loading for WellFlow services
//!
//! Configuration comes from a YAML file merged with prefixed environment
//! variables, environment winning. Each service defines its own config
//! struct with serde defaults and loads it through [`load_config`].

use std::path::Path;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Load a service configuration from a YAML file plus environment overrides
///
/// `env_prefix` is the variable prefix without the trailing underscore, e.g.
/// `"TXNSRV"` picks up `TXNSRV_REDIS_URL` as `redis.url`. A missing file is
/// not an error as long as defaults plus environment satisfy the target
/// struct.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>, env_prefix: &str) -> Result<T> {
    let config = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(&format!("{}_", env_prefix)).split("_"))
        .extract()?;

    Ok(config)
}
