//! Operator tooling for the ring-group dialplan compiler.
//!
//! Holds the configuration model and the JSON seed loader used by the
//! `ringplan` binary.

pub mod seed;

use std::path::{Path, PathBuf};

use config::{ConfigError, builder::DefaultState};
use ringplan_dialplan::{CompilerOptions, DEFAULT_HTTAPI_URL};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Environment variable prefix, e.g. `RINGPLAN_STORE_PATH`.
pub const ENV_PREFIX: &str = "RINGPLAN";

/// Runtime configuration, deserialised from `ringplan.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CliConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Follow-me callback base URL, used when the store has no
  /// `dialplan/httapi_url` setting.
  #[serde(default = "default_httapi_url")]
  pub httapi_url: String,
  /// Recorded as the author of dialplans created by a compile.
  #[serde(default = "default_user_name")]
  pub user_name:  String,
}

fn default_store_path() -> PathBuf { PathBuf::from("ringplan.db") }

fn default_httapi_url() -> String { DEFAULT_HTTAPI_URL.to_owned() }

fn default_user_name() -> String { "system".to_owned() }

impl CliConfig {
  /// Read `path` (optional) layered under `RINGPLAN_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<DefaultState>,
  ) -> Result<Self, ConfigError> {
    let mut cfg: CliConfig = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn compiler_options(&self) -> CompilerOptions {
    CompilerOptions {
      httapi_url: self.httapi_url.clone(),
      user_name:  self.user_name.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(src: &str) -> CliConfig {
    CliConfig::from_builder(
      config::Config::builder().add_source(File::from_str(src, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn defaults_when_file_is_empty() {
    let cfg = from_toml("");
    assert_eq!(cfg.store_path, PathBuf::from("ringplan.db"));
    assert_eq!(cfg.httapi_url, DEFAULT_HTTAPI_URL);
    assert_eq!(cfg.user_name, "system");
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
      store_path = "/var/lib/ringplan/pbx.db"
      httapi_url = "http://10.0.0.5:8008"
      user_name  = "provisioner"
      "#,
    );
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/ringplan/pbx.db"));

    let options = cfg.compiler_options();
    assert_eq!(options.httapi_url, "http://10.0.0.5:8008");
    assert_eq!(options.user_name, "provisioner");
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = CliConfig::load(Path::new("/nonexistent/ringplan.toml")).unwrap();
    assert_eq!(cfg.httapi_url, DEFAULT_HTTAPI_URL);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/pbx.db")),
      PathBuf::from(home).join("pbx.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/pbx.db")), PathBuf::from("/abs/pbx.db"));
  }
}
