use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const VAULT_DIR_ENV: &str = "VAULT_DIR";
const DEFAULT_VAULT_DIRNAME: &str = ".session-vault";

/// Get the vault root: `$VAULT_DIR`, else `~/.session-vault`
pub fn get_vault_dir() -> Result<PathBuf> {
    vault_dir_from(env::var_os(VAULT_DIR_ENV), dirs::home_dir())
        .context("VAULT_DIR is not set and the home directory could not be determined")
}

/// An empty `VAULT_DIR` counts as unset
fn vault_dir_from(vault_dir: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match vault_dir {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home.map(|home| home.join(DEFAULT_VAULT_DIRNAME)),
    }
}
