use anyhow::{Context, Result};
use ledger_core::LedgerConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

/// Explicit path, else `./ledger.toml` when present, else built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !p.exists() {
                log::debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                return Ok(LedgerConfig::default());
            }
            p
        }
    };

    let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LedgerConfig =
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &LedgerConfig) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(p, &LedgerConfig::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        init_config(Some(&path)).unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg, LedgerConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        fs::write(&path, "[formats]\ndate = \"%Y-%m\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("date format"));
    }

    #[test]
    fn test_missing_explicit_config_errors() {
        assert!(load_config(Some(Path::new("/no/such/ledger.toml"))).is_err());
    }
}
