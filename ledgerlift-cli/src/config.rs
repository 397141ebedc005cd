use anyhow::{Context, Result};
use ledgerlift_core::ExtractorConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_ledgerlift_home, ledgerlift_home};

pub fn default_config_path() -> Result<PathBuf> {
    Ok(ledgerlift_home()?.join("config.toml"))
}

/// Load from `explicit` if given (must exist), else from the home config if present.
pub fn load_config(explicit: Option<&Path>) -> Result<ExtractorConfig> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                return Ok(ExtractorConfig::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    ExtractorConfig::from_toml(&s).with_context(|| format!("load {}", p.display()))
}

pub fn save_config(cfg: &ExtractorConfig, path: &Path) -> Result<()> {
    let s = cfg.to_toml()?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one already exists. Returns the path.
pub fn init_config(explicit: Option<&Path>) -> Result<PathBuf> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_ledgerlift_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(p);
    }
    save_config(&ExtractorConfig::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(p)
}
