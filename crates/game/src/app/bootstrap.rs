use std::env;
use std::path::PathBuf;

use gridview::{StyleTable, StyleTableError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::LoopConfig;

pub(crate) const ROOT_ENV_VAR: &str = "OUTPOST_ROOT";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) styles: StyleTable,
}

pub(crate) fn build_app() -> Result<AppWiring, StyleTableError> {
    init_tracing();
    info!("=== Outpost Startup ===");

    let styles = match resolve_asset_root() {
        Some(asset_root) => {
            info!(asset_root = %asset_root.display(), "style_table_source");
            StyleTable::load(&asset_root)?
        }
        None => {
            info!("no asset root found, using built-in styles");
            StyleTable::with_defaults()
        }
    };

    Ok(AppWiring {
        config: LoopConfig::default(),
        styles,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// `OUTPOST_ROOT` points at a project root containing `assets/`; without it
/// the executable's ancestor directories are searched for one.
fn resolve_asset_root() -> Option<PathBuf> {
    if let Ok(value) = env::var(ROOT_ENV_VAR) {
        let candidate = PathBuf::from(value).join("assets");
        if candidate.is_dir() {
            return Some(candidate);
        }
        warn!(
            env_var = ROOT_ENV_VAR,
            path = %candidate.display(),
            "configured root has no assets directory, falling back to search"
        );
    }

    let exe = env::current_exe().ok()?;
    exe.ancestors().find_map(|dir| {
        let candidate = dir.join("assets");
        candidate.is_dir().then_some(candidate)
    })
}
