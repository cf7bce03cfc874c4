use env_logger::Env;
use log::info;
use screenshots::configuration::StoreConfig;
use screenshots::error_handling::types::CaptureError;
use screenshots::storage::ArtifactStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// Writes a tiny placeholder instead of grabbing the screen.
fn fake_capture(path: &Path) -> Result<(), CaptureError> {
    fs::write(path, b"\x89PNG\r\n\x1a\n")?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger (RUST_LOG can override; default to info)
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    let out_dir: PathBuf = match env::var("SCREENSHOTS_DEMO_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir()?.join("target").join("screenshots_demo"),
    };
    let config = StoreConfig::new(&out_dir)
        .with_eviction_threshold(6)
        .with_max_name_length(20);
    info!("Using artifact directory {}", out_dir.display());

    let mut store = ArtifactStore::new(&config, Box::new(fake_capture))?;
    store.delete_all_artifacts()?;

    for label in ["home", "login", "login", "cart/checkout", "", "login", "receipt"] {
        let shot = store.create_artifact(label)?;
        info!("Created #{} as {}", shot.number, shot.file_name);
        if let Some(report) = shot.eviction {
            info!(
                "Eviction removed {} file(s), {} remain",
                report.deleted, report.remaining
            );
        }
    }

    let report = store.delete_non_unique_artifacts(false)?;
    info!(
        "Dedup removed {} duplicate(s); left: {:?}",
        report.deleted,
        store.artifact_names()?
    );
    info!(
        "Last identity {}, artifact count {}",
        store.last_artifact_number()?,
        store.artifact_count()?
    );
    Ok(())
}
