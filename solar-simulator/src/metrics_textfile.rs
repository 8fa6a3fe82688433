//! Prometheus metrics for a batch run, written as a node-exporter textfile
//! when the run finishes.

use std::{fs, io, path::Path};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub fn init() -> Result<(), BuildError> {
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    // Ignore error if the handle was already set; this should only be called once.
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub fn render() -> Option<String> {
    PROM_HANDLE.get().map(PrometheusHandle::render)
}

/// Write the current exposition text to `path`. No-op when `init` was never
/// called.
pub fn write_textfile(path: &Path) -> io::Result<()> {
    match render() {
        Some(body) => write_atomically(path, &body),
        None => Ok(()),
    }
}

/// The collector may read at any time, so write next to the target and rename.
fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solar_simulator.prom");

        write_atomically(&path, "a 1\n").unwrap();
        write_atomically(&path, "b 2\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "b 2\n");
        assert!(!dir.path().join("solar_simulator.prom.tmp").exists());
    }
}
