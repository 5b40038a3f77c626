// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workspace snapshot archives on the local filesystem

use crate::cbor;
use crate::scenario::WorkspaceSnapshot;
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

// Threshold for gzip compression (1 MiB)
const COMPRESSION_THRESHOLD: usize = 1024 * 1024;

fn archive_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    let sanitized = name.replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "_");
    (
        dir.join(format!("{}.cbor", sanitized)),
        dir.join(format!("{}.cbor.gz", sanitized)),
    )
}

/// Write a snapshot to `<dir>/<name>.cbor`, or `.cbor.gz` when it is large.
///
/// The write is atomic (temporary file + rename) and a stale archive with the
/// other extension is removed.
pub fn archive_snapshot(snapshot: &WorkspaceSnapshot, dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create archive directory {}", dir.display()))?;

    let cbor_data = cbor::try_serialize_snapshot(snapshot).context("Failed to serialize snapshot to CBOR")?;

    let (plain_path, gz_path) = archive_paths(dir, name);
    let (final_data, file_path, stale_path) = if cbor_data.len() >= COMPRESSION_THRESHOLD {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&cbor_data).context("Failed to compress snapshot")?;
        let compressed = encoder.finish().context("Failed to finish compression")?;

        tracing::info!(
            "Compressed snapshot from {} bytes to {} bytes",
            cbor_data.len(),
            compressed.len()
        );
        (compressed, gz_path, plain_path)
    } else {
        (cbor_data, plain_path, gz_path)
    };

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".tmp_{}", file_name));
    {
        let mut file = std::fs::File::create(&tmp_path).context("Failed to create temporary file")?;
        file.write_all(&final_data).context("Failed to write archive data")?;
        file.flush().context("Failed to flush file buffer")?;
    }

    std::fs::rename(&tmp_path, &file_path).context("Failed to rename temporary file")?;
    if stale_path.exists() {
        std::fs::remove_file(&stale_path)
            .with_context(|| format!("Failed to remove stale archive {}", stale_path.display()))?;
    }

    tracing::info!("Snapshot archived to {:?} ({} bytes)", file_path, final_data.len());
    Ok(file_path)
}

/// Locate an existing archive for `name` in `dir`
pub fn find_archive(dir: &Path, name: &str) -> Option<PathBuf> {
    let (plain_path, gz_path) = archive_paths(dir, name);
    [plain_path, gz_path].into_iter().find(|p| p.exists())
}

/// Read a snapshot archive, handling both compressed and uncompressed files
pub fn read_snapshot_archive(path: &Path) -> Result<WorkspaceSnapshot> {
    let mut file = std::fs::File::open(path).context("Failed to open snapshot archive")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).context("Failed to read archive file")?;

    let data = if path.to_string_lossy().ends_with(".gz") {
        let mut decoder = flate2::read::GzDecoder::new(&buffer[..]);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress archive data")?;
        decompressed
    } else {
        buffer
    };

    cbor::try_deserialize_snapshot(&data).context("Failed to parse snapshot archive")
}
