//! Signed network snapshot files.
//!
//! A dump is written as JSON and then renamed to
//! `{stem}_{yymmdd}_{sha256}.json`; the digest in the file name is the
//! signature checked on load.

use crate::error::{CprnError, Result};
use crate::network::{NetworkSnapshot, RoadNetwork};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const BLOCK_SIZE: usize = 4096;

/// Hex SHA-256 digest of a file, read in 4 KiB blocks.
pub fn file_sha256(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| CprnError::storage(format!("Failed to open {}", path.display()), Some(e)))?;
    let mut hasher = Sha256::new();
    let mut block = [0u8; BLOCK_SIZE];
    loop {
        let n = file
            .read(&mut block)
            .map_err(|e| CprnError::storage(format!("Failed to read {}", path.display()), Some(e)))?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Signature embedded in an archive file name: the text after the last
/// `_` up to the first `.`.
pub fn signature_from_path(path: impl AsRef<Path>) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;
    let tail = name.rsplit('_').next()?;
    let signature = tail.split('.').next()?;
    (!signature.is_empty()).then(|| signature.to_string())
}

/// Write `network` to `path`, then rename the file to carry the dump date
/// and its digest. Returns the final path.
pub fn dump_signed(network: &RoadNetwork, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    {
        let file = File::create(path)
            .map_err(|e| CprnError::storage(format!("Failed to create {}", path.display()), Some(e)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &network.to_snapshot())
            .map_err(|e| CprnError::serialization("Failed to serialize network snapshot", Some(e)))?;
        writer
            .flush()
            .map_err(|e| CprnError::storage(format!("Failed to write {}", path.display()), Some(e)))?;
    }

    let digest = file_sha256(path)?;
    let date = chrono::Local::now().format("%y%m%d");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CprnError::invalid_argument(format!("No file name in {}", path.display())))?;
    let signed = path.with_file_name(format!("{stem}_{date}_{digest}.json"));

    fs::rename(path, &signed).map_err(|e| {
        CprnError::storage(
            format!("Failed to rename {} to {}", path.display(), signed.display()),
            Some(e),
        )
    })?;
    info!("Dumped network to {}", signed.display());
    Ok(signed)
}

/// Load a network dumped by [`dump_signed`], verifying the file digest
/// against the signature in its name.
pub fn load_signed(path: impl AsRef<Path>) -> Result<RoadNetwork> {
    let path = path.as_ref();
    let expected = signature_from_path(path).ok_or_else(|| {
        CprnError::invalid_argument(format!("No signature in file name {}", path.display()))
    })?;
    let actual = file_sha256(path)?;
    if actual != expected {
        return Err(CprnError::SignatureMismatch { expected, actual });
    }
    info!("File hash check passed: {actual}");

    let file = File::open(path)
        .map_err(|e| CprnError::storage(format!("Failed to open {}", path.display()), Some(e)))?;
    let snapshot: NetworkSnapshot = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CprnError::serialization("Failed to parse network snapshot", Some(e)))?;
    debug!(
        "Loaded snapshot with {} vertices, {} edges",
        snapshot.vertices.len(),
        snapshot.edges.len()
    );
    RoadNetwork::from_snapshot(snapshot)
}
