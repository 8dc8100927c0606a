// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! [`ArtifactSource`] - a fetched volume's contents, transmitted as a
//! gzipped tar stream (§4.4 step 5, §6 "Artifact stream format").
//!
//! Backed by a plain file on disk rather than an in-memory buffer - fetched
//! volumes can be arbitrarily large and the same artifact may be streamed
//! out more than once (`StreamTo` for the build's working directory,
//! `StreamFile` for individual files within it).

use flate2::write::GzEncoder;
use flate2::Compression;
use radar_domain::RadarError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

fn io_err(err: std::io::Error) -> RadarError {
    RadarError::IoError(err.to_string())
}

/// A volume published by a successful fetch (§4.4 step 4). Wraps a gzipped
/// tar archive rooted at the volume's contents.
pub struct ArtifactSource {
    archive_path: PathBuf,
}

impl ArtifactSource {
    /// Builds an artifact source by taring and gzipping everything under
    /// `volume_root` into a fresh temporary file.
    pub fn from_directory(volume_root: &Path) -> Result<Self, RadarError> {
        let file = tempfile::NamedTempFile::new().map_err(io_err)?;
        let (file, path) = file.keep().map_err(|e| RadarError::IoError(e.to_string()))?;
        {
            let encoder = GzEncoder::new(file, Compression::default());
            let mut builder = tar::Builder::new(encoder);
            builder.append_dir_all(".", volume_root).map_err(io_err)?;
            builder.into_inner().map_err(io_err)?.finish().map_err(io_err)?;
        }
        Ok(Self { archive_path: path })
    }

    pub fn from_archive_path(archive_path: PathBuf) -> Self {
        Self { archive_path }
    }

    pub fn into_archive_path(self) -> PathBuf {
        self.archive_path
    }

    /// `StreamTo(dest)` (§4.4 step 5): opens a stream at path `"."` and
    /// pipes the whole archive into `dest`.
    pub async fn stream_to<W: AsyncWrite + Unpin>(&self, dest: &mut W) -> Result<(), RadarError> {
        let mut file = tokio::fs::File::open(&self.archive_path).await.map_err(io_err)?;
        tokio::io::copy(&mut file, dest).await.map_err(io_err)?;
        dest.flush().await.map_err(io_err)?;
        Ok(())
    }

    /// `StreamFile(path)` (§4.4 step 5): decompresses the archive, reads the
    /// first tar entry, and returns its decoded content. An archive with no
    /// entries is a `FileNotFoundError`-equivalent (§4.4), surfaced here as
    /// `RadarError::ResourceNotFound`.
    pub fn stream_file(&self, path: &str) -> Result<Vec<u8>, RadarError> {
        let file = std::fs::File::open(&self.archive_path).map_err(io_err)?;
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);

        let mut entries = archive.entries().map_err(io_err)?;
        let mut entry = entries
            .next()
            .ok_or_else(|| RadarError::ResourceNotFound(format!("empty archive, no entry for {path}")))?
            .map_err(io_err)?;

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).map_err(io_err)?;
        Ok(contents)
    }
}

/// A streamed get-step input, before it has been fully received, exposed to
/// callers that want to pipe bytes as they arrive rather than buffering the
/// whole archive first.
pub async fn copy_stream<R, W>(mut source: R, mut dest: W) -> Result<u64, RadarError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tokio::io::copy(&mut source, &mut dest).await.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn round_trips_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hi there").unwrap();

        let artifact = ArtifactSource::from_directory(dir.path()).unwrap();
        let mut dest = Vec::new();
        artifact.stream_to(&mut dest).await.unwrap();
        assert!(!dest.is_empty());
    }

    #[test]
    fn stream_file_returns_first_entry_contents() {
        let archive_file = tempfile::NamedTempFile::new().unwrap();
        {
            let encoder = GzEncoder::new(archive_file.reopen().unwrap(), Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(5);
            header.set_cksum();
            builder.append_data(&mut header, "hello.txt", &b"world"[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let artifact = ArtifactSource::from_archive_path(archive_file.path().to_path_buf());
        let contents = artifact.stream_file("hello.txt").unwrap();
        assert_eq!(contents, b"world");
    }

    #[test]
    fn empty_archive_is_file_not_found() {
        let archive_file = tempfile::NamedTempFile::new().unwrap();
        {
            let encoder = GzEncoder::new(archive_file.reopen().unwrap(), Compression::default());
            let builder = tar::Builder::new(encoder);
            builder.into_inner().unwrap().finish().unwrap();
        }
        let artifact = ArtifactSource::from_archive_path(archive_file.path().to_path_buf());
        let err = artifact.stream_file("missing.txt").unwrap_err();
        assert_eq!(err.category(), "resource");
    }

    #[allow(unused_imports)]
    use std::io::Read as _;
    #[test]
    fn write_helper_compiles() {
        let mut buf = Vec::new();
        buf.write_all(b"x").unwrap();
    }
}
