use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where a model file can be fetched from.
#[derive(Clone, Debug)]
pub struct ModelSource {
    pub name: String,
    pub url: String,
}

impl ModelSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Resolve a model file, preferring an explicit path.
///
/// Resolution order:
/// 1. Explicit path (must exist, never downloaded over)
/// 2. User cache directory
/// 3. Bundled directory
/// 4. Download from URL into the cache
pub fn resolve(
    source: &ModelSource,
    explicit: Option<&Path>,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = explicit {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(ModelResolveError::Missing(path.to_path_buf()))
        };
    }

    let cache_dir = model_cache_dir()?;
    if let Some(found) = find_local(&source.name, &cache_dir, bundled_dir) {
        return Ok(found);
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    let cached_path = cache_dir.join(&source.name);
    log::info!("Downloading {} from {}", source.name, source.url);
    download(&source.url, &cached_path, progress)?;
    Ok(cached_path)
}

fn find_local(name: &str, cache_dir: &Path, bundled_dir: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(cache_dir)
        .chain(bundled_dir)
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceCheck/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceCheck/models/` or `~/.cache/FaceCheck/models/`
/// - Windows: `%LOCALAPPDATA%/FaceCheck/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceCheck").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceCheck").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let write_err = |path: &Path, source: std::io::Error| ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(|e| write_err(temp_path, e))?;

    // Stream in chunks so progress reflects the actual transfer.
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| write_err(temp_path, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| write_err(temp_path, e))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| write_err(temp_path, e))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| write_err(dest, e))
}
