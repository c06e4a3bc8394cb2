//! Path-safe writer
//!
//! Remote URL paths are untrusted. Before anything is written, the local
//! path derived from a URL is cleaned lexically and must still lie under the
//! output root. The deepest existing ancestor of the target directory is then
//! checked on canonical paths before any directory is created, and again once
//! the parent directories exist, so a symlink inside the output root cannot
//! redirect the write elsewhere.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use url::Url;

/// File name used for URLs whose path ends with `/`
pub const INDEX_FILE: &str = "index.html";

/// Extension used when the content type has none
pub const FALLBACK_EXTENSION: &str = "html";

/// Errors that end a resource in the save phase
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Path \"{}\" is outside of the output directory \"{}\"", path.display(), root.display())]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error("Failed to write \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes resource bodies beneath a single output root
#[derive(Debug, Clone)]
pub struct PathSafeWriter {
    root: PathBuf,
}

impl PathSafeWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Computes the local path for `url` and checks that it stays under the root
    ///
    /// `extension` is the sniffed content type's extension, applied when the
    /// URL's file name has none.
    pub fn local_path(&self, url: &Url, extension: Option<&str>) -> Result<PathBuf, SaveError> {
        let raw = url.path();
        let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
        let candidate = candidate_path(&self.root, &decoded, extension);

        if !is_contained(&self.root, &candidate) {
            return Err(SaveError::PathEscape {
                path: candidate,
                root: self.root.clone(),
            });
        }
        Ok(clean(&candidate))
    }

    /// Writes `body` to the local path of `url`, creating directories as needed
    pub async fn write(
        &self,
        url: &Url,
        extension: Option<&str>,
        body: &[u8],
    ) -> Result<PathBuf, SaveError> {
        let path = self.local_path(url, extension)?;
        let io_error = |path: &Path, source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            let real_root = tokio::fs::canonicalize(&self.root)
                .await
                .map_err(|e| io_error(&self.root, e))?;

            // Nothing may be created through a symlink that leaves the root
            let existing = deepest_existing_ancestor(parent).await;
            ensure_inside(&real_root, existing).await?;

            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
            ensure_inside(&real_root, parent).await?;
        }

        tokio::fs::write(&path, body)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!("Saved {} ({} bytes) to {}", url, body.len(), path.display());
        Ok(path)
    }
}

/// Fails unless `dir` resolves to a location under `real_root`
async fn ensure_inside(real_root: &Path, dir: &Path) -> Result<(), SaveError> {
    let real_dir = tokio::fs::canonicalize(dir)
        .await
        .map_err(|source| SaveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    if !real_dir.starts_with(real_root) {
        return Err(SaveError::PathEscape {
            path: real_dir,
            root: real_root.to_path_buf(),
        });
    }
    Ok(())
}

/// Longest prefix of `dir` that exists on disk
async fn deepest_existing_ancestor(dir: &Path) -> &Path {
    let mut current = dir;
    while tokio::fs::symlink_metadata(current).await.is_err() {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

/// Joins the root with a decoded URL path: `root + directory + file name`
pub(crate) fn candidate_path(root: &Path, url_path: &str, extension: Option<&str>) -> PathBuf {
    let (dir, name) = match url_path.rfind('/') {
        Some(i) => url_path.split_at(i + 1),
        None => ("/", url_path),
    };

    let file_name = if name.is_empty() {
        INDEX_FILE.to_string()
    } else if Path::new(name).extension().is_none() {
        format!("{}.{}", name, extension.unwrap_or(FALLBACK_EXTENSION))
    } else {
        name.to_string()
    };

    let mut candidate = root.as_os_str().to_os_string();
    candidate.push(dir);
    candidate.push(&file_name);
    PathBuf::from(candidate)
}

/// Lexically resolves `.` and `..` without touching the filesystem
///
/// `..` above a root directory stays at the root; leading `..` of a
/// relative path is kept.
pub(crate) fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// True when every component of the cleaned root prefixes the cleaned candidate
pub(crate) fn is_contained(root: &Path, candidate: &Path) -> bool {
    let root = clean(root);
    let candidate = clean(candidate);
    let root_parts: Vec<_> = root.components().collect();
    let candidate_parts: Vec<_> = candidate.components().collect();

    candidate_parts.len() >= root_parts.len()
        && root_parts
            .iter()
            .zip(&candidate_parts)
            .all(|(root_part, part)| root_part == part)
}
