use crate::config::Config;
use crate::url::hostname;
use crate::{MirrorError, UrlError};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use url::Url;

/// Returns the directory under which site directories are created
///
/// This is the configured `[output] root`, or the directory holding the
/// running executable.
pub fn resolve_output_root(config: &Config) -> Result<PathBuf, MirrorError> {
    if let Some(root) = &config.output.root {
        return Ok(root.clone());
    }

    let exe = std::env::current_exe().map_err(MirrorError::ExecutableLocation)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        MirrorError::ExecutableLocation(std::io::Error::new(
            ErrorKind::NotFound,
            format!("\"{}\" has no parent directory", exe.display()),
        ))
    })
}

/// Directory a site is mirrored into: the seed's hostname under `root`
///
/// The result is always a direct child of `root`; hosts such as `..` that
/// would name `root` itself or a directory outside it are refused.
pub fn output_dir_for(root: &Path, seed: &Url) -> Result<PathBuf, MirrorError> {
    let host = hostname(seed);
    let dir = root.join(host);
    if host.is_empty() || dir.parent() != Some(root) || dir.file_name() != Some(OsStr::new(host)) {
        return Err(MirrorError::IncorrectUrl(UrlError::InvalidHost(host.to_string())));
    }
    Ok(dir)
}

/// Plain-text run log kept next to the site directory
pub fn run_log_path(root: &Path, seed: &Url) -> PathBuf {
    root.join(format!("{}.log", hostname(seed)))
}

/// Makes sure `path` is an empty directory ready for a new run
///
/// A missing directory is created. An existing one is removed and recreated
/// only when `replace` is set; otherwise [`MirrorError::OutputDirExists`] is
/// returned and nothing on disk is touched.
pub async fn prepare_output_dir(path: &Path, replace: bool) -> Result<(), MirrorError> {
    let io_error = |source| MirrorError::OutputDir {
        path: path.to_path_buf(),
        source,
    };

    match tokio::fs::metadata(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::create_dir_all(path).await.map_err(io_error)?;
        }
        Err(e) => return Err(io_error(e)),
        Ok(meta) if !meta.is_dir() => {
            return Err(MirrorError::OutputDirOccupied {
                path: path.to_path_buf(),
            });
        }
        Ok(_) if !replace => {
            return Err(MirrorError::OutputDirExists {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {
            tracing::info!("Removing existing output directory {}", path.display());
            tokio::fs::remove_dir_all(path).await.map_err(io_error)?;
            tokio::fs::create_dir_all(path).await.map_err(io_error)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed() -> Url {
        Url::parse("http://example.com:8080/start").unwrap()
    }

    #[test]
    fn test_output_dir_uses_host_without_port() {
        let root = Path::new("/srv/mirrors");
        assert_eq!(
            output_dir_for(root, &seed()).unwrap(),
            PathBuf::from("/srv/mirrors/example.com")
        );
        assert_eq!(
            run_log_path(root, &seed()),
            PathBuf::from("/srv/mirrors/example.com.log")
        );
    }

    #[test]
    fn test_dot_hosts_never_leave_root() {
        let root = Path::new("/srv/mirrors");
        for host in ["http://./", "http://../"] {
            let seed = Url::parse(host).unwrap();
            assert!(
                matches!(
                    output_dir_for(root, &seed),
                    Err(MirrorError::IncorrectUrl(UrlError::InvalidHost(_)))
                ),
                "{} should not map to a site directory",
                host
            );
        }
    }

    #[test]
    fn test_configured_root_wins() {
        let mut config = Config::default();
        config.output.root = Some(PathBuf::from("/data"));
        assert_eq!(resolve_output_root(&config).unwrap(), PathBuf::from("/data"));
    }

    #[test]
    fn test_default_root_is_executable_dir() {
        let root = resolve_output_root(&Config::default()).unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(root.as_path()), exe.parent());
    }

    #[tokio::test]
    async fn test_missing_dir_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("example.com");

        prepare_output_dir(&dir, false).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_existing_dir_without_replace() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("example.com");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("keep.txt"), b"keep").unwrap();

        let result = prepare_output_dir(&dir, false).await;
        assert!(matches!(result, Err(MirrorError::OutputDirExists { .. })));
        assert!(dir.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_existing_dir_with_replace_is_emptied() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("example.com");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/old.html"), b"old").unwrap();

        prepare_output_dir(&dir, true).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_file_in_the_way() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("example.com");
        std::fs::write(&dir, b"not a directory").unwrap();

        let result = prepare_output_dir(&dir, true).await;
        assert!(matches!(result, Err(MirrorError::OutputDirOccupied { .. })));
    }
}
