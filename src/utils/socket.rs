//! Unix socket utility functions
//!
//! Provides common operations for listen socket management including
//! stale socket replacement, directory creation, and owner-only binding.

use std::fs;
use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::Path;
use std::sync::Mutex;
use tokio::net::UnixListener;

/// umask applied while binding so the socket is created as 0600
const SOCKET_UMASK: libc::mode_t = 0o177;

/// The process umask is shared by every thread
static UMASK_LOCK: Mutex<()> = Mutex::new(());

/// Error type for socket operations
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("Refusing to replace symlink at {path}: potential security risk")]
    SymlinkDetected { path: String },

    #[error("Refusing to replace {path}: file exists and is not a socket")]
    NotASocket { path: String },

    #[error("Failed to check existing socket at {path}: {source}")]
    MetadataError { path: String, source: io::Error },

    #[error("Failed to remove existing socket at {path}: {source}")]
    RemoveError { path: String, source: io::Error },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirError { path: String, source: io::Error },

    #[error("Failed to bind socket at {path}: {source}")]
    BindError { path: String, source: io::Error },

    #[error("Failed to set permissions on socket at {path}: {source}")]
    PermissionError { path: String, source: io::Error },
}

/// Remove a stale socket left at `path`, if any.
///
/// Uses `symlink_metadata` so a symlink is never followed. Symlinks and
/// anything that is not a socket are refused and left in place.
pub fn remove_existing_socket(path: &Path) -> Result<(), SocketError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            let file_type = metadata.file_type();
            if file_type.is_symlink() {
                return Err(SocketError::SymlinkDetected {
                    path: path.display().to_string(),
                });
            }
            if !file_type.is_socket() {
                return Err(SocketError::NotASocket {
                    path: path.display().to_string(),
                });
            }
            fs::remove_file(path).map_err(|e| SocketError::RemoveError {
                path: path.display().to_string(),
                source: e,
            })?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(SocketError::MetadataError {
                path: path.display().to_string(),
                source: e,
            });
        }
    }
    Ok(())
}

/// Ensure the parent directory of a path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<(), SocketError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| SocketError::CreateDirError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// Set socket permissions to owner read/write only (0600).
pub fn set_socket_permissions(path: &Path) -> Result<(), SocketError> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        SocketError::PermissionError {
            path: path.display().to_string(),
            source: e,
        }
    })
}

/// Prepare a path for socket binding.
///
/// Removes a stale socket (refusing symlinks and regular files) and creates
/// the parent directory if needed.
pub fn prepare_socket_path(path: &Path) -> Result<(), SocketError> {
    remove_existing_socket(path)?;
    ensure_parent_dir(path)?;
    Ok(())
}

/// Bind a listener that only the owner can connect to.
///
/// The socket is created under umask 0177 so it is never reachable by
/// other users, and its mode is set to 0600 once bound.
pub fn bind_owner_only(path: &Path) -> Result<UnixListener, SocketError> {
    let listener = {
        let _guard = UMASK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: umask only swaps the process file mode creation mask
        let previous = unsafe { libc::umask(SOCKET_UMASK) };
        let result = UnixListener::bind(path);
        // SAFETY: restores the mask saved above
        unsafe { libc::umask(previous) };
        result
    }
    .map_err(|e| SocketError::BindError {
        path: path.display().to_string(),
        source: e,
    })?;

    set_socket_permissions(path)?;
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn test_remove_existing_socket_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.sock");
        assert!(remove_existing_socket(&path).is_ok());
    }

    #[test]
    fn test_remove_existing_socket_regular_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sock");
        fs::write(&path, b"test").unwrap();

        let result = remove_existing_socket(&path);
        assert!(matches!(result, Err(SocketError::NotASocket { .. })));
        assert!(path.exists());
    }

    #[test]
    fn test_remove_existing_socket_stale_socket() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sock");
        let listener = std::os::unix::net::UnixListener::bind(&path).unwrap();
        drop(listener);

        assert!(remove_existing_socket(&path).is_ok());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_existing_socket_symlink_rejected() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link.sock");
        fs::write(&target, b"target").unwrap();
        symlink(&target, &link).unwrap();

        let result = remove_existing_socket(&link);
        assert!(matches!(result, Err(SocketError::SymlinkDetected { .. })));
        // Link should still exist (not removed)
        assert!(link.symlink_metadata().is_ok());
    }

    #[test]
    fn test_ensure_parent_dir_creates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new").join("nested").join("test.sock");
        assert!(ensure_parent_dir(&path).is_ok());
        assert!(dir.path().join("new").join("nested").exists());
    }

    #[test]
    fn test_set_socket_permissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.sock");
        fs::write(&path, b"test").unwrap();
        assert!(set_socket_permissions(&path).is_ok());
        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_bind_owner_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.sock");

        let _listener = bind_owner_only(&path).unwrap();
        let metadata = fs::symlink_metadata(&path).unwrap();
        assert!(metadata.file_type().is_socket());
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }
}
