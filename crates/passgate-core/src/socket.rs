use std::path::{Path, PathBuf};

/// Socket filename published by the vault proxy.
pub const DEFAULT_SOCKET_FILENAME: &str = "org.keepassxc.KeePassXC.BrowserServer";

/// Environment variable overriding the proxy socket path.
pub const SOCKET_ENV: &str = "PASSGATE_SOCK";

/// Resolve the vault proxy socket path: `PASSGATE_SOCK` override, then
/// `$XDG_RUNTIME_DIR`, then `/tmp`.
pub fn socket_path() -> PathBuf {
    if let Ok(p) = std::env::var(SOCKET_ENV) {
        return PathBuf::from(p);
    }

    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        let dir_path = Path::new(&dir);
        // Reject non-absolute or paths with `..` components.
        if dir_path.is_absolute()
            && !dir_path
                .components()
                .any(|c| c == std::path::Component::ParentDir)
        {
            return dir_path.join(DEFAULT_SOCKET_FILENAME);
        }
    }

    PathBuf::from("/tmp").join(DEFAULT_SOCKET_FILENAME)
}

/// Verify that a socket path is safe to connect to before handing it
/// credentials: it must exist, must not be a symlink, and must belong to the
/// current user. Mode is left to the proxy; vault builds differ there.
#[cfg(unix)]
pub fn verify_socket_safety(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::MetadataExt;

    let meta = path.symlink_metadata().map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("cannot stat socket {}: {e}", path.display()),
        )
    })?;

    if meta.file_type().is_symlink() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("socket path is a symlink: {}", path.display()),
        ));
    }

    let my_uid = unsafe { libc::getuid() };
    if meta.uid() != my_uid {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("socket owned by uid {} but expected {}", meta.uid(), my_uid),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Env var cases share one function to avoid parallel test races.
    #[test]
    fn socket_path_resolution_order() {
        // Explicit override wins.
        {
            let _guard = EnvGuard::set(SOCKET_ENV, "/tmp/test-proxy.sock");
            assert_eq!(socket_path(), PathBuf::from("/tmp/test-proxy.sock"));
        }

        // XDG_RUNTIME_DIR is used when absolute.
        {
            let _sock = EnvGuard::remove(SOCKET_ENV);
            let _xdg = EnvGuard::set("XDG_RUNTIME_DIR", "/run/user/1000");
            assert_eq!(
                socket_path(),
                PathBuf::from("/run/user/1000").join(DEFAULT_SOCKET_FILENAME)
            );
        }

        // Relative XDG_RUNTIME_DIR is rejected.
        {
            let _sock = EnvGuard::remove(SOCKET_ENV);
            let _xdg = EnvGuard::set("XDG_RUNTIME_DIR", "relative/path");
            assert_eq!(
                socket_path(),
                PathBuf::from("/tmp").join(DEFAULT_SOCKET_FILENAME)
            );
        }

        // XDG_RUNTIME_DIR with parent traversal is rejected.
        {
            let _sock = EnvGuard::remove(SOCKET_ENV);
            let _xdg = EnvGuard::set("XDG_RUNTIME_DIR", "/run/../etc");
            assert_eq!(
                socket_path(),
                PathBuf::from("/tmp").join(DEFAULT_SOCKET_FILENAME)
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn verify_socket_safety_rejects_symlink() {
        use std::os::unix::fs;
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.sock");
        std::fs::write(&real, b"").unwrap();
        let link = dir.path().join("link.sock");
        fs::symlink(&real, &link).unwrap();

        let result = verify_socket_safety(&link);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("symlink"));
    }

    #[cfg(unix)]
    #[test]
    fn verify_socket_safety_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = verify_socket_safety(&dir.path().join("absent.sock"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn verify_socket_safety_accepts_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.sock");
        std::fs::write(&path, b"").unwrap();
        assert!(verify_socket_safety(&path).is_ok());
    }

    // -- Test helpers --

    /// RAII guard for temporarily setting/unsetting an env var.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: env var tests run within a single function.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: env var tests run within a single function.
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                // SAFETY: env var tests run within a single function.
                Some(v) => unsafe { std::env::set_var(&self.key, v) },
                None => unsafe { std::env::remove_var(&self.key) },
            }
        }
    }
}
