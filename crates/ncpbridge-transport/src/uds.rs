use std::io::ErrorKind;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::StreamLink;

/// Unix domain socket standing in for a UART between host and NCP processes.
///
/// Accepted and connected streams are switched to non-blocking mode and
/// wrapped in a [`StreamLink`], so they plug straight into the bridge's
/// polling task. The socket file is removed on drop if it is still the one
/// this listener created.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    created_inode: Option<(u64, u64)>,
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// `sockaddr_un.sun_path` is 108 bytes on Linux, 104 elsewhere.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen on a filesystem-path Unix domain socket.
    ///
    /// A stale socket file at `path` is removed first; any other kind of
    /// file is left alone and binding fails.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len: path_bytes,
                max: Self::MAX_PATH_LEN,
            });
        }

        let bind_err = |source: std::io::Error| TransportError::Bind {
            path: path.clone(),
            source,
        };

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;
            if !metadata.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(bind_err)?;
        }

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(
            &path,
            std::fs::Permissions::from_mode(Self::DEFAULT_SOCKET_MODE),
        )
        .map_err(bind_err)?;
        let created = std::fs::symlink_metadata(&path).map_err(bind_err)?;
        let created_inode = Some((created.dev(), created.ino()));

        info!(?path, "listening on unix domain socket");

        Ok(Self {
            listener,
            path,
            created_inode,
        })
    }

    /// Accept the next connection (blocking).
    pub fn accept(&self) -> Result<StreamLink<UnixStream>> {
        self.listener
            .set_nonblocking(false)
            .map_err(TransportError::Accept)?;
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!("accepted connection");
        into_link(stream)
    }

    /// Accept a connection if one is already waiting.
    pub fn try_accept(&self) -> Result<Option<StreamLink<UnixStream>>> {
        self.listener
            .set_nonblocking(true)
            .map_err(TransportError::Accept)?;
        match self.listener.accept() {
            Ok((stream, _addr)) => {
                debug!("accepted connection");
                into_link(stream).map(Some)
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(TransportError::Accept(err)),
        }
    }

    /// Connect to a listening Unix domain socket.
    pub fn connect(path: impl AsRef<Path>) -> Result<StreamLink<UnixStream>> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(?path, "connected to unix domain socket");
        into_link(stream)
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn into_link(stream: UnixStream) -> Result<StreamLink<UnixStream>> {
    stream.set_nonblocking(true)?;
    Ok(StreamLink::new(stream))
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Some((expected_dev, expected_ino)) = self.created_inode else {
            return;
        };
        if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
            if metadata.file_type().is_socket()
                && metadata.dev() == expected_dev
                && metadata.ino() == expected_ino
            {
                debug!(path = ?self.path, "cleaning up socket file");
                let _ = std::fs::remove_file(&self.path);
            } else {
                debug!(path = ?self.path, "socket path identity changed; skipping cleanup");
            }
        }
    }
}
