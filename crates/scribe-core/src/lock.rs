//! Advisory whole-file locks held while reading or rewriting a target.
//!
//! Unix hosts use `flock(2)`: shared for plain reads, exclusive for the
//! re-read/compare/write sequence. Other platforms fall back to the bare
//! handle; the digest re-check still guards against stale writes there.

use std::fs::File;
use std::io;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::fcntl::{Flock, FlockArg};

/// Open file handle holding an advisory lock until dropped.
pub(crate) struct LockedFile {
    #[cfg(unix)]
    inner: Flock<File>,
    #[cfg(not(unix))]
    inner: File,
}

impl LockedFile {
    /// Blocks until an exclusive lock is held.
    pub(crate) fn exclusive(file: File) -> io::Result<Self> {
        #[cfg(unix)]
        {
            lock_retrying(file, FlockArg::LockExclusive)
        }
        #[cfg(not(unix))]
        {
            Ok(Self { inner: file })
        }
    }

    /// Blocks until a shared lock is held.
    pub(crate) fn shared(file: File) -> io::Result<Self> {
        #[cfg(unix)]
        {
            lock_retrying(file, FlockArg::LockShared)
        }
        #[cfg(not(unix))]
        {
            Ok(Self { inner: file })
        }
    }

    pub(crate) fn file(&mut self) -> &mut File {
        &mut self.inner
    }
}

#[cfg(unix)]
fn lock_retrying(mut file: File, mode: FlockArg) -> io::Result<LockedFile> {
    loop {
        match Flock::lock(file, mode) {
            Ok(inner) => return Ok(LockedFile { inner }),
            Err((returned, Errno::EINTR)) => file = returned,
            Err((_, errno)) => return Err(io::Error::from(errno)),
        }
    }
}
