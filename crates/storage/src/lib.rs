// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! loom-storage: the control plane — atomic filesystem primitives, the
//! run-dir layout, advisory locking, and append-only log writers.

pub mod control_plane;
pub mod fs_lock;
pub mod rundir;
pub mod timeline_writer;

pub use control_plane::ControlPlaneError;
pub use fs_lock::{FsLock, FsLockError};
pub use rundir::RunDir;
pub use timeline_writer::TimelineWriter;
