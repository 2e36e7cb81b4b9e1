//! Test support for the provisioning steps
//!
//! Temporary directory fixtures, in-memory platform archives, and
//! recording doubles for the progress sink, the database backend and the
//! environment. Available to dependent crates through the `test-utils`
//! feature.

pub mod doubles;
pub mod filesystem;

pub use doubles::{DatabaseCall, RecordingDatabase, RecordingProgress, StaticEnvironment};
pub use filesystem::{TempDirFixture, platform_archive};
