//! Build-file loading and evaluation for pkgmeta.
//!
//! A build file (`PKGMETA.toml`) declares `[[package]]` targets carrying raw
//! field values and `[[content]]` generator targets. [`BuildFile::evaluate`]
//! expands the generators, assembles one descriptor per package, and renders
//! the builder config, reporting the failures of every target at once.

pub mod buildfile;
pub mod evaluate;

pub use buildfile::{
    BuildFile, ContentTarget, GeneratorKind, LoadError, PackageTarget, TargetFailure,
    BUILD_FILE_NAME,
};
pub use evaluate::{Evaluation, PackageOutput};
