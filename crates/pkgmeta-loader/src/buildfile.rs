use pkgmeta_schema::{
    Address, ContentKind, ContentSpec, PackageFormat, RawFields, UnknownFormat, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const BUILD_FILE_NAME: &str = "PKGMETA.toml";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read build file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse build file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("package '{target}': {source}")]
    UnknownFormat {
        target: String,
        #[source]
        source: UnknownFormat,
    },
    #[error("target name must not be empty")]
    EmptyTargetName,
    #[error("duplicate target address {0}")]
    DuplicateTarget(Address),
    #[error("{}", render_failures(.0))]
    Invalid(Vec<TargetFailure>),
}

/// Every validation error of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub address: Address,
    pub errors: ValidationErrors,
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "invalid target {}:", self.address)?;
        for error in &self.errors {
            writeln!(f, "  - {error}")?;
        }
        Ok(())
    }
}

fn render_failures(failures: &[TargetFailure]) -> String {
    let mut out = format!("{} invalid target(s)\n", failures.len());
    for failure in failures {
        out.push_str(&failure.to_string());
    }
    out
}

/// Which entities a `[[content]]` table generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Files,
    Dirs,
    Symlinks,
}

impl GeneratorKind {
    pub fn content_kind(self) -> ContentKind {
        match self {
            GeneratorKind::Files => ContentKind::File,
            GeneratorKind::Dirs => ContentKind::Directory,
            GeneratorKind::Symlinks => ContentKind::Symlink,
        }
    }
}

/// A `[[package]]` table. Everything besides `name` and `format` is a raw
/// field value validated at evaluation time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PackageTarget {
    pub name: String,
    pub format: String,
    #[serde(flatten)]
    pub fields: RawFields,
}

/// A `[[content]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContentTarget {
    pub name: String,
    pub kind: GeneratorKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entries: Vec<ContentSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawBuildFile {
    #[serde(default, rename = "package")]
    packages: Vec<PackageTarget>,
    #[serde(default, rename = "content")]
    contents: Vec<ContentTarget>,
}

/// A parsed build file and the directory its addresses are relative to.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildFile {
    dir: String,
    packages: Vec<(PackageFormat, PackageTarget)>,
    contents: Vec<ContentTarget>,
}

impl BuildFile {
    pub fn parse_str(dir: &str, input: &str) -> Result<Self, LoadError> {
        let raw: RawBuildFile = toml::from_str(input)?;

        let mut seen = BTreeSet::new();
        let names = raw
            .packages
            .iter()
            .map(|p| p.name.as_str())
            .chain(raw.contents.iter().map(|c| c.name.as_str()));
        for name in names {
            if name.trim().is_empty() {
                return Err(LoadError::EmptyTargetName);
            }
            if !seen.insert(name) {
                return Err(LoadError::DuplicateTarget(target_address(dir, name)));
            }
        }

        let mut packages = Vec::with_capacity(raw.packages.len());
        for package in raw.packages {
            let format = package
                .format
                .parse::<PackageFormat>()
                .map_err(|source| LoadError::UnknownFormat {
                    target: package.name.clone(),
                    source,
                })?;
            packages.push((format, package));
        }

        Ok(Self {
            dir: dir.to_owned(),
            packages,
            contents: raw.contents,
        })
    }

    /// Read `path`. Addresses are relative to its parent directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let dir = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::parse_str(&dir, &content)
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageFormat, &PackageTarget)> {
        self.packages.iter().map(|(format, p)| (*format, p))
    }

    pub fn contents(&self) -> &[ContentTarget] {
        &self.contents
    }

    pub fn address(&self, name: &str) -> Address {
        target_address(&self.dir, name)
    }

    /// Turn `:name` shorthand into a full address in this file's directory.
    pub fn qualify(&self, address: &str) -> String {
        match address.strip_prefix(':') {
            Some(rest) => format!("{}:{rest}", self.dir),
            None => address.to_owned(),
        }
    }
}

fn target_address(dir: &str, name: &str) -> Address {
    Address::new(format!("{dir}:{name}"))
}
