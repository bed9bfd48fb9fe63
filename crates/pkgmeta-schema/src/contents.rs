//! Content generators: one declaration, many entities.
//!
//! A [`ContentDeclaration`] lists files, directories, or symlinks. Expansion
//! turns spec *i* into entity *i*. Copied fields (description, tags) are
//! broadcast to every entity; moved fields (paths, owner, group, mode, mtime,
//! content type) come from each spec and are never shared.

use crate::catalog::{CONTENT_SRC, CONTENT_TYPE, FILE_GROUP, FILE_MODE, FILE_MTIME, FILE_OWNER};
use crate::error::{ValidationError, ValidationErrors};
use crate::field::{Field, FieldError};
use crate::types::Address;
use crate::value::Value;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

const MAX_MODE: u32 = 0o7777;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("field '{field}' is not valid for {kind} content")]
    InvalidFieldForKind {
        field: &'static str,
        kind: ContentKind,
    },
    #[error("{kind} content is missing a destination path")]
    MissingDestination { kind: ContentKind },
    #[error("destination '{dst}' must be an absolute path")]
    RelativeDestination { dst: String },
    #[error("file '{dst}' is missing its source path (src)")]
    MissingSource { dst: String },
    #[error("destination '{dst}' is already used by another entry")]
    DuplicateDestination { dst: String },
    #[error("symlink '{dst}' is missing its target path (src)")]
    MissingSymlinkTarget { dst: String },
    #[error("mode {mode:#o} is out of range (max 0o7777)")]
    InvalidMode { mode: u32 },
    #[error("mtime '{value}' is not an RFC 3339 timestamp")]
    InvalidMtime { value: String },
    #[error(transparent)]
    Field(#[from] FieldError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Directory,
    Symlink,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::File => "file",
            ContentKind::Directory => "directory",
            ContentKind::Symlink => "symlink",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entity (moved) values for one generated entity.
///
/// For symlinks `src` is the link target and `dst` the link itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentSpec {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub dst: Option<String>,
    #[serde(default)]
    pub file_owner: Option<String>,
    #[serde(default)]
    pub file_group: Option<String>,
    #[serde(default)]
    pub file_mode: Option<u32>,
    #[serde(default)]
    pub file_mtime: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ContentSpec {
    pub fn file(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            dst: Some(dst.into()),
            ..Self::default()
        }
    }

    pub fn dir(dst: impl Into<String>) -> Self {
        Self {
            dst: Some(dst.into()),
            ..Self::default()
        }
    }

    pub fn symlink(target: impl Into<String>, link: impl Into<String>) -> Self {
        Self::file(target, link)
    }

    #[must_use]
    pub fn with_owner(mut self, owner: &str, group: &str) -> Self {
        self.file_owner = Some(owner.to_owned());
        self.file_group = Some(group.to_owned());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.file_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_mtime(mut self, mtime: &str) -> Self {
        self.file_mtime = Some(mtime.to_owned());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_owned());
        self
    }
}

/// Generic fields duplicated onto every generated entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopiedFields {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDeclaration {
    pub address: Address,
    pub kind: ContentKind,
    pub specs: Vec<ContentSpec>,
    pub copied: CopiedFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub owner: String,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    pub mtime: String,
}

/// One generated file, directory, or symlink. Immutable once expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    address: Address,
    kind: ContentKind,
    src: Option<String>,
    dst: String,
    file_info: FileInfo,
    content_type: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

impl ContentEntity {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    /// Only files carry a content type.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl ContentDeclaration {
    pub fn new(address: Address, kind: ContentKind, specs: Vec<ContentSpec>) -> Self {
        Self {
            address,
            kind,
            specs,
            copied: CopiedFields::default(),
        }
    }

    #[must_use]
    pub fn with_copied(mut self, copied: CopiedFields) -> Self {
        self.copied = copied;
        self
    }

    /// Materialize one entity per spec, in order, or every problem found.
    pub fn expand(&self) -> Result<Vec<ContentEntity>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut entities = Vec::with_capacity(self.specs.len());
        let mut seen = BTreeSet::new();

        for (index, spec) in self.specs.iter().enumerate() {
            let duplicate = spec
                .dst
                .as_deref()
                .filter(|dst| !dst.is_empty())
                .filter(|dst| !seen.insert(*dst));
            if let Some(dst) = duplicate {
                errors.push(ValidationError::Content {
                    index,
                    error: ContentError::DuplicateDestination {
                        dst: dst.to_owned(),
                    },
                });
            }
            match self.expand_one(spec) {
                Ok(entity) => entities.push(entity),
                Err(found) => {
                    for error in found {
                        errors.push(ValidationError::Content { index, error });
                    }
                }
            }
        }

        let entities = errors.into_result(entities)?;
        debug!(
            "expanded {} into {} {} entities",
            self.address,
            entities.len(),
            self.kind
        );
        Ok(entities)
    }

    fn expand_one(&self, spec: &ContentSpec) -> Result<ContentEntity, Vec<ContentError>> {
        let kind = self.kind;
        let mut errors = Vec::new();

        match kind {
            ContentKind::File => {}
            ContentKind::Directory => {
                if spec.src.is_some() {
                    errors.push(ContentError::InvalidFieldForKind {
                        field: CONTENT_SRC.name,
                        kind,
                    });
                }
                if spec.content_type.is_some() {
                    errors.push(ContentError::InvalidFieldForKind {
                        field: CONTENT_TYPE.name,
                        kind,
                    });
                }
            }
            ContentKind::Symlink => {
                if spec.file_mode.is_some() {
                    errors.push(ContentError::InvalidFieldForKind {
                        field: FILE_MODE.name,
                        kind,
                    });
                }
                if spec.content_type.is_some() {
                    errors.push(ContentError::InvalidFieldForKind {
                        field: CONTENT_TYPE.name,
                        kind,
                    });
                }
            }
        }

        let dst = match spec.dst.as_deref() {
            None | Some("") => {
                errors.push(ContentError::MissingDestination { kind });
                String::new()
            }
            Some(dst) => {
                if !dst.starts_with('/') {
                    errors.push(ContentError::RelativeDestination {
                        dst: dst.to_owned(),
                    });
                }
                dst.to_owned()
            }
        };

        if spec.src.as_deref().map_or(true, str::is_empty) {
            match kind {
                ContentKind::File => {
                    errors.push(ContentError::MissingSource { dst: dst.clone() });
                }
                ContentKind::Symlink => {
                    errors.push(ContentError::MissingSymlinkTarget { dst: dst.clone() });
                }
                ContentKind::Directory => {}
            }
        }

        let mode = match (kind, spec.file_mode) {
            (ContentKind::Symlink, _) | (_, None) => None,
            (_, Some(mode)) if mode > MAX_MODE => {
                errors.push(ContentError::InvalidMode { mode });
                None
            }
            (_, Some(mode)) => Some(mode),
        };

        let owner = moved_string(&FILE_OWNER, spec.file_owner.as_ref(), &mut errors);
        let group = moved_string(&FILE_GROUP, spec.file_group.as_ref(), &mut errors);
        let mtime = moved_string(&FILE_MTIME, spec.file_mtime.as_ref(), &mut errors);
        if !mtime.is_empty() && !is_timestamp(&mtime) {
            errors.push(ContentError::InvalidMtime {
                value: mtime.clone(),
            });
        }
        let content_type = (kind == ContentKind::File)
            .then(|| moved_string(&CONTENT_TYPE, spec.content_type.as_ref(), &mut errors));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContentEntity {
            address: self.address.generated(&dst),
            kind,
            src: spec.src.clone(),
            dst,
            file_info: FileInfo {
                owner,
                group,
                mode,
                mtime,
            },
            content_type,
            description: self.copied.description.clone(),
            tags: self.copied.tags.clone(),
        })
    }
}

fn moved_string(field: &Field, raw: Option<&String>, errors: &mut Vec<ContentError>) -> String {
    let raw = raw.map(|s| Value::Str(s.clone()));
    match field.validate(raw.as_ref()) {
        Ok(Some(Value::Str(s))) => s,
        Ok(_) => String::new(),
        Err(e) => {
            errors.push(e.into());
            String::new()
        }
    }
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
}
