//! Field schema, relationship grammars, and descriptor assembly for Linux packages.
//!
//! This crate defines the metadata layer for APK, Archlinux, Debian, and RPM
//! packages: typed fields (`Field`), per-format field sets (`fields_for`),
//! relationship validation in each format's dialect (`RelationshipGrammar`),
//! validated package descriptors (`PackageDescriptor`), content generator
//! expansion (`ContentDeclaration`), and rendering for the package builder
//! (`BuilderConfig`).

pub mod builder;
pub mod catalog;
pub mod contents;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod keyed;
pub mod registry;
pub mod relationship;
pub mod types;
pub mod value;

pub use builder::BuilderConfig;
pub use catalog::RelationshipField;
pub use contents::{
    ContentDeclaration, ContentEntity, ContentError, ContentKind, ContentSpec, CopiedFields,
    FileInfo,
};
pub use descriptor::{DescriptorError, DescriptorValue, PackageDescriptor};
pub use error::{ValidationError, ValidationErrors};
pub use field::{DefaultValue, Field, FieldError};
pub use keyed::{KeyedListError, KeyedListField};
pub use registry::{fields_for, FormatFieldSet, PackageFormat, UnknownFormat};
pub use relationship::{
    ApkGrammar, ArchlinuxGrammar, Clause, DebianGrammar, Dialect, NameKind, Operator,
    RelationshipEntry, RelationshipError, RelationshipGrammar, RelationshipKind, RpmGrammar,
    VersionConstraint, VersionStyle,
};
pub use types::Address;
pub use value::{RawFields, Value, ValueType};
