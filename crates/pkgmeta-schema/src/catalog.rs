//! Shared catalog of field definitions.
//!
//! Every field any format uses is declared here exactly once. The per-format
//! sets in [`crate::registry`] pick from this catalog.

use crate::field::{DefaultValue, Field};
use crate::keyed::KeyedListField;
use crate::relationship::RelationshipKind;
use crate::value::ValueType;

/// A relationship list field. Its dialect is that of the owning format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipField {
    pub kind: RelationshipKind,
    pub name: &'static str,
    pub alias: &'static str,
}

impl RelationshipField {
    pub const fn new(kind: RelationshipKind) -> Self {
        Self {
            kind,
            name: kind.as_str(),
            alias: kind.as_str(),
        }
    }

    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = alias;
        self
    }
}

// GOOS values nFPM can translate.
const GOOS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "illumos",
    "ios",
    "js",
    "linux",
    "nacl",
    "netbsd",
    "openbsd",
    "plan9",
    "solaris",
    "windows",
];

// --- common ---------------------------------------------------------------

pub const PACKAGE_NAME: Field = Field::string("package_name", "name").required();
/// GOARCH-style value; unknown values are passed through to the builder as-is.
pub const ARCH: Field = Field::string("arch", "arch").with_default(DefaultValue::Str("amd64"));
pub const PLATFORM: Field = Field::string("platform", "platform")
    .with_choices(GOOS)
    .with_default(DefaultValue::Str("linux"));
pub const DESCRIPTION: Field = Field::string("description", "description");
pub const TAGS: Field = Field::new("tags", "", ValueType::StringList);
/// Addresses of the content entities packaged by this target.
pub const DEPENDENCIES: Field = Field::new("dependencies", "", ValueType::StringList);
pub const HOMEPAGE: Field = Field::string("homepage", "homepage");
pub const LICENSE: Field = Field::string("license", "license");

// --- version --------------------------------------------------------------

pub const VERSION: Field = Field::string("version", "version").required();
pub const VERSION_SCHEMA: Field = Field::string("version_schema", "version_schema")
    .with_choices(&["semver", "none"])
    .with_default(DefaultValue::Str("semver"));
pub const PRERELEASE: Field = Field::string("version_prerelease", "prerelease");
pub const VERSION_METADATA: Field = Field::string("version_metadata", "version_metadata");
pub const RELEASE: Field =
    Field::new("version_release", "release", ValueType::Int).with_default(DefaultValue::Int(1));
pub const EPOCH: Field = Field::new("version_epoch", "epoch", ValueType::Int);

// --- apk ------------------------------------------------------------------

pub const APK_MAINTAINER: Field = Field::string("maintainer", "maintainer");

// --- archlinux ------------------------------------------------------------

pub const ARCHLINUX_PACKAGER: Field = Field::string("packager", "archlinux.packager");
pub const ARCHLINUX_PKGBASE: Field = Field::string("pkgbase", "archlinux.pkgbase");

// --- deb ------------------------------------------------------------------

pub const DEB_MAINTAINER: Field = Field::string("maintainer", "maintainer").required();
pub const DEB_SECTION: Field = Field::string("section", "section");
pub const DEB_PRIORITY: Field = Field::string("priority", "priority")
    .with_choices(&["required", "important", "standard", "optional", "extra"])
    .with_default(DefaultValue::Str("optional"));
/// Extra control-file fields; empty values are ignored.
pub const DEB_FIELDS: Field =
    Field::new("fields", "deb.fields", ValueType::StringMap).ignoring_empty();
pub const DEB_COMPRESSION: Field = Field::string("compression", "deb.compression")
    .with_choices(&["gzip", "xz", "zstd", "none"])
    .with_default(DefaultValue::Str("gzip"));
pub const DEB_BREAKS: RelationshipField =
    RelationshipField::new(RelationshipKind::Breaks).with_alias("deb.breaks");

pub const DEB_TRIGGERS: KeyedListField = KeyedListField {
    name: "triggers",
    alias: "deb.triggers",
    keys: &[
        "interest",
        "interest_await",
        "interest_noawait",
        "activate",
        "activate_await",
        "activate_noawait",
    ],
};

// --- rpm ------------------------------------------------------------------

pub const RPM_PACKAGER: Field = Field::string("packager", "rpm.packager");
pub const RPM_VENDOR: Field = Field::string("vendor", "vendor");
pub const RPM_GROUP: Field = Field::string("group", "rpm.group");
pub const RPM_SUMMARY: Field = Field::string("summary", "rpm.summary");
pub const RPM_COMPRESSION: Field = Field::string("compression", "rpm.compression")
    .with_choices(&["gzip", "lzma", "xz", "zstd"])
    .with_default(DefaultValue::Str("gzip"));
/// Files owned by the package but not shipped in it.
pub const RPM_GHOST_CONTENTS: Field = Field::new("ghost_contents", "contents", ValueType::PathList);

// --- relationships --------------------------------------------------------

pub const DEPENDS: RelationshipField = RelationshipField::new(RelationshipKind::Depends);
pub const PROVIDES: RelationshipField = RelationshipField::new(RelationshipKind::Provides);
pub const CONFLICTS: RelationshipField = RelationshipField::new(RelationshipKind::Conflicts);
pub const REPLACES: RelationshipField = RelationshipField::new(RelationshipKind::Replaces);
pub const RECOMMENDS: RelationshipField = RelationshipField::new(RelationshipKind::Recommends);
pub const SUGGESTS: RelationshipField = RelationshipField::new(RelationshipKind::Suggests);

// --- content entities -----------------------------------------------------

pub const CONTENT_SRC: Field = Field::string("src", "src");
pub const CONTENT_DST: Field = Field::string("dst", "dst");
pub const FILE_OWNER: Field =
    Field::string("file_owner", "file_info.owner").with_default(DefaultValue::Str("root"));
pub const FILE_GROUP: Field =
    Field::string("file_group", "file_info.group").with_default(DefaultValue::Str("root"));
pub const FILE_MODE: Field = Field::new("file_mode", "file_info.mode", ValueType::Int);
/// MS-DOS epoch, so builds are reproducible without a source mtime.
pub const FILE_MTIME: Field = Field::string("file_mtime", "file_info.mtime")
    .with_default(DefaultValue::Str("1980-01-01T00:00:00"));
pub const CONTENT_TYPE: Field = Field::string("content_type", "type")
    .with_choices(&["", "config", "config|noreplace", "doc", "license", "readme"])
    .with_default(DefaultValue::Str(""));
