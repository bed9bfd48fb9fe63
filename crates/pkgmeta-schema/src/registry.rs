//! Per-format field sets.
//!
//! Each format gets one static [`FormatFieldSet`] assembled from
//! [`crate::catalog`]. Membership is closed: a field that is not listed for a
//! format is rejected for that format at assembly time.

use crate::catalog::{
    RelationshipField, APK_MAINTAINER, ARCH, ARCHLINUX_PACKAGER, ARCHLINUX_PKGBASE, CONFLICTS,
    DEB_BREAKS, DEB_COMPRESSION, DEB_FIELDS, DEB_MAINTAINER, DEB_PRIORITY, DEB_SECTION,
    DEB_TRIGGERS, DEPENDENCIES, DEPENDS, DESCRIPTION, EPOCH, HOMEPAGE, LICENSE, PACKAGE_NAME,
    PLATFORM, PRERELEASE, PROVIDES, RECOMMENDS, RELEASE, REPLACES, RPM_COMPRESSION,
    RPM_GHOST_CONTENTS, RPM_GROUP, RPM_PACKAGER, RPM_SUMMARY, RPM_VENDOR, SUGGESTS, TAGS, VERSION,
    VERSION_METADATA, VERSION_SCHEMA,
};
use crate::field::Field;
use crate::keyed::KeyedListField;
use crate::relationship::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    Apk,
    Archlinux,
    Deb,
    Rpm,
}

impl PackageFormat {
    pub const ALL: [PackageFormat; 4] = [
        PackageFormat::Apk,
        PackageFormat::Archlinux,
        PackageFormat::Deb,
        PackageFormat::Rpm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageFormat::Apk => "apk",
            PackageFormat::Archlinux => "archlinux",
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            PackageFormat::Apk => Dialect::Apk,
            PackageFormat::Archlinux => Dialect::Archlinux,
            PackageFormat::Deb => Dialect::Debian,
            PackageFormat::Rpm => Dialect::Rpm,
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown package format '{0}', expected one of apk, archlinux, deb, rpm")]
pub struct UnknownFormat(pub String);

impl FromStr for PackageFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apk" => Ok(PackageFormat::Apk),
            "archlinux" => Ok(PackageFormat::Archlinux),
            "deb" => Ok(PackageFormat::Deb),
            "rpm" => Ok(PackageFormat::Rpm),
            other => Err(UnknownFormat(other.to_owned())),
        }
    }
}

/// The closed, ordered set of fields one format accepts.
#[derive(Debug)]
pub struct FormatFieldSet {
    pub format: PackageFormat,
    pub fields: &'static [Field],
    pub relationships: &'static [RelationshipField],
    pub keyed_list: Option<&'static KeyedListField>,
}

impl FormatFieldSet {
    pub fn dialect(&self) -> Dialect {
        self.format.dialect()
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&'static RelationshipField> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// `true` if `name` is a plain, relationship, or keyed-list field of this format.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
            || self.relationship(name).is_some()
            || self.keyed_list.is_some_and(|k| k.name == name)
    }

    /// Every accepted user-facing name, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .map(|f| f.name)
            .chain(self.relationships.iter().map(|r| r.name))
            .chain(self.keyed_list.map(|k| k.name))
    }
}

static APK_FIELDS: FormatFieldSet = FormatFieldSet {
    format: PackageFormat::Apk,
    fields: &[
        PACKAGE_NAME,
        ARCH,
        DESCRIPTION,
        TAGS,
        DEPENDENCIES,
        // no version_metadata or epoch
        VERSION,
        VERSION_SCHEMA,
        PRERELEASE,
        RELEASE,
        HOMEPAGE,
        LICENSE,
        APK_MAINTAINER,
    ],
    relationships: &[REPLACES, PROVIDES, DEPENDS],
    keyed_list: None,
};

static ARCHLINUX_FIELDS: FormatFieldSet = FormatFieldSet {
    format: PackageFormat::Archlinux,
    fields: &[
        PACKAGE_NAME,
        ARCH,
        DESCRIPTION,
        TAGS,
        DEPENDENCIES,
        // no version_metadata
        VERSION,
        VERSION_SCHEMA,
        PRERELEASE,
        RELEASE,
        EPOCH,
        HOMEPAGE,
        LICENSE,
        ARCHLINUX_PACKAGER,
        ARCHLINUX_PKGBASE,
    ],
    relationships: &[REPLACES, PROVIDES, DEPENDS, CONFLICTS],
    keyed_list: None,
};

static DEB_FIELD_SET: FormatFieldSet = FormatFieldSet {
    format: PackageFormat::Deb,
    fields: &[
        PACKAGE_NAME,
        ARCH,
        PLATFORM,
        DESCRIPTION,
        TAGS,
        DEPENDENCIES,
        VERSION,
        VERSION_SCHEMA,
        PRERELEASE,
        VERSION_METADATA,
        RELEASE,
        EPOCH,
        HOMEPAGE,
        LICENSE,
        DEB_MAINTAINER,
        DEB_SECTION,
        DEB_PRIORITY,
        DEB_FIELDS,
        DEB_COMPRESSION,
    ],
    relationships: &[
        REPLACES, PROVIDES, DEPENDS, RECOMMENDS, SUGGESTS, CONFLICTS, DEB_BREAKS,
    ],
    keyed_list: Some(&DEB_TRIGGERS),
};

static RPM_FIELDS: FormatFieldSet = FormatFieldSet {
    format: PackageFormat::Rpm,
    fields: &[
        PACKAGE_NAME,
        ARCH,
        PLATFORM,
        DESCRIPTION,
        TAGS,
        DEPENDENCIES,
        VERSION,
        VERSION_SCHEMA,
        PRERELEASE,
        VERSION_METADATA,
        RELEASE,
        EPOCH,
        HOMEPAGE,
        LICENSE,
        RPM_PACKAGER,
        RPM_VENDOR,
        RPM_GROUP,
        RPM_SUMMARY,
        RPM_COMPRESSION,
        RPM_GHOST_CONTENTS,
    ],
    relationships: &[REPLACES, PROVIDES, DEPENDS, RECOMMENDS, SUGGESTS, CONFLICTS],
    keyed_list: None,
};

/// Field set for `format`.
pub fn fields_for(format: PackageFormat) -> &'static FormatFieldSet {
    match format {
        PackageFormat::Apk => &APK_FIELDS,
        PackageFormat::Archlinux => &ARCHLINUX_FIELDS,
        PackageFormat::Deb => &DEB_FIELD_SET,
        PackageFormat::Rpm => &RPM_FIELDS,
    }
}
