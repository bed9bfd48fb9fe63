use crate::catalog::{RelationshipField, DEPENDENCIES};
use crate::error::{ValidationError, ValidationErrors};
use crate::field::FieldError;
use crate::registry::{fields_for, PackageFormat};
use crate::relationship::Dialect;
use crate::types::Address;
use crate::value::{RawFields, Value, ValueType};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("field '{field}' is not applicable to {format} packages")]
    FieldNotApplicable {
        field: String,
        format: PackageFormat,
    },
}

/// One validated value of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorValue {
    pub name: &'static str,
    pub alias: &'static str,
    pub value: Value,
}

/// Validated, immutable metadata for one package.
///
/// Only [`PackageDescriptor::assemble`] creates descriptors, and nothing
/// mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    format: PackageFormat,
    address: Address,
    values: Vec<DescriptorValue>,
}

impl PackageDescriptor {
    /// Validate `raw` against the field set of `format`.
    ///
    /// Every problem is collected before returning: fields foreign to the
    /// format, then plain fields, relationship lists, and the keyed list in
    /// declaration order. Assembly is all-or-nothing.
    pub fn assemble(
        format: PackageFormat,
        address: &Address,
        raw: &RawFields,
    ) -> Result<Self, ValidationErrors> {
        let set = fields_for(format);
        let mut errors = ValidationErrors::new();
        let mut values = Vec::new();

        for name in raw.keys() {
            if !set.contains(name) {
                errors.push(DescriptorError::FieldNotApplicable {
                    field: name.clone(),
                    format,
                });
            }
        }

        for field in set.fields {
            match field.validate(raw.get(field.name)) {
                Ok(Some(value)) => values.push(DescriptorValue {
                    name: field.name,
                    alias: field.alias,
                    value,
                }),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        for rel in set.relationships {
            let Some(raw_value) = raw.get(rel.name) else {
                continue;
            };
            if let Some(value) = validate_relationships(set.dialect(), rel, raw_value, &mut errors)
            {
                values.push(DescriptorValue {
                    name: rel.name,
                    alias: rel.alias,
                    value,
                });
            }
        }

        if let Some(keyed) = set.keyed_list {
            if let Some(raw_value) = raw.get(keyed.name) {
                match ValueType::StringListMap.coerce(raw_value) {
                    Some(Value::ListMap(map)) => match keyed.validate(&map, address) {
                        Ok(map) => values.push(DescriptorValue {
                            name: keyed.name,
                            alias: keyed.alias,
                            value: Value::ListMap(map),
                        }),
                        Err(e) => errors.push(e),
                    },
                    _ => errors.push(FieldError::WrongType {
                        field: keyed.name.to_owned(),
                        expected: ValueType::StringListMap,
                        given: raw_value.shape(),
                    }),
                }
            }
        }

        let descriptor = errors.into_result(Self {
            format,
            address: address.clone(),
            values,
        })?;
        debug!(
            "assembled {format} descriptor for {address} ({} values)",
            descriptor.values.len()
        );
        Ok(descriptor)
    }

    pub fn format(&self) -> PackageFormat {
        self.format
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn values(&self) -> &[DescriptorValue] {
        &self.values
    }

    /// Value of the field with user-facing `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.value)
    }

    /// Value of the field the builder knows as `alias`.
    pub fn get_by_alias(&self, alias: &str) -> Option<&Value> {
        if alias.is_empty() {
            return None;
        }
        self.values
            .iter()
            .find(|v| v.alias == alias)
            .map(|v| &v.value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Content entity addresses listed in `dependencies`.
    pub fn dependencies(&self) -> &[String] {
        self.get(DEPENDENCIES.name)
            .and_then(Value::as_list)
            .unwrap_or_default()
    }
}

fn validate_relationships(
    dialect: Dialect,
    rel: &RelationshipField,
    raw: &Value,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    let Some(entries) = raw.as_list() else {
        errors.push(FieldError::WrongType {
            field: rel.name.to_owned(),
            expected: ValueType::StringList,
            given: raw.shape(),
        });
        return None;
    };

    let grammar = dialect.grammar();
    let mut accepted = Vec::with_capacity(entries.len());
    let mut failed = false;
    for entry in entries {
        match grammar.validate(rel.kind, entry) {
            Ok(entry) => accepted.push(entry.into_inner()),
            Err(error) => {
                failed = true;
                errors.push(ValidationError::Relationship {
                    field: rel.name.to_owned(),
                    error,
                });
            }
        }
    }
    (!failed).then_some(Value::List(accepted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn raw(pairs: &[(&str, Value)]) -> RawFields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn addr() -> Address {
        Address::new("src/pkg:demo")
    }

    fn minimal(extra: &[(&str, Value)]) -> RawFields {
        let mut fields = raw(&[
            ("package_name", Value::from("demo")),
            ("version", Value::from("1.2.3")),
        ]);
        fields.extend(raw(extra));
        fields
    }

    #[test]
    fn assembles_minimal_rpm_without_vendor() {
        let d = PackageDescriptor::assemble(PackageFormat::Rpm, &addr(), &minimal(&[])).unwrap();
        assert_eq!(d.get_str("package_name"), Some("demo"));
        assert_eq!(d.get_by_alias("name"), Some(&Value::from("demo")));
        assert_eq!(d.get("vendor"), None);
        assert_eq!(d.get_str("arch"), Some("amd64"));
        assert_eq!(d.get_str("compression"), Some("gzip"));
        assert_eq!(d.get("version_release"), Some(&Value::Int(1)));
    }

    #[test]
    fn deb_requires_maintainer() {
        let errors =
            PackageDescriptor::assemble(PackageFormat::Deb, &addr(), &minimal(&[])).unwrap_err();
        assert_eq!(
            errors.as_slice(),
            &[ValidationError::Field(FieldError::MissingRequired {
                field: "maintainer".into()
            })]
        );
    }

    #[test]
    fn deb_defaults_priority_to_optional() {
        let d = PackageDescriptor::assemble(
            PackageFormat::Deb,
            &addr(),
            &minimal(&[("maintainer", Value::from("Foo Bar <foo@example.com>"))]),
        )
        .unwrap();
        assert_eq!(d.get_str("priority"), Some("optional"));
        assert_eq!(d.get_str("platform"), Some("linux"));
    }

    #[test]
    fn field_outside_format_set_is_rejected() {
        let errors = PackageDescriptor::assemble(
            PackageFormat::Rpm,
            &addr(),
            &minimal(&[("breaks", Value::from(vec!["foo"]))]),
        )
        .unwrap_err();
        assert_eq!(
            errors.as_slice(),
            &[ValidationError::Descriptor(
                DescriptorError::FieldNotApplicable {
                    field: "breaks".into(),
                    format: PackageFormat::Rpm,
                }
            )]
        );
    }

    #[test]
    fn every_format_rejects_foreign_field() {
        for format in PackageFormat::ALL {
            let result = PackageDescriptor::assemble(
                format,
                &addr(),
                &minimal(&[("no_such_field", Value::from("x"))]),
            );
            let errors = result.unwrap_err();
            assert!(errors.iter().any(|e| matches!(
                e,
                ValidationError::Descriptor(DescriptorError::FieldNotApplicable { field, .. })
                    if field == "no_such_field"
            )));
        }
    }

    #[test]
    fn independent_failures_are_all_reported() {
        let errors = PackageDescriptor::assemble(
            PackageFormat::Deb,
            &addr(),
            &minimal(&[
                ("maintainer", Value::from("Foo <foo@example.com>")),
                ("priority", Value::from("urgent")),
                ("depends", Value::from(vec!["git", "bar=1.0", "libc6 (>= 2)", "x | "])),
            ]),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            &errors.as_slice()[0],
            ValidationError::Field(FieldError::InvalidChoice { given, .. }) if given == "urgent"
        ));
        assert!(errors.iter().skip(1).all(|e| matches!(
            e,
            ValidationError::Relationship { field, .. } if field == "depends"
        )));
    }

    #[test]
    fn relationship_entries_are_stored_verbatim_in_order() {
        let depends = vec!["git", "default-mta  |  mail-transport-agent", "git"];
        let d = PackageDescriptor::assemble(
            PackageFormat::Deb,
            &addr(),
            &minimal(&[
                ("maintainer", Value::from("Foo <foo@example.com>")),
                ("depends", Value::from(depends.clone())),
            ]),
        )
        .unwrap();
        assert_eq!(d.get("depends"), Some(&Value::from(depends)));
    }

    #[test]
    fn breaks_uses_deb_namespace_alias() {
        let d = PackageDescriptor::assemble(
            PackageFormat::Deb,
            &addr(),
            &minimal(&[
                ("maintainer", Value::from("Foo <foo@example.com>")),
                ("breaks", Value::from(vec!["foo (<< 2.6)"])),
            ]),
        )
        .unwrap();
        assert!(d.get_by_alias("deb.breaks").is_some());
        assert!(d.get_by_alias("breaks").is_none());
    }

    #[test]
    fn triggers_with_unknown_key_report_address() {
        let mut triggers = BTreeMap::new();
        triggers.insert("interest".to_owned(), vec!["a".to_owned()]);
        triggers.insert("bogus".to_owned(), vec!["b".to_owned()]);
        let errors = PackageDescriptor::assemble(
            PackageFormat::Deb,
            &addr(),
            &minimal(&[
                ("maintainer", Value::from("Foo <foo@example.com>")),
                ("triggers", Value::ListMap(triggers)),
            ]),
        )
        .unwrap_err();
        let [ValidationError::KeyedList(crate::keyed::KeyedListError::UnknownKeys {
            offending,
            address,
            ..
        })] = errors.as_slice()
        else {
            panic!("unexpected errors: {errors}");
        };
        assert_eq!(offending, &vec!["bogus".to_owned()]);
        assert_eq!(address, &addr());
    }

    #[test]
    fn relationship_field_with_wrong_shape() {
        let errors = PackageDescriptor::assemble(
            PackageFormat::Apk,
            &addr(),
            &minimal(&[("depends", Value::from("git"))]),
        )
        .unwrap_err();
        assert!(matches!(
            &errors.as_slice()[0],
            ValidationError::Field(FieldError::WrongType { field, .. }) if field == "depends"
        ));
    }

    #[test]
    fn dependencies_are_exposed() {
        let d = PackageDescriptor::assemble(
            PackageFormat::Apk,
            &addr(),
            &minimal(&[("dependencies", Value::from(vec!["src/pkg:files#/etc/a"]))]),
        )
        .unwrap();
        assert_eq!(d.dependencies(), &["src/pkg:files#/etc/a".to_owned()]);
        let bare = PackageDescriptor::assemble(PackageFormat::Apk, &addr(), &minimal(&[])).unwrap();
        assert!(bare.dependencies().is_empty());
    }
}
