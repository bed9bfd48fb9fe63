//! Properties of the public surface: per-format field sets, dialect-exact
//! relationship acceptance, batch error reporting, and content expansion.

use pkgmeta_schema::{
    fields_for, Address, ContentDeclaration, ContentError, ContentKind, ContentSpec, CopiedFields,
    DescriptorError, Dialect, FieldError, KeyedListError, PackageDescriptor, PackageFormat,
    RawFields, RelationshipKind, ValidationError, Value,
};
use std::collections::BTreeMap;

fn fields(pairs: &[(&str, Value)]) -> RawFields {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

fn base() -> Vec<(&'static str, Value)> {
    vec![
        ("package_name", Value::from("demo")),
        ("version", Value::from("1.0.0")),
        ("maintainer", Value::from("Foo <foo@example.com>")),
    ]
}

#[test]
fn field_outside_set_fails_for_every_format() {
    let foreign = ["triggers", "ghost_contents", "pkgbase", "breaks"];
    for format in PackageFormat::ALL {
        let set = fields_for(format);
        for name in foreign.iter().filter(|n| !set.contains(n)) {
            let mut pairs = base();
            if format != PackageFormat::Deb && format != PackageFormat::Apk {
                pairs.retain(|(k, _)| *k != "maintainer");
            }
            pairs.push((*name, Value::from(vec!["x"])));
            let errors =
                PackageDescriptor::assemble(format, &Address::new("t:pkg"), &fields(&pairs))
                    .unwrap_err();
            assert!(
                errors.iter().any(|e| matches!(
                    e,
                    ValidationError::Descriptor(DescriptorError::FieldNotApplicable {
                        field,
                        format: f,
                    }) if field == name && *f == format
                )),
                "{format} accepted {name}"
            );
        }
    }
}

#[test]
fn suffix_and_parenthesized_versions_split_by_dialect() {
    for dialect in Dialect::ALL {
        let parenthesized = matches!(dialect, Dialect::Debian | Dialect::Rpm);
        assert_eq!(
            dialect
                .validate(RelationshipKind::Provides, "bar (=1.0.0)")
                .is_ok(),
            parenthesized
        );
        assert_eq!(
            dialect.validate(RelationshipKind::Provides, "bar=1.0.0").is_ok(),
            !parenthesized
        );
    }
}

#[test]
fn alternatives_are_debian_only() {
    let raw = "default-mta | mail-transport-agent";
    assert!(Dialect::Debian.validate(RelationshipKind::Depends, raw).is_ok());
    assert!(Dialect::Archlinux
        .validate(RelationshipKind::Depends, raw)
        .is_err());
}

#[test]
fn revalidating_an_entry_returns_it_unchanged() {
    let first = Dialect::Debian
        .validate(RelationshipKind::Depends, "libc6  (>= 2.2.1)")
        .unwrap();
    let second = Dialect::Debian
        .validate(RelationshipKind::Depends, first.as_str())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(second.as_str(), "libc6  (>= 2.2.1)");
}

#[test]
fn unknown_trigger_keys_are_the_only_ones_reported() {
    let mut triggers = BTreeMap::new();
    triggers.insert("interest".to_owned(), vec!["a".to_owned()]);
    triggers.insert("bogus".to_owned(), vec!["b".to_owned()]);
    let mut pairs = base();
    pairs.push(("triggers", Value::ListMap(triggers)));
    let errors = PackageDescriptor::assemble(
        PackageFormat::Deb,
        &Address::new("t:deb"),
        &fields(&pairs),
    )
    .unwrap_err();
    let [ValidationError::KeyedList(KeyedListError::UnknownKeys { offending, .. })] =
        errors.as_slice()
    else {
        panic!("unexpected errors: {errors}");
    };
    assert_eq!(offending, &["bogus".to_owned()]);
}

#[test]
fn three_specs_expand_to_three_entities_with_shared_tags() {
    let declaration = ContentDeclaration::new(
        Address::new("t:files"),
        ContentKind::File,
        vec![
            ContentSpec::file("a", "/usr/share/demo/a"),
            ContentSpec::file("b", "/usr/share/demo/b"),
            ContentSpec::file("c", "/usr/share/demo/c"),
        ],
    )
    .with_copied(CopiedFields {
        description: None,
        tags: vec!["shared".to_owned()],
    });
    let entities = declaration.expand().unwrap();
    assert_eq!(entities.len(), 3);
    let dsts: Vec<_> = entities.iter().map(|e| e.dst()).collect();
    assert_eq!(dsts, ["/usr/share/demo/a", "/usr/share/demo/b", "/usr/share/demo/c"]);
    assert!(entities.iter().all(|e| e.tags() == ["shared".to_owned()]));
}

#[test]
fn symlink_with_mode_is_rejected() {
    let errors = ContentDeclaration::new(
        Address::new("t:links"),
        ContentKind::Symlink,
        vec![ContentSpec::symlink("/opt/demo", "/usr/bin/demo").with_mode(0o755)],
    )
    .expand()
    .unwrap_err();
    assert!(matches!(
        errors.as_slice(),
        [ValidationError::Content {
            index: 0,
            error: ContentError::InvalidFieldForKind {
                kind: ContentKind::Symlink,
                ..
            }
        }]
    ));
}

#[test]
fn missing_maintainer_fails_only_for_deb() {
    let pairs = [
        ("package_name", Value::from("demo")),
        ("version", Value::from("1.0.0")),
    ];
    let errors = PackageDescriptor::assemble(
        PackageFormat::Deb,
        &Address::new("t:deb"),
        &fields(&pairs),
    )
    .unwrap_err();
    assert_eq!(
        errors.as_slice(),
        &[ValidationError::Field(FieldError::MissingRequired {
            field: "maintainer".into()
        })]
    );
    let rpm =
        PackageDescriptor::assemble(PackageFormat::Rpm, &Address::new("t:rpm"), &fields(&pairs))
            .unwrap();
    assert!(rpm.get("vendor").is_none());
}

#[test]
fn two_invalid_fields_yield_two_errors() {
    let mut pairs = base();
    pairs.push(("priority", Value::from("urgent")));
    pairs.push(("compression", Value::from("bzip2")));
    let errors = PackageDescriptor::assemble(
        PackageFormat::Deb,
        &Address::new("t:deb"),
        &fields(&pairs),
    )
    .unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ValidationError::Field(FieldError::InvalidChoice { .. }))));
}
