//! Rendering of descriptors into the package builder's configuration tree.
//!
//! Dotted aliases such as `deb.triggers` become nested maps. Content entities
//! named in the descriptor's `dependencies` become `contents` items, followed
//! by RPM ghost entries. Naming a content target pulls in every entity it
//! generated.

use crate::catalog::{
    CONTENT_DST, CONTENT_SRC, CONTENT_TYPE, DESCRIPTION, FILE_GROUP, FILE_MODE, FILE_MTIME,
    FILE_OWNER,
};
use crate::contents::{ContentEntity, ContentKind};
use crate::descriptor::PackageDescriptor;
use crate::value::Value;
use serde_json::{json, Map, Value as Json};
use std::collections::BTreeSet;
use tracing::warn;

const CONTENTS: &str = "contents";

#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    root: Map<String, Json>,
}

impl BuilderConfig {
    pub fn render(descriptor: &PackageDescriptor, entities: &[ContentEntity]) -> Self {
        let mut root = Map::new();
        root.insert("disable_globbing".to_owned(), Json::Bool(true));

        for value in descriptor.values() {
            if value.alias.is_empty() || value.alias == CONTENTS {
                continue;
            }
            if value.name == DESCRIPTION.name && value.value.as_str() == Some("") {
                continue;
            }
            insert_nested(&mut root, value.alias, to_json(&value.value));
        }

        let mut rendered = BTreeSet::new();
        let mut contents = Vec::new();
        for dep in descriptor.dependencies() {
            let generated = format!("{dep}#");
            let mut matched = false;
            for entity in entities.iter().filter(|e| {
                let address = e.address().as_str();
                address == dep || address.starts_with(&generated)
            }) {
                matched = true;
                if rendered.insert(entity.address().as_str()) {
                    contents.push(content_item(entity));
                }
            }
            if !matched {
                warn!(
                    "{}: dependency '{dep}' is not a known content entity, skipping",
                    descriptor.address()
                );
            }
        }
        if let Some(ghosts) = descriptor.get_by_alias(CONTENTS).and_then(Value::as_list) {
            contents.extend(ghosts.iter().map(|dst| json!({"type": "ghost", "dst": dst})));
        }
        root.insert(CONTENTS.to_owned(), Json::Array(contents));

        Self { root }
    }

    /// Look up a dotted path such as `deb.triggers`.
    pub fn get(&self, path: &str) -> Option<&Json> {
        let mut keys = path.split('.');
        let mut current = self.root.get(keys.next()?)?;
        for key in keys {
            current = current.as_object()?.get(key)?;
        }
        Some(current)
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.root
    }

    pub fn into_json(self) -> Json {
        Json::Object(self.root)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }
}

fn insert_nested(root: &mut Map<String, Json>, alias: &str, value: Json) {
    let mut keys: Vec<&str> = alias.split('.').collect();
    let Some(last) = keys.pop() else {
        return;
    };
    let mut table = root;
    for key in keys {
        let slot = table
            .entry(key.to_owned())
            .or_insert_with(|| Json::Object(Map::new()));
        let Some(next) = slot.as_object_mut() else {
            warn!("builder key '{key}' of '{alias}' is not a table, skipping");
            return;
        };
        table = next;
    }
    table.insert(last.to_owned(), value);
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::Str(s) => Json::String(s.clone()),
        Value::Int(i) => Json::from(*i),
        Value::List(items) => Json::Array(items.iter().cloned().map(Json::String).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
        ),
        Value::ListMap(map) => Json::Object(
            map.iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        Json::Array(v.iter().cloned().map(Json::String).collect()),
                    )
                })
                .collect(),
        ),
    }
}

fn content_item(entity: &ContentEntity) -> Json {
    let mut item = Map::new();
    if let Some(src) = entity.src() {
        insert_nested(&mut item, CONTENT_SRC.alias, Json::from(src));
    }
    insert_nested(&mut item, CONTENT_DST.alias, Json::from(entity.dst()));
    let kind = match entity.kind() {
        ContentKind::Directory => Some("dir"),
        ContentKind::Symlink => Some("symlink"),
        ContentKind::File => entity.content_type().filter(|t| !t.is_empty()),
    };
    if let Some(kind) = kind {
        insert_nested(&mut item, CONTENT_TYPE.alias, Json::from(kind));
    }
    let info = entity.file_info();
    insert_nested(&mut item, FILE_OWNER.alias, Json::from(info.owner.as_str()));
    insert_nested(&mut item, FILE_GROUP.alias, Json::from(info.group.as_str()));
    if let Some(mode) = info.mode {
        insert_nested(&mut item, FILE_MODE.alias, Json::from(mode));
    }
    insert_nested(&mut item, FILE_MTIME.alias, Json::from(info.mtime.as_str()));
    Json::Object(item)
}
