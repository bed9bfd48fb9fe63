use crate::types::Address;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyedListError {
    #[error(
        "each key of the '{field}' field in target {address} must be one of {permitted:?}, but {offending:?} was provided"
    )]
    UnknownKeys {
        field: String,
        offending: Vec<String>,
        address: Address,
        permitted: Vec<String>,
    },
}

/// A map-of-lists field whose keys come from a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedListField {
    pub name: &'static str,
    pub alias: &'static str,
    pub keys: &'static [&'static str],
}

impl KeyedListField {
    /// Check every key of `raw` against the permitted set.
    ///
    /// All foreign keys are reported together. Keys are stored as spelled,
    /// with underscores.
    pub fn validate(
        &self,
        raw: &BTreeMap<String, Vec<String>>,
        address: &Address,
    ) -> Result<BTreeMap<String, Vec<String>>, KeyedListError> {
        let offending: Vec<String> = raw
            .keys()
            .filter(|k| !self.keys.contains(&k.as_str()))
            .cloned()
            .collect();

        if !offending.is_empty() {
            let mut permitted: Vec<String> = self.keys.iter().map(|k| (*k).to_owned()).collect();
            permitted.sort();
            return Err(KeyedListError::UnknownKeys {
                field: self.name.to_owned(),
                offending,
                address: address.clone(),
                permitted,
            });
        }
        Ok(raw.clone())
    }
}
