use crate::contents::ContentError;
use crate::descriptor::DescriptorError;
use crate::field::FieldError;
use crate::keyed::KeyedListError;
use crate::relationship::RelationshipError;
use thiserror::Error;

/// One failure found while assembling a descriptor or expanding contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("field '{field}': {error}")]
    Relationship {
        field: String,
        #[source]
        error: RelationshipError,
    },
    #[error(transparent)]
    KeyedList(#[from] KeyedListError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("contents[{index}]: {error}")]
    Content {
        index: usize,
        #[source]
        error: ContentError,
    },
}

/// Every failure of one assembly or expansion call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", render_lines(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<ValidationError>) {
        self.0.push(error.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }

    /// `Err(self)` if anything was collected, otherwise `Ok(value)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn render_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
