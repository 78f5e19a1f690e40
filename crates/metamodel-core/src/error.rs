use crate::{model::registry::MetamodelError, query::resolve::PathResolutionError};
use derive_more::Display;
use metamodel_config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; the facade crate maps it onto its public `Error`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a bootstrap-origin configuration error.
    pub(crate) fn bootstrap_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Bootstrap, message)
    }

    /// Construct a bootstrap-origin invariant violation.
    pub(crate) fn bootstrap_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Bootstrap,
            message,
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<MetamodelError> for InternalError {
    fn from(err: MetamodelError) -> Self {
        match err {
            MetamodelError::UnknownManagedType { .. } => Self::new(
                ErrorClass::NotFound,
                ErrorOrigin::Bootstrap,
                err.to_string(),
            ),
            MetamodelError::InvalidSuperType { .. } => Self::bootstrap_invariant(err.to_string()),
            _ => Self::bootstrap_configuration(err.to_string()),
        }
    }
}

impl From<PathResolutionError> for InternalError {
    fn from(err: PathResolutionError) -> Self {
        let class = match err {
            PathResolutionError::UnknownEntity { .. }
            | PathResolutionError::UnknownPathPart { .. } => ErrorClass::NotFound,
            PathResolutionError::TooDeep { .. } => ErrorClass::Unsupported,
            PathResolutionError::EmptyPath | PathResolutionError::EmptySegment { .. } => {
                ErrorClass::InvariantViolation
            }
        };

        Self::new(class, ErrorOrigin::Path, err.to_string())
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorClass {
    Configuration,
    InvariantViolation,
    NotFound,
    Unsupported,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Bootstrap,
    Config,
    Path,
}

///
/// ErrorTree
/// Aggregated validation messages; empty means valid.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Convert into `Ok(())` when no messages were recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_ok() {
        assert!(ErrorTree::new().result().is_ok());
    }

    #[test]
    fn tree_joins_messages_in_insertion_order() {
        let mut errs = ErrorTree::new();
        err!(errs, "first {}", 1);
        errs.add("second");

        let errs = errs.result().expect_err("tree with messages must fail");
        assert_eq!(errs.to_string(), "first 1; second");
        assert_eq!(errs.messages().len(), 2);
    }

    #[test]
    fn unknown_entity_maps_to_not_found() {
        let err: InternalError = PathResolutionError::UnknownEntity {
            name: "Ghost".to_string(),
        }
        .into();

        assert_eq!(err.class, ErrorClass::NotFound);
        assert_eq!(err.origin, ErrorOrigin::Path);
        assert_eq!(
            err.display_with_class(),
            "Path:NotFound: unknown entity 'Ghost'"
        );
    }

    #[test]
    fn unrecognized_element_type_is_a_configuration_error() {
        let err: InternalError = MetamodelError::UnrecognizedElementType {
            attribute: "Customer.history".to_string(),
            type_name: "Auditable".to_string(),
        }
        .into();

        assert_eq!(err.class, ErrorClass::Configuration);
        assert_eq!(err.origin, ErrorOrigin::Bootstrap);
    }
}
