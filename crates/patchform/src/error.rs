//! Error types for patch application, transforms and formatting.

use crate::PatchType;
use patchform_paved::PavedError;
use thiserror::Error;

/// Result type alias for patch engine operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors returned by the patch engine.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PatchError {
    /// A field the patch type depends on is absent.
    #[error("{field} is required by type {patch_type}")]
    RequiredFieldMissing {
        /// The missing field, e.g. `FromFieldPath`.
        field: &'static str,
        /// The type of the offending patch.
        patch_type: PatchType,
    },

    /// The patch type is unknown, or cannot be applied directly.
    #[error("patch type {0} is unsupported")]
    InvalidPatchType(String),

    /// Reading or writing a field path failed.
    #[error(transparent)]
    FieldPath(#[from] PavedError),

    /// A wildcarded destination did not resolve to any concrete path.
    #[error("cannot expand ToFieldPath {path}")]
    ArrayExpansionFailure {
        /// The wildcarded destination path.
        path: String,
        /// The resolver error, if expansion failed rather than came up empty.
        #[source]
        source: Option<PavedError>,
    },

    /// A `PatchSet` patch names a set that was not supplied.
    #[error("cannot find PatchSet by name {0}")]
    UndefinedPatchSet(String),

    /// A patch set contains a `PatchSet` patch.
    #[error("PatchSet {0} may not reference another PatchSet")]
    NestedPatchSet(String),

    /// The combine strategy is unknown or its configuration block is absent.
    #[error("given combine strategy {0} requires configuration")]
    CombineConfigMissing(String),

    /// A combine patch declares no variables.
    #[error("combine patch types require at least one variable")]
    CombineRequiresVariables,

    /// The combine strategy could not render its variables.
    #[error("cannot combine values: {0}")]
    Combine(#[from] FormatError),

    /// A transform step failed.
    #[error("transform at index {index} returned error: {source}")]
    Transform {
        /// Position of the failing transform.
        index: usize,
        /// What went wrong.
        source: TransformError,
    },

    /// A patch in a list failed.
    #[error("patch at index {index}: {source}")]
    AtIndex {
        /// Position of the failing patch.
        index: usize,
        /// What went wrong.
        source: Box<PatchError>,
    },
}

impl PatchError {
    /// Create a required field error.
    #[inline]
    pub fn required_field(field: &'static str, patch_type: PatchType) -> Self {
        PatchError::RequiredFieldMissing { field, patch_type }
    }

    /// Create an array expansion error.
    #[inline]
    pub fn array_expansion(path: impl ToString, source: Option<PavedError>) -> Self {
        PatchError::ArrayExpansionFailure {
            path: path.to_string(),
            source,
        }
    }

    /// Wrap an error with the index of the patch that produced it.
    #[inline]
    pub fn at_index(index: usize, source: PatchError) -> Self {
        PatchError::AtIndex {
            index,
            source: Box::new(source),
        }
    }

    /// Returns true if this error reports a field path that does not exist.
    pub fn is_field_path_not_found(&self) -> bool {
        match self {
            PatchError::FieldPath(err) => err.is_not_found(),
            PatchError::AtIndex { source, .. } => source.is_field_path_not_found(),
            _ => false,
        }
    }
}

/// Errors raised by a single transform step.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TransformError {
    /// The transform block for the declared type is absent, or a parameter
    /// the selected operation needs is unset.
    #[error("{transform} transform requires {parameter}")]
    MissingParameter {
        /// The transform type.
        transform: &'static str,
        /// The missing parameter.
        parameter: &'static str,
    },

    /// No conversion exists between the two types.
    #[error("cannot convert {from} to {to}")]
    ConversionUnsupported {
        /// Type of the input value.
        from: &'static str,
        /// Requested type.
        to: &'static str,
    },

    /// The input could not be converted without loss.
    #[error("cannot convert {input} to {to}")]
    ConversionFailed {
        /// Rendering of the input value.
        input: String,
        /// Requested type.
        to: &'static str,
    },

    /// A numeric operation received a non-numeric input.
    #[error("input is required to be a number for math transforms, got {found}")]
    NotNumeric {
        /// Type of the input value.
        found: &'static str,
    },

    /// The math operation has no operand configured.
    #[error("math transform {operation} requires an operand")]
    MissingOperand {
        /// The math operation.
        operation: &'static str,
    },

    /// Arithmetic left the representable range.
    #[error("math transform {operation} overflowed")]
    Overflow {
        /// The math operation.
        operation: &'static str,
    },

    /// The input has no string representation.
    #[error("input is required to be a string, got {found}")]
    NotAString {
        /// Type of the input value.
        found: &'static str,
    },

    /// The input is not a sequence.
    #[error("input is required to be an array, got {found}")]
    NotAnArray {
        /// Type of the input value.
        found: &'static str,
    },

    /// A map lookup missed and no default is configured.
    #[error("key {key} is not found in map")]
    MapKeyNotFound {
        /// The lookup key.
        key: String,
    },

    /// A match pattern is incomplete or its regular expression is invalid.
    #[error("invalid match pattern at index {index}: {reason}")]
    InvalidPattern {
        /// Position of the pattern.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A regular expression did not match, or lacked the requested group.
    #[error("regexp {pattern:?} had no match for group {group}")]
    RegexpNoMatch {
        /// The regular expression.
        pattern: String,
        /// The requested capture group.
        group: usize,
    },

    /// A regular expression failed to compile.
    #[error("invalid regexp {pattern:?}: {reason}")]
    InvalidRegexp {
        /// The regular expression.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Base64 input could not be decoded to UTF-8 text.
    #[error("cannot decode base64: {reason}")]
    Base64 {
        /// Decoder message.
        reason: String,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {reason}")]
    Json {
        /// Serializer message.
        reason: String,
    },

    /// String formatting failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl TransformError {
    /// Create a missing parameter error.
    #[inline]
    pub fn missing(transform: &'static str, parameter: &'static str) -> Self {
        TransformError::MissingParameter {
            transform,
            parameter,
        }
    }

    /// Create a conversion failure.
    #[inline]
    pub fn conversion_failed(input: impl ToString, to: &'static str) -> Self {
        TransformError::ConversionFailed {
            input: input.to_string(),
            to,
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::Json {
            reason: err.to_string(),
        }
    }
}

/// Errors raised by the positional formatter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The number of verbs does not match the number of values.
    #[error("format {template:?} expects {expected} values, got {found}")]
    Arity {
        /// The format template.
        template: String,
        /// Number of verbs in the template.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// The template ends inside a verb.
    #[error("format {template:?} ends with an incomplete verb")]
    Malformed {
        /// The format template.
        template: String,
    },

    /// The verb is not supported.
    #[error("unsupported format verb %{verb}")]
    UnknownVerb {
        /// The verb character.
        verb: char,
    },

    /// A verb's width or precision is larger than the formatter allows.
    #[error("format {template:?} has {what} {value}, limit is {limit}")]
    TooLarge {
        /// The format template.
        template: String,
        /// `width` or `precision`.
        what: &'static str,
        /// The requested size.
        value: usize,
        /// The largest accepted size.
        limit: usize,
    },

    /// The verb cannot render a value of this type.
    #[error("format verb %{verb} cannot render {found}")]
    BadArgument {
        /// The verb character.
        verb: char,
        /// Type of the value.
        found: &'static str,
    },
}
