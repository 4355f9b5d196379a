//! String locations — the structural position a string occupies in a tree.
//!
//! The location is never written to the stream. It is computed from tree
//! position by [`location_for`], identically on the encode and decode paths,
//! and selects which deduplication bucket a string is matched against.

use crate::value::ValueKind;

/// Structural position of a string within a value tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringLocation {
    /// A stand-alone string with no enclosing container.
    TopLevel,
    ObjectKey,
    MapKey,
    /// An integer index of a sparse array spelled as a property string.
    /// Never produced by this codec (indices travel as varints) but part of
    /// the taxonomy callers may tag strings with.
    SparseArrayKey,
    /// See [`StringLocation::SparseArrayKey`]; the dense-array counterpart.
    DenseArrayKey,
    ObjectValue,
    MapValue,
    SparseArrayItem,
    DenseArrayItem,
    SetItem,
    ErrorMessage,
    ErrorStack,
    /// The pattern of a regular expression.
    Regexp,
    /// No string is expected here. Well-formed trees never place a string at
    /// this location; the decoder rejects any stream that would require one.
    Void,
}

/// Number of distinct locations, for per-location table sizing.
pub(crate) const LOCATION_COUNT: usize = 14;

impl StringLocation {
    /// Dense index, used to address per-location dedup tables.
    pub(crate) fn index(self) -> usize {
        match self {
            StringLocation::TopLevel => 0,
            StringLocation::ObjectKey => 1,
            StringLocation::MapKey => 2,
            StringLocation::SparseArrayKey => 3,
            StringLocation::DenseArrayKey => 4,
            StringLocation::ObjectValue => 5,
            StringLocation::MapValue => 6,
            StringLocation::SparseArrayItem => 7,
            StringLocation::DenseArrayItem => 8,
            StringLocation::SetItem => 9,
            StringLocation::ErrorMessage => 10,
            StringLocation::ErrorStack => 11,
            StringLocation::Regexp => 12,
            StringLocation::Void => 13,
        }
    }

    /// Whether this location is a property-key position.
    pub fn is_key(self) -> bool {
        matches!(
            self,
            StringLocation::ObjectKey
                | StringLocation::MapKey
                | StringLocation::SparseArrayKey
                | StringLocation::DenseArrayKey
        )
    }
}

/// The role a string plays relative to its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringRole {
    /// A property key.
    Key,
    /// The value half of a key/value pair.
    Value,
    /// An element of a sequence.
    Item,
    /// An error's message field.
    Message,
    /// An error's stack field.
    Stack,
    /// A regular expression's pattern field.
    Pattern,
}

/// Maps a parent container kind and a structural role to a location.
///
/// Pure function of structural position; the encoder applies it while
/// walking the tree and the decoder applies it while mirroring the walk, so
/// both sides always agree without any location data on the wire.
/// Combinations that cannot occur in a well-formed tree map to
/// [`StringLocation::Void`].
pub fn location_for(parent: Option<ValueKind>, role: StringRole) -> StringLocation {
    match (parent, role) {
        (None, _) => StringLocation::TopLevel,
        (Some(ValueKind::Object), StringRole::Key) => StringLocation::ObjectKey,
        (Some(ValueKind::Object), StringRole::Value) => StringLocation::ObjectValue,
        (Some(ValueKind::Map), StringRole::Key) => StringLocation::MapKey,
        (Some(ValueKind::Map), StringRole::Value) => StringLocation::MapValue,
        (Some(ValueKind::SparseArray), StringRole::Key) => StringLocation::SparseArrayKey,
        (Some(ValueKind::SparseArray), StringRole::Item) => StringLocation::SparseArrayItem,
        (Some(ValueKind::DenseArray), StringRole::Key) => StringLocation::DenseArrayKey,
        (Some(ValueKind::DenseArray), StringRole::Item) => StringLocation::DenseArrayItem,
        (Some(ValueKind::Set), StringRole::Item) => StringLocation::SetItem,
        (Some(ValueKind::Error), StringRole::Message) => StringLocation::ErrorMessage,
        (Some(ValueKind::Error), StringRole::Stack) => StringLocation::ErrorStack,
        (Some(ValueKind::RegExp), StringRole::Pattern) => StringLocation::Regexp,
        _ => StringLocation::Void,
    }
}
