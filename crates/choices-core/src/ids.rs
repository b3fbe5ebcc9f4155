//! Identifier allocation.
//!
//! Ids are not drawn from a global counter. Every new entry receives `len + 1`, where `len` is
//! the length of the slice it is being appended to at that moment. Because slices only ever grow
//! (items are soft-deleted, never removed), ids are strictly increasing and unique within a
//! session; after [`Action::ClearAll`](crate::Action::ClearAll) the slices are empty again and the
//! sequence restarts at 1.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the id for the next entry of a slice that currently holds `current_count` entries.
pub fn next_id(current_count: usize) -> u64 {
    current_count as u64 + 1
}

macro_rules! entry_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create an id from its raw value.
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Allocate the id for the next entry of a slice holding `current_count` entries.
            pub fn next(current_count: usize) -> Self {
                Self(next_id(current_count))
            }

            /// The raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entry_id!(
    /// Identifier of an [`Item`](crate::Item).
    ItemId
);
entry_id!(
    /// Identifier of a [`Choice`](crate::Choice).
    ChoiceId
);
entry_id!(
    /// Identifier of a [`Group`](crate::Group).
    GroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_is_one_based() {
        assert_eq!(next_id(0), 1);
        assert_eq!(next_id(1), 2);
        assert_eq!(next_id(41), 42);
    }

    #[test]
    fn test_typed_ids_follow_slice_length() {
        assert_eq!(ItemId::next(0), ItemId(1));
        assert_eq!(ChoiceId::next(9), ChoiceId(10));
        assert_eq!(GroupId::next(2).get(), 3);
        assert_eq!(ItemId::new(7).to_string(), "7");
    }
}
