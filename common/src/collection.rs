//! Variable-cardinality fields and their wire representation

use crate::types::Representation;
use serde::Serialize;

/// A collection together with the representation it is (or will be) encoded with.
///
/// Collections built through [`Collection::materialize`] hold the set invariants:
/// set representations carry no duplicates and a `NonEmptyOrderedSet` is never empty.
/// Collections built with [`Collection::decoded`] record the source exactly as found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Collection<T> {
    representation: Representation,
    items: Vec<T>,
}

impl<T> Collection<T> {
    /// Wrap items as they appeared in decoded input
    pub fn decoded(representation: Representation, items: Vec<T>) -> Self {
        Self {
            representation,
            items,
        }
    }

    pub fn sequence(items: Vec<T>) -> Self {
        Self::decoded(Representation::Sequence, items)
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> Collection<T> {
    /// Build a collection in `representation` from `items`.
    ///
    /// Sequences keep every item in order. Sets keep the first occurrence of each
    /// item in order and drop the rest. Returns `None` for an empty non-empty set.
    pub fn materialize(
        representation: Representation,
        items: impl IntoIterator<Item = T>,
    ) -> Option<Self> {
        let items: Vec<T> = match representation {
            Representation::Sequence => items.into_iter().collect(),
            Representation::OrderedSet | Representation::NonEmptyOrderedSet => {
                let mut unique: Vec<T> = Vec::new();
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                unique
            }
        };

        if representation == Representation::NonEmptyOrderedSet && items.is_empty() {
            return None;
        }

        Some(Self {
            representation,
            items,
        })
    }

    /// True if any item appears more than once
    pub fn has_duplicates(&self) -> bool {
        self.items.iter().enumerate().any(|(i, item)| self.items[..i].contains(item))
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_keeps_duplicates_and_order() {
        let c = Collection::materialize(Representation::Sequence, vec![3, 1, 3, 2]).unwrap();
        assert_eq!(c.items(), &[3, 1, 3, 2]);
        assert!(c.has_duplicates());
    }

    #[test]
    fn ordered_set_keeps_first_occurrence() {
        let c = Collection::materialize(Representation::OrderedSet, vec![3, 1, 3, 2, 1]).unwrap();
        assert_eq!(c.items(), &[3, 1, 2]);
        assert!(!c.has_duplicates());
    }

    #[test]
    fn empty_ordered_set_is_allowed() {
        let c = Collection::<u8>::materialize(Representation::OrderedSet, vec![]).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn empty_non_empty_set_is_absent() {
        let empty: Vec<u8> = Vec::new();
        assert!(Collection::materialize(Representation::NonEmptyOrderedSet, empty).is_none());
    }

    #[test]
    fn decoded_keeps_source_as_is() {
        let c = Collection::decoded(Representation::OrderedSet, vec![1, 1]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.representation(), Representation::OrderedSet);
    }
}
