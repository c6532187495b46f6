//! Collection policy resolver
//!
//! Maps (era, field, requested policy) to the representation a field is written with.
//! Each era is one table of per-field rules; supporting a new era means adding a table.

use tx_sanitizer_common::{Collection, CollectionPolicy, Era, FieldId, Representation};

use Representation::{NonEmptyOrderedSet, OrderedSet, Sequence};

/// Shape of a source field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Never present in the source
    Absent,
    /// Present with no entries
    Empty,
    Populated,
}

impl Cardinality {
    pub fn of<T>(collection: Option<&Collection<T>>) -> Self {
        match collection {
            None => Cardinality::Absent,
            Some(c) if c.is_empty() => Cardinality::Empty,
            Some(_) => Cardinality::Populated,
        }
    }
}

/// Encoding rule for one field in one era
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// What the era's CDDL mandates
    pub default: Representation,
    /// What an explicit `Set` request maps to
    pub set: Representation,
    /// Whether the CDDL fixes the type regardless of requested policy
    pub fixed: bool,
}

const fn rule(default: Representation, set: Representation) -> FieldRule {
    FieldRule {
        default,
        set,
        fixed: false,
    }
}

const fn fixed(representation: Representation) -> FieldRule {
    FieldRule {
        default: representation,
        set: representation,
        fixed: true,
    }
}

/// Per-field rules for one era, indexed by `FieldId::index`
#[derive(Debug)]
pub struct EraRules {
    pub era: Era,
    rules: [FieldRule; FieldId::COUNT],
}

impl EraRules {
    pub fn rule(&self, field: FieldId) -> FieldRule {
        self.rules[field.index()]
    }
}

static BABBAGE_RULES: EraRules = EraRules {
    era: Era::Babbage,
    rules: [
        rule(OrderedSet, OrderedSet),         // inputs
        fixed(Sequence),                      // outputs
        rule(Sequence, NonEmptyOrderedSet),   // certificates
        rule(OrderedSet, OrderedSet),         // collateral
        rule(OrderedSet, OrderedSet),         // required_signers
        rule(OrderedSet, OrderedSet),         // reference_inputs
        rule(Sequence, NonEmptyOrderedSet),   // vkey_witnesses
        rule(Sequence, NonEmptyOrderedSet),   // native_scripts
        rule(Sequence, NonEmptyOrderedSet),   // bootstrap_witnesses
        rule(Sequence, NonEmptyOrderedSet),   // plutus_v1_scripts
        rule(Sequence, NonEmptyOrderedSet),   // plutus_v2_scripts
        rule(Sequence, NonEmptyOrderedSet),   // plutus_v3_scripts
        rule(Sequence, NonEmptyOrderedSet),   // plutus_data
        rule(Sequence, NonEmptyOrderedSet),   // redeemers
        rule(OrderedSet, OrderedSet),         // pool_owners
    ],
};

static CONWAY_RULES: EraRules = EraRules {
    era: Era::Conway,
    rules: [
        rule(OrderedSet, OrderedSet),                 // inputs
        fixed(Sequence),                              // outputs
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // certificates
        rule(OrderedSet, OrderedSet),                 // collateral
        rule(OrderedSet, OrderedSet),                 // required_signers
        rule(OrderedSet, OrderedSet),                 // reference_inputs
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // vkey_witnesses
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // native_scripts
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // bootstrap_witnesses
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // plutus_v1_scripts
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // plutus_v2_scripts
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // plutus_v3_scripts
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // plutus_data
        rule(NonEmptyOrderedSet, NonEmptyOrderedSet), // redeemers
        rule(OrderedSet, OrderedSet),                 // pool_owners
    ],
};

pub fn rules_for(era: Era) -> &'static EraRules {
    match era {
        Era::Babbage => &BABBAGE_RULES,
        Era::Conway => &CONWAY_RULES,
    }
}

/// Choose the representation for a field, or `None` when the field must be omitted.
///
/// Absent sources stay absent, and a non-empty set is never produced from an empty source.
pub fn resolve(
    era: Era,
    field: FieldId,
    policy: CollectionPolicy,
    cardinality: Cardinality,
) -> Option<Representation> {
    if cardinality == Cardinality::Absent {
        return None;
    }

    let rule = rules_for(era).rule(field);
    let representation = match policy {
        _ if rule.fixed => rule.default,
        CollectionPolicy::Default => rule.default,
        CollectionPolicy::List => Sequence,
        CollectionPolicy::Set => rule.set,
    };

    if representation == NonEmptyOrderedSet && cardinality == Cardinality::Empty {
        return None;
    }

    Some(representation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const POLICIES: [CollectionPolicy; 3] =
        [CollectionPolicy::Default, CollectionPolicy::List, CollectionPolicy::Set];

    #[test]
    fn tables_are_keyed_by_their_era() {
        for era in Era::ALL {
            assert_eq!(rules_for(era).era, era);
        }
    }

    #[test]
    fn absent_is_absent_everywhere() {
        for era in Era::ALL {
            for field in FieldId::ALL {
                for policy in POLICIES {
                    assert_eq!(resolve(era, field, policy, Cardinality::Absent), None);
                }
            }
        }
    }

    #[test]
    fn outputs_are_always_a_sequence() {
        for era in Era::ALL {
            for policy in POLICIES {
                for cardinality in [Cardinality::Empty, Cardinality::Populated] {
                    assert_eq!(
                        resolve(era, FieldId::Outputs, policy, cardinality),
                        Some(Sequence)
                    );
                }
            }
        }
    }

    #[test]
    fn list_is_a_sequence_for_every_field() {
        for era in Era::ALL {
            for field in FieldId::ALL {
                assert_eq!(
                    resolve(era, field, CollectionPolicy::List, Cardinality::Populated),
                    Some(Sequence)
                );
            }
        }
    }

    #[test]
    fn non_empty_set_is_never_resolved_for_empty_source() {
        for era in Era::ALL {
            for field in FieldId::ALL {
                for policy in POLICIES {
                    assert_ne!(
                        resolve(era, field, policy, Cardinality::Empty),
                        Some(NonEmptyOrderedSet)
                    );
                }
            }
        }
    }

    #[test_case(Era::Babbage, FieldId::Inputs => Some(OrderedSet))]
    #[test_case(Era::Babbage, FieldId::Collateral => Some(OrderedSet))]
    #[test_case(Era::Babbage, FieldId::RequiredSigners => Some(OrderedSet))]
    #[test_case(Era::Babbage, FieldId::ReferenceInputs => Some(OrderedSet))]
    #[test_case(Era::Babbage, FieldId::Certificates => Some(Sequence))]
    #[test_case(Era::Babbage, FieldId::VKeyWitnesses => Some(Sequence))]
    #[test_case(Era::Babbage, FieldId::Redeemers => Some(Sequence))]
    #[test_case(Era::Babbage, FieldId::PoolOwners => Some(OrderedSet))]
    #[test_case(Era::Conway, FieldId::Inputs => Some(OrderedSet))]
    #[test_case(Era::Conway, FieldId::ReferenceInputs => Some(OrderedSet))]
    #[test_case(Era::Conway, FieldId::Certificates => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Conway, FieldId::VKeyWitnesses => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Conway, FieldId::PlutusData => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Conway, FieldId::PoolOwners => Some(OrderedSet))]
    fn default_policy(era: Era, field: FieldId) -> Option<Representation> {
        resolve(era, field, CollectionPolicy::Default, Cardinality::Populated)
    }

    #[test_case(Era::Babbage, FieldId::Certificates => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Babbage, FieldId::NativeScripts => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Babbage, FieldId::Inputs => Some(OrderedSet))]
    #[test_case(Era::Conway, FieldId::Certificates => Some(NonEmptyOrderedSet))]
    #[test_case(Era::Conway, FieldId::PoolOwners => Some(OrderedSet))]
    fn set_policy(era: Era, field: FieldId) -> Option<Representation> {
        resolve(era, field, CollectionPolicy::Set, Cardinality::Populated)
    }

    #[test_case(Era::Babbage, CollectionPolicy::Default => Some(Sequence) ; "babbage keeps empty")]
    #[test_case(Era::Babbage, CollectionPolicy::List => Some(Sequence))]
    #[test_case(Era::Babbage, CollectionPolicy::Set => None)]
    #[test_case(Era::Conway, CollectionPolicy::Default => None ; "conway drops empty")]
    #[test_case(Era::Conway, CollectionPolicy::List => Some(Sequence))]
    #[test_case(Era::Conway, CollectionPolicy::Set => None)]
    fn empty_certificates(era: Era, policy: CollectionPolicy) -> Option<Representation> {
        resolve(era, FieldId::Certificates, policy, Cardinality::Empty)
    }

    #[test]
    fn empty_inputs_stay_an_empty_set() {
        assert_eq!(
            resolve(Era::Conway, FieldId::Inputs, CollectionPolicy::Default, Cardinality::Empty),
            Some(OrderedSet)
        );
    }

    #[test]
    fn cardinality_of() {
        assert_eq!(Cardinality::of::<u8>(None), Cardinality::Absent);
        assert_eq!(Cardinality::of(Some(&Collection::<u8>::sequence(vec![]))), Cardinality::Empty);
        assert_eq!(Cardinality::of(Some(&Collection::sequence(vec![1]))), Cardinality::Populated);
    }
}
