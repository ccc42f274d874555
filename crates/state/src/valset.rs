//! Validator set table.
//!
//! This is the "mapping from validator identity to voting power" that every
//! other structure in the protocol is ultimately a schedule of.  It's kept as
//! a sorted vec so that the borsh encoding is canonical and two nodes that
//! computed the same set byte-compare equal.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use azurite_primitives::buf::Buf32;

/// Identity a validator signs consensus messages under.
pub type ValidatorId = Buf32;

/// Stake weight of a validator.
pub type VotingPower = u64;

/// Entry for a single validator.  Zero-power entries are never stored, a
/// validator with no power is simply absent from the table.
#[derive(
    Clone, Debug, Eq, PartialEq, Hash, BorshDeserialize, BorshSerialize, Serialize, Deserialize,
)]
pub struct ValidatorEntry {
    /// Identity the validator is keyed by.
    id: ValidatorId,

    /// Voting power, always nonzero.
    power: VotingPower,
}

impl ValidatorEntry {
    pub fn new(id: ValidatorId, power: VotingPower) -> Self {
        Self { id, power }
    }

    pub fn id(&self) -> &ValidatorId {
        &self.id
    }

    pub fn power(&self) -> VotingPower {
        self.power
    }
}

impl<'a> Arbitrary<'a> for ValidatorEntry {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let id = ValidatorId::arbitrary(u)?;
        // Powers of 0 aren't representable in a table.
        let power = u64::arbitrary(u)?.max(1);
        Ok(Self { id, power })
    }
}

/// The validator set at some instant.
///
/// MUST be sorted by id with unique ids and nonzero powers.  All the mutators
/// here preserve that, so the only way to violate it is deserializing
/// something corrupt, which [`ValidatorSet::sanity_check`] catches.
#[derive(Clone, Debug, Eq, PartialEq, BorshDeserialize, BorshSerialize, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<ValidatorEntry>,
}

impl ValidatorSet {
    pub fn new_empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Builds a set from entries, sorting them by id.  Later entries for the
    /// same id overwrite earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ValidatorEntry>) -> Self {
        let mut set = Self::new_empty();
        for e in entries {
            set.set_power(*e.id(), e.power());
        }
        set
    }

    /// Checks the table for sensibility, panicking if it's malformed.
    pub fn sanity_check(&self) {
        if !self.validators.is_sorted_by_key(|e| e.id) {
            panic!("valset: validators list not sorted");
        }

        if self.validators.windows(2).any(|w| w[0].id == w[1].id) {
            panic!("valset: duplicate validator id");
        }

        if self.validators.iter().any(|e| e.power == 0) {
            panic!("valset: zero-power entry");
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn entries(&self) -> &[ValidatorEntry] {
        &self.validators
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &ValidatorId) -> Option<&ValidatorEntry> {
        self.validators
            .binary_search_by_key(id, |e| e.id)
            .ok()
            .map(|pos| &self.validators[pos])
    }

    /// Returns a validator's power, or 0 if absent.  Zero power and absence
    /// are the same thing.
    pub fn power_of(&self, id: &ValidatorId) -> VotingPower {
        self.get(id).map(|e| e.power).unwrap_or(0)
    }

    pub fn is_member(&self, id: &ValidatorId) -> bool {
        self.get(id).is_some()
    }

    /// Sum of all voting power, used for quorum weight computations.
    pub fn total_power(&self) -> u64 {
        self.validators.iter().map(|e| e.power).sum()
    }

    /// Overwrites a validator's power.  Setting 0 removes the entry.
    pub fn set_power(&mut self, id: ValidatorId, power: VotingPower) {
        match self.validators.binary_search_by_key(&id, |e| e.id) {
            Ok(pos) => {
                if power == 0 {
                    self.validators.remove(pos);
                } else {
                    self.validators[pos].power = power;
                }
            }
            Err(pos) => {
                if power != 0 {
                    self.validators.insert(pos, ValidatorEntry::new(id, power));
                }
            }
        }
    }

    /// Removes a validator outright.  Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &ValidatorId) {
        self.set_power(*id, 0);
    }
}

impl<'a> Arbitrary<'a> for ValidatorSet {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let entries = Vec::<ValidatorEntry>::arbitrary(u)?;
        Ok(Self::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(b: u8) -> ValidatorId {
        Buf32::from([b; 32])
    }

    #[test]
    fn test_set_power_keeps_sorted() {
        let mut set = ValidatorSet::new_empty();
        set.set_power(vid(5), 50);
        set.set_power(vid(1), 10);
        set.set_power(vid(3), 30);
        set.sanity_check();
        assert_eq!(set.len(), 3);
        assert_eq!(set.power_of(&vid(3)), 30);
        assert_eq!(set.total_power(), 90);
    }

    #[test]
    fn test_zero_power_means_absent() {
        let mut set = ValidatorSet::new_empty();
        set.set_power(vid(1), 10);
        set.set_power(vid(1), 0);
        assert!(!set.is_member(&vid(1)));
        assert_eq!(set.power_of(&vid(1)), 0);
        assert!(set.is_empty());

        // Inserting at zero power shouldn't create an entry either.
        set.set_power(vid(2), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_overwrite_power() {
        let mut set = ValidatorSet::new_empty();
        set.set_power(vid(1), 10);
        set.set_power(vid(1), 25);
        assert_eq!(set.len(), 1);
        assert_eq!(set.power_of(&vid(1)), 25);
    }

    #[test]
    fn test_from_entries_last_write_wins() {
        let set = ValidatorSet::from_entries([
            ValidatorEntry::new(vid(1), 10),
            ValidatorEntry::new(vid(2), 20),
            ValidatorEntry::new(vid(1), 15),
        ]);
        set.sanity_check();
        assert_eq!(set.len(), 2);
        assert_eq!(set.power_of(&vid(1)), 15);
    }

    #[test]
    fn test_canonical_encoding() {
        let a = ValidatorSet::from_entries([
            ValidatorEntry::new(vid(2), 20),
            ValidatorEntry::new(vid(1), 10),
        ]);
        let b = ValidatorSet::from_entries([
            ValidatorEntry::new(vid(1), 10),
            ValidatorEntry::new(vid(2), 20),
        ]);
        let enc_a = borsh::to_vec(&a).expect("test: borsh");
        let enc_b = borsh::to_vec(&b).expect("test: borsh");
        assert_eq!(enc_a, enc_b);
    }
}
