use serde::{Deserialize, Serialize};

pub type Energy = u32;

/// A worker's or facility's resource store.
///
/// `used` never exceeds `capacity`; every mutator clamps instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStore {
    capacity: Energy,
    used: Energy,
}

impl ResourceStore {
    pub const fn empty(capacity: Energy) -> Self {
        Self { capacity, used: 0 }
    }

    pub fn with_used(capacity: Energy, used: Energy) -> Self {
        Self {
            capacity,
            used: used.min(capacity),
        }
    }

    pub const fn capacity(&self) -> Energy {
        self.capacity
    }

    pub const fn used(&self) -> Energy {
        self.used
    }

    pub const fn free(&self) -> Energy {
        self.capacity - self.used
    }

    pub const fn has_free_capacity(&self) -> bool {
        self.used < self.capacity
    }

    pub const fn has_no_free_capacity(&self) -> bool {
        self.used == self.capacity
    }

    pub const fn has_resources(&self) -> bool {
        self.used > 0
    }

    /// Adds up to `amount`, returning how much was actually stored.
    pub fn deposit(&mut self, amount: Energy) -> Energy {
        let accepted = amount.min(self.free());
        self.used += accepted;
        accepted
    }

    /// Removes up to `amount`, returning how much was actually taken.
    pub fn withdraw(&mut self, amount: Energy) -> Energy {
        let taken = amount.min(self.used);
        self.used -= taken;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_follow_fill_level() {
        let empty = ResourceStore::empty(50);
        assert!(empty.has_free_capacity());
        assert!(!empty.has_no_free_capacity());
        assert!(!empty.has_resources());

        let partial = ResourceStore::with_used(50, 20);
        assert!(partial.has_free_capacity());
        assert!(partial.has_resources());

        let full = ResourceStore::with_used(50, 50);
        assert!(!full.has_free_capacity());
        assert!(full.has_no_free_capacity());
        assert!(full.has_resources());
    }

    #[test]
    fn zero_capacity_store_is_empty_and_full() {
        let store = ResourceStore::empty(0);
        assert!(store.has_no_free_capacity());
        assert!(!store.has_resources());
    }

    #[test]
    fn with_used_clamps_to_capacity() {
        let store = ResourceStore::with_used(10, 25);
        assert_eq!(store.used(), 10);
    }

    #[test]
    fn deposit_and_withdraw_clamp() {
        let mut store = ResourceStore::with_used(10, 7);
        assert_eq!(store.deposit(5), 3);
        assert_eq!(store.used(), 10);
        assert_eq!(store.withdraw(15), 10);
        assert_eq!(store.used(), 0);
    }
}
