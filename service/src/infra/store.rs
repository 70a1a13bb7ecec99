//! In-memory [`Store`] of [`Contract`] records.

use derive_more::{From, Into};

use crate::{
    domain::{contract, Contract},
    read::Snapshot,
};

/// In-memory flat collection of [`Contract`] records, root ones and
/// amendments alike, in insertion order.
///
/// Derived data is never stored here: every [`Snapshot`] is built over the
/// current records.
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct Store {
    /// [`Contract`] records of this [`Store`].
    contracts: Vec<Contract>,
}

impl Store {
    /// Creates a new [`Store`] out of the provided [`Contract`] records.
    #[must_use]
    pub fn new(contracts: Vec<Contract>) -> Self {
        Self { contracts }
    }

    /// Returns all the [`Contract`] records of this [`Store`].
    #[must_use]
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    /// Takes a read-only [`Snapshot`] of this [`Store`].
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.contracts)
    }

    /// Returns the [`Contract`] record with the provided ID.
    #[must_use]
    pub fn get(&self, id: &contract::Id) -> Option<&Contract> {
        self.contracts.iter().find(|c| &c.id == id)
    }

    /// Returns the [`Contract`] record with the provided ID for
    /// modification.
    pub(crate) fn get_mut(&mut self, id: &contract::Id) -> Option<&mut Contract> {
        self.contracts.iter_mut().find(|c| &c.id == id)
    }

    /// Appends the provided [`Contract`] record to this [`Store`].
    pub(crate) fn push(&mut self, contract: Contract) {
        self.contracts.push(contract);
    }
}
