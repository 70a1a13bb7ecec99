//! [`Family`] read model definition.

use std::collections::{hash_map::Entry, HashMap};

use tracing as log;

use crate::{
    domain::{
        contract::{self, amendment, Root},
        Amendment, Contract, Payment,
    },
    error::ConfigurationError,
};

/// Read-only view over a flat list of [`Contract`] records with an ownership
/// index of root [`Contract`]s and their [`Amendment`]s.
///
/// The index is built once, so resolving a [`Family`] never rescans the whole
/// list.
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    /// Flat list of [`Contract`] records, in insertion order.
    contracts: &'a [Contract],

    /// Positions of root [`Contract`]s by their IDs.
    roots: HashMap<&'a contract::Id, usize>,

    /// Positions of [`Amendment`]s by IDs of the roots they amend, in
    /// insertion order.
    amendments: HashMap<&'a contract::Id, Vec<usize>>,

    /// Positions of [`Amendment`]s whose parent is not a known root.
    orphans: Vec<usize>,
}

impl<'a> Snapshot<'a> {
    /// Indexes the provided [`Contract`] records.
    ///
    /// Records repeating an already seen root ID are left out of the index.
    #[must_use]
    pub fn new(contracts: &'a [Contract]) -> Self {
        let mut roots = HashMap::new();
        for (pos, c) in contracts.iter().enumerate() {
            if !c.is_root() {
                continue;
            }
            match roots.entry(&c.id) {
                Entry::Vacant(e) => {
                    _ = e.insert(pos);
                }
                Entry::Occupied(_) => {
                    log::warn!("duplicate `Contract(id: {})` is ignored", c.id);
                }
            }
        }

        let mut amendments = HashMap::<_, Vec<_>>::new();
        let mut orphans = Vec::new();
        for (pos, c) in contracts.iter().enumerate() {
            let Some(parent_id) = c.parent_id() else {
                continue;
            };
            if let Some((root_id, _)) = roots.get_key_value(parent_id) {
                amendments.entry(*root_id).or_default().push(pos);
            } else {
                log::warn!(
                    "`Contract(id: {})` references missing parent \
                     `Contract(id: {parent_id})`",
                    c.id,
                );
                orphans.push(pos);
            }
        }

        Self {
            contracts,
            roots,
            amendments,
            orphans,
        }
    }

    /// Returns all the [`Contract`] records of this [`Snapshot`].
    #[must_use]
    pub fn contracts(&self) -> &'a [Contract] {
        self.contracts
    }

    /// Returns the [`Contract`] record with the provided ID.
    #[must_use]
    pub fn contract(&self, id: &contract::Id) -> Option<&'a Contract> {
        self.contracts.iter().find(|c| &c.id == id)
    }

    /// Iterates over the root [`Contract`]s, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &'a Contract> + '_ {
        self.contracts
            .iter()
            .enumerate()
            .filter(|(pos, c)| self.roots.get(&c.id) == Some(pos))
            .map(|(_, c)| c)
    }

    /// Resolves the [`Family`] of the root [`Contract`] with the provided ID.
    ///
    /// [`None`] is returned if there is no root [`Contract`] with such ID.
    #[must_use]
    pub fn family(&self, root_id: &contract::Id) -> Option<Family<'a>> {
        let root = &self.contracts[*self.roots.get(root_id)?];
        let root_data = root.as_root()?;
        let amendments = self
            .amendments
            .get(root_id)
            .into_iter()
            .flatten()
            .filter_map(|&pos| {
                let contract = &self.contracts[pos];
                contract
                    .as_amendment()
                    .map(|amendment| Amended {
                        contract,
                        amendment,
                    })
            })
            .collect();
        Some(Family {
            root,
            root_data,
            amendments,
        })
    }

    /// Resolves the [`Family`] the [`Contract`] with the provided ID belongs
    /// to, whether it's the root or one of the [`Amendment`]s.
    #[must_use]
    pub fn family_of(&self, id: &contract::Id) -> Option<Family<'a>> {
        let contract = self.contract(id)?;
        self.family(contract.parent_id().unwrap_or(&contract.id))
    }

    /// Returns [`ConfigurationError`]s of [`Amendment`]s referencing a
    /// missing parent.
    #[must_use]
    pub fn orphans(&self) -> Vec<ConfigurationError> {
        self.orphans
            .iter()
            .filter_map(|&pos| {
                let c = &self.contracts[pos];
                c.parent_id().map(|parent| {
                    ConfigurationError::ParentNotExists {
                        amendment: c.id.clone(),
                        parent: parent.clone(),
                    }
                })
            })
            .collect()
    }
}

/// Resolves the [`Family`] of the root [`Contract`] with the provided ID out
/// of the flat `contracts` list.
///
/// [`None`] is returned if the ID doesn't point to a root [`Contract`].
#[must_use]
pub fn resolve_family<'a>(
    contracts: &'a [Contract],
    root_id: &contract::Id,
) -> Option<Family<'a>> {
    Snapshot::new(contracts).family(root_id)
}

/// Root [`Contract`] along with all its [`Amendment`]s.
#[derive(Clone, Debug)]
pub struct Family<'a> {
    /// Root [`Contract`] record.
    root: &'a Contract,

    /// [`Root`] data of the [`Family::root`].
    root_data: &'a Root,

    /// [`Amendment`]s of the root, in insertion order.
    amendments: Vec<Amended<'a>>,
}

impl<'a> Family<'a> {
    /// Returns the root [`Contract`] of this [`Family`].
    #[must_use]
    pub fn root(&self) -> &'a Contract {
        self.root
    }

    /// Returns the [`Root`] data of this [`Family`].
    #[must_use]
    pub fn root_data(&self) -> &'a Root {
        self.root_data
    }

    /// Returns the [`Amendment`]s of this [`Family`], in insertion order.
    #[must_use]
    pub fn amendments(&self) -> &[Amended<'a>] {
        &self.amendments
    }

    /// Returns the [`Amendment`] with the provided ID.
    #[must_use]
    pub fn amendment(&self, id: &contract::Id) -> Option<Amended<'a>> {
        self.amendments.iter().find(|a| &a.contract.id == id).copied()
    }

    /// Iterates over the [`Amendment`]s of the provided [`amendment::Kind`],
    /// in insertion order.
    pub fn amendments_of(
        &self,
        kind: amendment::Kind,
    ) -> impl Iterator<Item = Amended<'a>> + '_ {
        self.amendments
            .iter()
            .filter(move |a| a.amendment.kind == kind)
            .copied()
    }

    /// Iterates over every [`Payment`] of this [`Family`] along with the
    /// [`Contract`] record it was registered on.
    ///
    /// Root [`Payment`]s go first, followed by the ones of each
    /// [`Amendment`].
    pub fn payments(
        &self,
    ) -> impl Iterator<Item = (&'a Contract, &'a Payment)> + '_ {
        std::iter::once(self.root)
            .chain(self.amendments.iter().map(|a| a.contract))
            .flat_map(|c| c.payments.iter().map(move |p| (c, p)))
    }
}

/// [`Contract`] record known to be an [`Amendment`].
#[derive(Clone, Copy, Debug)]
pub struct Amended<'a> {
    /// Whole [`Contract`] record.
    pub contract: &'a Contract,

    /// [`Amendment`] data of the [`Amended::contract`].
    pub amendment: &'a Amendment,
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::{
        contract::{self, amendment, Details, Role, Root},
        Amendment, Contract,
    };

    use super::{resolve_family, Snapshot};

    fn root(id: &str) -> Contract {
        Contract {
            id: id.into(),
            contracting_unit: None,
            contractor: None,
            value: Money::ZERO,
            start_date: None,
            end_date: None,
            signature_date: None,
            monthly_estimate: None,
            payments: vec![],
            details: Details::default(),
            role: Role::Root(Root::default()),
        }
    }

    fn amendment(id: &str, parent: &str, kind: amendment::Kind) -> Contract {
        Contract {
            role: Role::Amendment(Amendment {
                parent_id: parent.into(),
                kind,
                number: "1º".to_owned(),
                process_number: String::new(),
                process_link: None,
                justification: String::new(),
                signature_date: common::RawDate::default(),
                manager: None,
                inspectors: None,
            }),
            ..root(id)
        }
    }

    fn ids<'a>(it: impl IntoIterator<Item = &'a Contract>) -> Vec<&'a str> {
        it.into_iter().map(|c| c.id.as_ref()).collect()
    }

    #[test]
    fn resolves_family_in_insertion_order() {
        let contracts = vec![
            amendment("a2", "r1", amendment::Kind::Term),
            root("r1"),
            root("r2"),
            amendment("a1", "r1", amendment::Kind::Value),
            amendment("b1", "r2", amendment::Kind::Other),
        ];

        let family = resolve_family(&contracts, &"r1".into()).unwrap();

        assert_eq!(family.root().id, contract::Id::from("r1"));
        assert_eq!(
            ids(family.amendments().iter().map(|a| a.contract)),
            ["a2", "a1"],
        );
        assert_eq!(
            ids(
                family
                    .amendments_of(amendment::Kind::Term)
                    .map(|a| a.contract)
            ),
            ["a2"],
        );
    }

    #[test]
    fn fails_on_amendment_or_unknown_id() {
        let contracts = vec![
            root("r1"),
            amendment("a1", "r1", amendment::Kind::Value),
        ];

        assert!(resolve_family(&contracts, &"a1".into()).is_none());
        assert!(resolve_family(&contracts, &"nope".into()).is_none());
    }

    #[test]
    fn reports_orphans() {
        let contracts = vec![
            root("r1"),
            amendment("a1", "gone", amendment::Kind::Value),
            amendment("a2", "a1", amendment::Kind::Term),
        ];
        let snapshot = Snapshot::new(&contracts);

        assert_eq!(snapshot.orphans().len(), 2);
        assert_eq!(
            snapshot.orphans()[0].to_string(),
            "`Contract(id: a1)` references missing parent \
             `Contract(id: gone)`",
        );
        assert!(snapshot.family(&"r1".into()).unwrap().amendments().is_empty());
    }

    #[test]
    fn keeps_first_of_duplicate_roots() {
        let mut dup = root("r1");
        dup.value = Money::new(7.into());
        let contracts = vec![root("r1"), dup, root("r2")];
        let snapshot = Snapshot::new(&contracts);

        assert_eq!(ids(snapshot.roots()), ["r1", "r2"]);
        assert_eq!(
            snapshot.family(&"r1".into()).unwrap().root().value,
            Money::ZERO,
        );
    }

    #[test]
    fn finds_family_of_amendment() {
        let contracts = vec![
            root("r1"),
            amendment("a1", "r1", amendment::Kind::Value),
        ];
        let snapshot = Snapshot::new(&contracts);

        let family = snapshot.family_of(&"a1".into()).unwrap();
        assert_eq!(family.root().id.as_ref(), "r1");
        assert!(family.amendment(&"a1".into()).is_some());
    }
}
