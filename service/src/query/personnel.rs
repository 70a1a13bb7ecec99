//! Effective [`Personnel`] of a [`Family`].

use common::Date;
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{contract::{self, amendment}, Person},
    error::{parse_date, ConfigurationError, DateField},
    read::{family::Snapshot, Family},
    Service,
};
#[cfg(doc)]
use crate::domain::{Amendment, Contract};

use super::Query;

/// Manager and inspectors in charge of a [`Family`] at some point in time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel<'a> {
    /// Effective manager, if any was ever appointed.
    pub manager: Option<&'a Person>,

    /// [`Source`] of the [`Personnel::manager`].
    pub manager_source: Source<'a>,

    /// Effective inspectors.
    pub inspectors: &'a [Person],

    /// [`Source`] of the [`Personnel::inspectors`].
    pub inspectors_source: Source<'a>,
}

/// Record an appointment of [`Personnel`] comes from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "from", content = "id")]
pub enum Source<'a> {
    /// Initial assignment of the root [`Contract`].
    Initial,

    /// [`Amendment`] with the provided ID.
    Amendment(&'a contract::Id),
}

/// Reconstructs the [`Personnel`] of the provided [`Family`] as of the
/// provided date, or as of now if there is none.
///
/// Personnel [`Amendment`]s are applied in signature date order (unsigned
/// ones first, insertion order on ties), ignoring the ones signed after
/// `as_of`. The manager and the inspectors are taken independently from the
/// latest [`Amendment`] naming them, falling back to the initial assignment
/// of the root [`Contract`].
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the signature date of a
/// personnel [`Amendment`] is malformed.
pub fn effective_personnel<'a>(
    family: &Family<'a>,
    as_of: Option<Date>,
) -> Result<Personnel<'a>, Traced<ConfigurationError>> {
    let mut appointments = Vec::new();
    for a in family.amendments_of(amendment::Kind::ManagerInspector) {
        let signed = parse_date(
            &a.contract.id,
            DateField::AmendmentSignature,
            Some(&a.amendment.signature_date),
        )
        .map_err(tracerr::wrap!())?;
        if signed.zip(as_of).is_some_and(|(s, as_of)| s > as_of) {
            continue;
        }
        appointments.push((signed, a));
    }
    appointments.sort_by_key(|(signed, _)| *signed);

    let root = family.root_data();
    let mut personnel = Personnel {
        manager: root.initial_manager.as_ref().filter(|p| p.is_named()),
        manager_source: Source::Initial,
        inspectors: root.initial_inspectors.as_deref().unwrap_or_default(),
        inspectors_source: Source::Initial,
    };
    if let Some((_, a)) = appointments
        .iter()
        .rev()
        .find(|(_, a)| a.amendment.manager.as_ref().is_some_and(Person::is_named))
    {
        personnel.manager = a.amendment.manager.as_ref();
        personnel.manager_source = Source::Amendment(&a.contract.id);
    }
    if let Some((_, a)) = appointments.iter().rev().find(|(_, a)| {
        a.amendment.inspectors.as_ref().is_some_and(|i| !i.is_empty())
    }) {
        personnel.inspectors =
            a.amendment.inspectors.as_deref().unwrap_or_default();
        personnel.inspectors_source = Source::Amendment(&a.contract.id);
    }
    Ok(personnel)
}

/// [`Query`] reconstructing the effective [`Personnel`] of the [`Family`] of
/// a root [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct EffectivePersonnel<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the root [`Contract`].
    pub root_id: &'s contract::Id,

    /// Date to reconstruct the [`Personnel`] as of.
    pub as_of: Option<Date>,
}

impl<'s> Query<EffectivePersonnel<'s>> for Service {
    type Ok = Personnel<'s>;
    type Err = Traced<ConfigurationError>;

    fn execute(
        &self,
        query: EffectivePersonnel<'s>,
    ) -> Result<Self::Ok, Self::Err> {
        let family = super::family(query.snapshot, query.root_id)
            .map_err(tracerr::wrap!())?;
        effective_personnel(&family, query.as_of).map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, Money, RawDate};

    use crate::{
        domain::{
            contract::{amendment, Details, Role, Root},
            Amendment, Contract, Person,
        },
        read::family::resolve_family,
    };

    use super::{effective_personnel, Source};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn person(name: &str) -> Person {
        Person {
            name: name.to_owned(),
            registration: format!("{name}-1"),
        }
    }

    fn root() -> Contract {
        Contract {
            id: "r".into(),
            contracting_unit: None,
            contractor: None,
            value: Money::ZERO,
            start_date: None,
            end_date: None,
            signature_date: None,
            monthly_estimate: None,
            payments: vec![],
            details: Details::default(),
            role: Role::Root(Root {
                initial_manager: Some(person("Ana")),
                initial_inspectors: Some(vec![person("Bruno")]),
            }),
        }
    }

    fn appointment(
        id: &str,
        signed: &str,
        manager: Option<&str>,
        inspectors: &[&str],
    ) -> Contract {
        Contract {
            id: id.into(),
            role: Role::Amendment(Amendment {
                parent_id: "r".into(),
                kind: amendment::Kind::ManagerInspector,
                number: String::new(),
                process_number: String::new(),
                process_link: None,
                justification: String::new(),
                signature_date: RawDate::new(signed),
                manager: manager.map(person),
                inspectors: Some(inspectors.iter().copied().map(person).collect()),
            }),
            ..root()
        }
    }

    #[test]
    fn falls_back_to_initial_assignment() {
        let contracts = vec![root()];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let p = effective_personnel(&family, None).unwrap();

        assert_eq!(p.manager, Some(&person("Ana")));
        assert_eq!(p.manager_source, Source::Initial);
        assert_eq!(p.inspectors, [person("Bruno")]);
        assert_eq!(p.inspectors_source, Source::Initial);
    }

    #[test]
    fn latest_signed_appointment_wins() {
        let contracts = vec![
            root(),
            appointment("g2", "2024-09-01", Some("Carla"), &["Davi"]),
            appointment("g1", "2024-03-01", Some("Edu"), &["Fabi", "Gil"]),
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let now = effective_personnel(&family, None).unwrap();
        assert_eq!(now.manager, Some(&person("Carla")));
        assert_eq!(now.inspectors, [person("Davi")]);
        assert_eq!(now.manager_source, Source::Amendment(&"g2".into()));

        let then = effective_personnel(&family, Some(date("2024-05-01")))
            .unwrap();
        assert_eq!(then.manager, Some(&person("Edu")));
        assert_eq!(then.inspectors, [person("Fabi"), person("Gil")]);

        let before = effective_personnel(&family, Some(date("2024-01-01")))
            .unwrap();
        assert_eq!(before.manager_source, Source::Initial);
    }

    #[test]
    fn manager_and_inspectors_fall_back_independently() {
        let contracts = vec![
            root(),
            appointment("g1", "2024-03-01", Some("Edu"), &["Fabi"]),
            appointment("g2", "2024-09-01", None, &["Davi"]),
            appointment("g3", "2024-10-01", Some("  "), &[]),
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let p = effective_personnel(&family, None).unwrap();

        assert_eq!(p.manager, Some(&person("Edu")));
        assert_eq!(p.manager_source, Source::Amendment(&"g1".into()));
        assert_eq!(p.inspectors, [person("Davi")]);
        assert_eq!(p.inspectors_source, Source::Amendment(&"g2".into()));
    }

    #[test]
    fn malformed_signature_is_reported() {
        let contracts =
            vec![root(), appointment("g1", "01/03/2024", Some("Edu"), &[])];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        assert!(effective_personnel(&family, None).is_err());
    }
}
