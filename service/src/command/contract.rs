//! [`Command`]s for registering and updating [`Contract`] records.

use common::{Money, RawDate};
use derive_more::{Display, Error};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, amendment, Details, Role, Root},
        Amendment, Contract, Party,
    },
    infra::Store,
};

use super::Command;

/// Editable fields of a [`Contract`] record.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    /// [`Party`] contracting the service.
    pub contracting_unit: Option<Party>,

    /// [`Party`] providing the service.
    pub contractor: Option<Party>,

    /// Value of the [`Contract`], or the delta of the [`Amendment`].
    pub value: Money,

    /// Start of the [`Contract`] validity.
    pub start_date: Option<RawDate>,

    /// End of the [`Contract`] validity.
    pub end_date: Option<RawDate>,

    /// Signature date of the [`Contract`].
    pub signature_date: Option<RawDate>,

    /// Expected average monthly spending.
    pub monthly_estimate: Option<Money>,

    /// Administrative [`Details`].
    pub details: Details,
}

/// [`Command`] for registering a new root [`Contract`].
#[derive(Clone, Debug, Default)]
pub struct RegisterContract {
    /// [`Fields`] of the new [`Contract`].
    pub fields: Fields,

    /// Initial manager and inspectors of the new [`Contract`].
    pub root: Root,
}

impl Command<RegisterContract> for Store {
    type Ok = contract::Id;
    type Err = Traced<ExecutionError>;

    fn execute(
        &mut self,
        cmd: RegisterContract,
    ) -> Result<Self::Ok, Self::Err> {
        let RegisterContract { fields, root } = cmd;

        let contract =
            normalize_root(assemble(contract::Id::new(), fields, root.into()));
        let id = contract.id.clone();
        self.push(contract);

        log::info!("registered `Contract(id: {id})`");
        Ok(id)
    }
}

/// [`Command`] for registering a new [`Amendment`] of a root [`Contract`].
#[derive(Clone, Debug)]
pub struct RegisterAmendment {
    /// [`Fields`] of the new [`Amendment`].
    ///
    /// Missing parties are inherited from the parent [`Contract`].
    pub fields: Fields,

    /// [`Amendment`] data.
    pub amendment: Amendment,
}

impl Command<RegisterAmendment> for Store {
    type Ok = contract::Id;
    type Err = Traced<ExecutionError>;

    fn execute(
        &mut self,
        cmd: RegisterAmendment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterAmendment {
            mut fields,
            amendment,
        } = cmd;

        let parent = self
            .get(&amendment.parent_id)
            .ok_or_else(|| E::ParentNotExists(amendment.parent_id.clone()))
            .map_err(tracerr::wrap!())?;
        if !parent.is_root() {
            return Err(tracerr::new!(E::ParentNotRoot(parent.id.clone())));
        }
        if fields.contracting_unit.is_none() {
            fields.contracting_unit.clone_from(&parent.contracting_unit);
        }
        if fields.contractor.is_none() {
            fields.contractor.clone_from(&parent.contractor);
        }
        let parent_end = parent.end_date.clone();

        let contract = normalize_amendment(
            assemble(contract::Id::new(), fields, amendment.into()),
            parent_end,
        )
        .map_err(tracerr::wrap!())?;
        let id = contract.id.clone();
        self.push(contract);

        log::info!("registered amendment `Contract(id: {id})`");
        Ok(id)
    }
}

/// [`Command`] for updating an existing [`Contract`] record.
///
/// Its ID, parent reference and [`Payment`]s are preserved.
///
/// [`Payment`]: crate::domain::Payment
#[derive(Clone, Debug)]
pub struct UpdateContract {
    /// ID of the [`Contract`] to update.
    pub id: contract::Id,

    /// New [`Fields`] of the [`Contract`].
    pub fields: Fields,

    /// New [`Role`] data of the [`Contract`].
    ///
    /// Must be of the same variant the [`Contract`] already has.
    pub role: Role,
}

impl Command<UpdateContract> for Store {
    type Ok = ();
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: UpdateContract) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContract { id, fields, role } = cmd;

        let existing = self
            .get(&id)
            .ok_or_else(|| E::ContractNotExists(id.clone()))
            .map_err(tracerr::wrap!())?;
        let updated = match (&existing.role, role) {
            (Role::Root(_), role @ Role::Root(_)) => {
                normalize_root(assemble(id.clone(), fields, role))
            }
            (Role::Amendment(current), Role::Amendment(mut amendment)) => {
                amendment.parent_id = current.parent_id.clone();
                let parent_end = self
                    .get(&amendment.parent_id)
                    .and_then(|p| p.end_date.clone());
                normalize_amendment(
                    assemble(id.clone(), fields, amendment.into()),
                    parent_end,
                )
                .map_err(tracerr::wrap!())?
            }
            (Role::Root(_), Role::Amendment(_))
            | (Role::Amendment(_), Role::Root(_)) => {
                return Err(tracerr::new!(E::RoleMismatch(id)));
            }
        };

        let contract = self
            .get_mut(&id)
            .ok_or_else(|| E::ContractNotExists(id.clone()))
            .map_err(tracerr::wrap!())?;
        let payments = std::mem::take(&mut contract.payments);
        *contract = Contract {
            payments,
            ..updated
        };

        log::info!("updated `Contract(id: {id})`");
        Ok(())
    }
}

/// Assembles a new [`Contract`] record without [`Payment`]s.
///
/// [`Payment`]: crate::domain::Payment
fn assemble(id: contract::Id, fields: Fields, role: Role) -> Contract {
    let Fields {
        contracting_unit,
        contractor,
        value,
        start_date,
        end_date,
        signature_date,
        monthly_estimate,
        details,
    } = fields;
    Contract {
        id,
        contracting_unit,
        contractor,
        value,
        start_date,
        end_date,
        signature_date,
        monthly_estimate,
        payments: vec![],
        details,
        role,
    }
}

/// Zeroes the value of a technical cooperation root [`Contract`].
fn normalize_root(mut contract: Contract) -> Contract {
    if contract.details.is_technical_cooperation() {
        contract.value = Money::ZERO;
        contract.monthly_estimate = Some(Money::ZERO);
    }
    contract
}

/// Validates the provided [`Amendment`] record and applies the rules of its
/// [`amendment::Kind`].
///
/// # Errors
///
/// If a mandatory field is blank, or the personnel of a
/// [`amendment::Kind::ManagerInspector`] one is incomplete.
fn normalize_amendment(
    mut contract: Contract,
    parent_end: Option<RawDate>,
) -> Result<Contract, Traced<ExecutionError>> {
    use ExecutionError as E;

    let Role::Amendment(amendment) = &mut contract.role else {
        return Ok(contract);
    };

    for (field, value) in [
        ("aditivo.numero", &amendment.number),
        ("aditivo.processoSei", &amendment.process_number),
        ("aditivo.justificativa", &amendment.justification),
    ] {
        if value.trim().is_empty() {
            return Err(tracerr::new!(E::MissingField(field)));
        }
    }
    match amendment.signature_date.parse() {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(tracerr::new!(E::MissingField(
                "aditivo.dataAssinatura"
            )));
        }
        Err(_) => {
            return Err(tracerr::new!(E::InvalidSignatureDate(
                amendment.signature_date.clone()
            )));
        }
    }

    match amendment.kind {
        amendment::Kind::ManagerInspector => {
            if !amendment.manager.as_ref().is_some_and(|m| m.is_named()) {
                return Err(tracerr::new!(E::IncompletePersonnel(
                    contract.id.clone()
                )));
            }
            let inspectors = amendment
                .inspectors
                .take()
                .unwrap_or_default()
                .into_iter()
                .filter(|i| i.is_complete())
                .collect::<Vec<_>>();
            if inspectors.is_empty() {
                return Err(tracerr::new!(E::IncompletePersonnel(
                    contract.id.clone()
                )));
            }
            amendment.inspectors = Some(inspectors);
            contract.value = Money::ZERO;
            contract.end_date = parent_end;
        }
        amendment::Kind::Value => {
            amendment.manager = None;
            amendment.inspectors = None;
            contract.end_date = parent_end;
        }
        amendment::Kind::Term | amendment::Kind::Other => {
            amendment.manager = None;
            amendment.inspectors = None;
        }
    }
    Ok(contract)
}

/// Error of [`Contract`] registering [`Command`]s execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// Parent [`Contract`] with the provided ID does not exist.
    #[display("parent `Contract(id: {_0})` does not exist")]
    ParentNotExists(#[error(not(source))] contract::Id),

    /// Parent [`Contract`] is an [`Amendment`] itself.
    #[display("parent `Contract(id: {_0})` is not a root one")]
    ParentNotRoot(#[error(not(source))] contract::Id),

    /// Mandatory field is blank.
    #[display("`{_0}` is required")]
    MissingField(#[error(not(source))] &'static str),

    /// Signature date of an [`Amendment`] is not a calendar date.
    #[display("`aditivo.dataAssinatura` is not a date: `{_0}`")]
    InvalidSignatureDate(#[error(not(source))] RawDate),

    /// Personnel [`Amendment`] misses a named manager or a complete
    /// inspector.
    #[display("`Contract(id: {_0})` requires a manager and at least one \
               inspector with name and registration")]
    IncompletePersonnel(#[error(not(source))] contract::Id),

    /// [`Role`] of the update doesn't match the one of the [`Contract`].
    #[display("`Contract(id: {_0})` cannot change its role")]
    RoleMismatch(#[error(not(source))] contract::Id),
}
