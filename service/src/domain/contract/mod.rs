//! [`Contract`] definitions.

pub mod amendment;

use common::{Money, RawDate};
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    party::{Party, Person},
    payment, Payment,
};

pub use self::amendment::Amendment;

/// Administrative service contract record.
///
/// Root instruments and their [`Amendment`]s share the same shape and live in
/// one flat collection, told apart by their [`Role`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// [`Party`] contracting the service.
    ///
    /// Owned by the root [`Contract`]: [`Amendment`]s only carry a copy for
    /// display.
    pub contracting_unit: Option<Party>,

    /// [`Party`] providing the service.
    pub contractor: Option<Party>,

    /// Value of this [`Contract`].
    ///
    /// For a root [`Contract`] it's the originally contracted value, while for
    /// an [`Amendment`] it's the delta it contributes.
    pub value: Money,

    /// Date when the validity of this [`Contract`] starts.
    pub start_date: Option<RawDate>,

    /// Date when the validity of this [`Contract`] ends.
    ///
    /// Meaningful for an [`Amendment`] only if it's an
    /// [`amendment::Kind::Term`] one.
    pub end_date: Option<RawDate>,

    /// Date when this [`Contract`] was signed.
    pub signature_date: Option<RawDate>,

    /// Expected average monthly spending, set on the root [`Contract`].
    pub monthly_estimate: Option<Money>,

    /// [`Payment`]s registered against this [`Contract`] record.
    pub payments: Vec<Payment>,

    /// Administrative [`Details`] of this [`Contract`].
    pub details: Details,

    /// [`Role`] of this [`Contract`] in its family.
    pub role: Role,
}

impl Contract {
    /// Returns the [`Root`] data of this [`Contract`], if it's a root one.
    #[must_use]
    pub fn as_root(&self) -> Option<&Root> {
        match &self.role {
            Role::Root(root) => Some(root),
            Role::Amendment(_) => None,
        }
    }

    /// Returns the [`Amendment`] data of this [`Contract`], if it amends
    /// another one.
    #[must_use]
    pub fn as_amendment(&self) -> Option<&Amendment> {
        match &self.role {
            Role::Amendment(amendment) => Some(amendment),
            Role::Root(_) => None,
        }
    }

    /// Returns ID of the root [`Contract`] this one amends.
    ///
    /// [`None`] is returned for a root [`Contract`].
    #[must_use]
    pub fn parent_id(&self) -> Option<&Id> {
        self.as_amendment().map(|a| &a.parent_id)
    }

    /// Indicates whether this [`Contract`] is a root one.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.as_root().is_some()
    }

    /// Returns the [`Payment`] with the provided ID registered against this
    /// [`Contract`].
    #[must_use]
    pub fn payment(&self, id: &payment::Id) -> Option<&Payment> {
        self.payments.iter().find(|p| &p.id == id)
    }

    /// Returns the [`Payment`] with the provided ID registered against this
    /// [`Contract`] for modification.
    #[must_use]
    pub fn payment_mut(&mut self, id: &payment::Id) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| &p.id == id)
    }
}

/// ID of a [`Contract`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(format!("contrato_{}", Uuid::new_v4().simple()))
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// [`Role`] of a [`Contract`] in its family.
#[derive(Clone, Debug, Eq, From, PartialEq)]
pub enum Role {
    /// Root instrument, owning the family.
    Root(Root),

    /// [`Amendment`] of a root instrument.
    Amendment(Amendment),
}

/// Data owned by a root [`Contract`] only.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Root {
    /// Manager assigned when the [`Contract`] was signed.
    ///
    /// Baseline for the effective manager until an
    /// [`amendment::Kind::ManagerInspector`] [`Amendment`] overrides it.
    pub initial_manager: Option<Person>,

    /// Inspectors assigned when the [`Contract`] was signed.
    pub initial_inspectors: Option<Vec<Person>>,
}

/// Contract type which bears no monetary value.
pub const TECHNICAL_COOPERATION: &str = "Cooperacao Tecnica";

/// Administrative details of a [`Contract`], kept verbatim.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Details {
    /// Number of the administrative process.
    pub process_number: Option<String>,

    /// Link to the administrative process.
    pub process_link: Option<String>,

    /// Number of the [`Contract`].
    pub contract_number: Option<String>,

    /// Type of the [`Contract`].
    pub contract_type: Option<String>,

    /// Object of the [`Contract`].
    pub object: Option<String>,

    /// Free-form duration of the [`Contract`] (e.g. "12 meses").
    pub duration: Option<String>,
}

impl Details {
    /// Indicates whether the [`Contract`] is a technical cooperation one,
    /// bearing no monetary value.
    #[must_use]
    pub fn is_technical_cooperation(&self) -> bool {
        self.contract_type.as_deref() == Some(TECHNICAL_COOPERATION)
    }
}
