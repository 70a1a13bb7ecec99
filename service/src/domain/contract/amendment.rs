//! [`Amendment`] definitions.

use common::{define_kind, RawDate};

use crate::domain::{contract, party::Person};
#[cfg(doc)]
use crate::domain::Contract;

/// Amendment ("aditivo") of a root [`Contract`].
///
/// Amendments never have amendments of their own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Amendment {
    /// ID of the root [`Contract`] being amended.
    pub parent_id: contract::Id,

    /// [`Kind`] of this [`Amendment`].
    pub kind: Kind,

    /// Ordinal number of this [`Amendment`] (e.g. "1º").
    pub number: String,

    /// Number of the administrative process of this [`Amendment`].
    pub process_number: String,

    /// Link to the administrative process of this [`Amendment`].
    pub process_link: Option<String>,

    /// Justification of this [`Amendment`].
    pub justification: String,

    /// Date when this [`Amendment`] was signed.
    pub signature_date: RawDate,

    /// Manager appointed by this [`Amendment`].
    pub manager: Option<Person>,

    /// Inspectors appointed by this [`Amendment`].
    pub inspectors: Option<Vec<Person>>,
}

define_kind! {
    #[doc = "Kind of an [`Amendment`]."]
    enum Kind {
        #[doc = "Adds money to the [`Contract`]."]
        #[name = "Valor"]
        Value = 1,

        #[doc = "Extends the end date of the [`Contract`]."]
        #[name = "Prazo"]
        Term = 2,

        #[doc = "Appoints a new manager and inspectors."]
        #[name = "GestorFiscal"]
        ManagerInspector = 3,

        #[doc = "Any other change."]
        #[name = "Outro"]
        Other = 4,
    }
}

impl Kind {
    /// Indicates whether an [`Amendment`] of this [`Kind`] contributes its
    /// value to the aggregate value of the [`Contract`].
    #[must_use]
    pub const fn contributes_value(self) -> bool {
        match self {
            Self::Value | Self::Term => true,
            Self::ManagerInspector | Self::Other => false,
        }
    }

    /// Indicates whether an [`Amendment`] of this [`Kind`] may extend the end
    /// date of the [`Contract`].
    #[must_use]
    pub const fn extends_term(self) -> bool {
        match self {
            Self::Term => true,
            Self::Value | Self::ManagerInspector | Self::Other => false,
        }
    }
}
