//! [`Party`] and [`Person`] definitions.

use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Contract;

/// Legal entity taking part in a [`Contract`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Party {
    /// Registered name of this [`Party`].
    #[serde(rename = "nome", default)]
    pub name: String,

    /// Tax ID (CNPJ) of this [`Party`].
    #[serde(rename = "cnpj", default)]
    pub tax_id: String,

    /// Address of this [`Party`].
    #[serde(rename = "endereco", default)]
    pub address: String,

    /// Legal representative of this [`Party`].
    #[serde(rename = "rep", default)]
    pub representative: String,
}

/// Public servant appointed to manage or inspect a [`Contract`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Person {
    /// Name of this [`Person`].
    #[serde(rename = "nome", default)]
    pub name: String,

    /// Registration number of this [`Person`].
    #[serde(rename = "matricula", default)]
    pub registration: String,
}

impl Person {
    /// Indicates whether this [`Person`] has a name.
    #[must_use]
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Indicates whether both the name and the registration of this
    /// [`Person`] are filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_named() && !self.registration.trim().is_empty()
    }
}
