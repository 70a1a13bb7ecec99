//! Domain definitions.

pub mod contract;
pub mod party;
pub mod payment;

pub use self::{
    contract::{Amendment, Contract},
    party::{Party, Person},
    payment::{LineItem, Payment},
};
