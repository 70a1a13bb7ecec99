//! [`Command`] definition.

pub mod contract;
pub mod line_item;
pub mod payment;

/// [`Command`] mutating the [`Store`].
///
/// [`Store`]: crate::infra::Store
pub use common::HandlerMut as Command;

pub use self::{
    contract::{RegisterAmendment, RegisterContract, UpdateContract},
    line_item::{AddLineItem, RemoveLineItem},
    payment::{RegisterPayment, RemovePayment, UpdatePayment},
};
