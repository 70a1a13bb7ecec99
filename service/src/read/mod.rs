//! Read entities definitions.

pub mod family;

pub use self::family::{resolve_family, Amended, Family, Snapshot};
