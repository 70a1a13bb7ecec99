//! Infrastructure layer.

#[cfg(feature = "json")]
pub mod document;
pub mod store;

#[cfg(feature = "json")]
pub use self::document::Document;
pub use self::store::Store;
