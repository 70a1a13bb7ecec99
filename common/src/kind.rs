//! Macros for defining kind enums.

/// Macro for defining a kind enum persisted under the provided names.
///
/// Requires the `serde` Cargo feature of this crate.
///
/// # Example
///
/// ```rust,ignore
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         #[name = "Cubo"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         #[name = "Esfera"]
///         Sphere = 2,
///     }
/// }
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                #[name = $variant_name:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::serde::Deserialize,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
            $crate::private::serde::Serialize,
        )]
        #[doc = $doc]
        #[repr(u8)]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                #[serde(rename = $variant_name)]
                #[strum(serialize = $variant_name)]
                $variant = $value,
            )*
        }
    };
}
