//! Entity translators between native platform records and canonical models.
//!
//! Every translator is a pure function: native record in, canonical entity out (or a
//! canonical draft in, native write payload out). Translators own no state and never
//! touch the transport. Platform data without a canonical field is carried as custom
//! fields named `{namespace}_{key}`.

pub(crate) mod common;
pub mod customer;
pub mod fulfillment;
pub mod inventory;
pub mod options;
pub mod order;
pub mod product;
pub mod returns;

pub use options::{
    KeySource, ParentOption, ResolvedOptions, UnmatchedOption, resolve_for_children,
    resolve_selected_options,
};
pub use product::VariantContext;
