//! Variant option resolution.
//!
//! A configurable parent declares which attributes its children vary on; each child only
//! stores the raw value of those attributes among its custom attributes. Rebuilding a
//! child's selected options means looking each parent option up on the child, keyed by
//! the attribute code.
//!
//! The parent's option metadata does not always carry the attribute code. When it is
//! missing the key is derived from the label (`"Shoe Size"` becomes `shoe_size`), which
//! matches the platform's own code for most stock attributes but not all of them. A miss
//! on a derived key is therefore reported separately from a miss on an explicit code:
//! the former may be a naming mismatch, the latter means the child genuinely does not
//! carry the option.
//!
//! # Examples
//!
//! ```
//! use m2_commerce_bridge::{
//!     native::NativeAttribute,
//!     translate::options::{ParentOption, resolve_selected_options},
//! };
//!
//! let color = ParentOption::new("93", "Color").with_code("color");
//! let resolved = resolve_selected_options(&[color], &[NativeAttribute::new("color", "42")]);
//!
//! assert_eq!(resolved.selected.len(), 1);
//! assert_eq!(resolved.selected[0].name, "Color");
//! assert_eq!(resolved.selected[0].value, "42");
//! ```

use tracing::debug;

use crate::{
    models::{ProductOption, SelectedOption},
    native::{NativeAttribute, NativeConfigurableOption, NativeProduct},
};

/// Option declared by a configurable parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentOption {
    /// Attribute id.
    pub attribute_id: String,
    /// Display label.
    pub label: String,
    /// Attribute code, when known.
    pub attribute_code: Option<String>,
    /// Allowed value tokens.
    pub values: Vec<String>,
}

impl ParentOption {
    /// Creates an option without a known attribute code.
    #[must_use]
    pub fn new(attribute_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            label: label.into(),
            attribute_code: None,
            values: Vec::new(),
        }
    }

    /// Sets the attribute code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.attribute_code = Some(code.into());
        self
    }

    /// Builds an option from native metadata; the label falls back to the attribute id.
    #[must_use]
    pub fn from_native(native: &NativeConfigurableOption) -> Self {
        let attribute_id = native.attribute_id.clone().unwrap_or_default();
        let label = native
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map_or_else(|| format!("Option {attribute_id}"), str::to_owned);
        let values = native.values.iter().filter_map(|v| v.value_index.clone()).collect();
        Self { attribute_id, label, attribute_code: None, values }
    }

    /// Child-side lookup key and where it came from.
    #[must_use]
    pub fn lookup_key(&self) -> (String, KeySource) {
        match self.attribute_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => (code.to_owned(), KeySource::Explicit),
            None => (derive_key(&self.label), KeySource::Derived),
        }
    }

    /// Canonical product option.
    #[must_use]
    pub fn to_product_option(&self) -> ProductOption {
        ProductOption { name: self.label.clone(), values: self.values.clone() }
    }
}

/// Derives an attribute code from a label.
///
/// The label is lowercased, leading and trailing whitespace is dropped and every inner
/// whitespace run becomes a single `_`: `" Shoe  Size"` derives `shoe_size`.
#[must_use]
pub fn derive_key(label: &str) -> String {
    label.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join("_")
}

/// Origin of a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The parent metadata named the attribute code.
    Explicit,
    /// The key was derived from the label and may not match the real code.
    Derived,
}

/// Parent option the child carried no value for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedOption {
    /// Option label.
    pub label: String,
    /// Key that was looked up.
    pub lookup_key: String,
    /// Where the key came from.
    pub key_source: KeySource,
}

/// Selected options of one child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Matched options in the parent's declaration order.
    pub selected: Vec<SelectedOption>,
    /// Options without a value on the child.
    pub unmatched: Vec<UnmatchedOption>,
}

impl ResolvedOptions {
    /// Unmatched options whose key was derived; these may be naming mismatches.
    pub fn suspect_mismatches(&self) -> impl Iterator<Item = &UnmatchedOption> {
        self.unmatched.iter().filter(|u| u.key_source == KeySource::Derived)
    }
}

/// Resolves a child's selected options against its parent's declared options.
///
/// Values are the raw stored tokens; no value-to-label lookup happens here. Options
/// the child does not carry are skipped and listed in
/// [`ResolvedOptions::unmatched`].
#[must_use]
pub fn resolve_selected_options(
    options: &[ParentOption],
    attributes: &[NativeAttribute],
) -> ResolvedOptions {
    let mut resolved = ResolvedOptions::default();

    for option in options {
        let (key, source) = option.lookup_key();
        match attributes
            .iter()
            .find(|attr| attr.attribute_code == key)
            .and_then(NativeAttribute::text)
        {
            Some(value) => {
                resolved.selected.push(SelectedOption { name: option.label.clone(), value });
            }
            None => {
                if source == KeySource::Derived {
                    debug!(
                        label = %option.label,
                        key = %key,
                        "no child attribute for derived option key"
                    );
                }
                resolved.unmatched.push(UnmatchedOption {
                    label: option.label.clone(),
                    lookup_key: key,
                    key_source: source,
                });
            }
        }
    }

    resolved
}

/// Resolves every child independently.
#[must_use]
pub fn resolve_for_children<'a>(
    options: &[ParentOption],
    children: &'a [NativeProduct],
) -> Vec<(&'a NativeProduct, ResolvedOptions)> {
    children
        .iter()
        .map(|child| (child, resolve_selected_options(options, &child.custom_attributes)))
        .collect()
}
