//! M2 Commerce Bridge: canonical commerce operations over a Magento 2 style REST API
//!
//! A Rust library that exposes a platform-neutral set of commerce operations (orders,
//! customers, products, variants, inventory, fulfillments, returns) on top of a
//! Magento 2 style REST platform with its own entity shapes, paging model and
//! edition-dependent features.
//!
//! # What does the bridge do?
//!
//! - **Query translation**: canonical filters and paging become native `searchCriteria`
//! - **Entity translation**: native records become canonical entities and canonical
//!   drafts become native write payloads
//! - **Capability fallback**: returns are served from RMAs where the edition has them
//!   and from credit memos where it does not, unified into one `Return`
//! - **Variant options**: selected options of each child product are rebuilt from the
//!   parent's configurable option metadata
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Caller      │  canonical params (camelCase JSON or typed structs)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────────────────────────────────────────┐
//! │              M2 Commerce Bridge (this crate)        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────┐  │
//! │  │  operations  │──│  criteria    │  │  returns  │  │
//! │  │  + envelope  │  │  translate   │  │ (RMA/memo)│  │
//! │  └──────────────┘  └──────────────┘  └───────────┘  │
//! └────────┬────────────────────────────────────────────┘
//!          │ Transport (GET / POST / PUT, JSON)
//! ┌────────▼────────┐
//! │  Platform REST  │  /rest/V1 or /rest/{store}/V1
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use m2_commerce_bridge::{
//!     CommerceBridge,
//!     models::{GetInventoryParams, GetReturnsParams},
//! };
//!
//! # async fn example() -> m2_commerce_bridge::error::Result<()> {
//! let bridge = CommerceBridge::from_toml(
//!     r#"
//!     base_url = "https://shop.example.com"
//!     access_token = "integration-token"
//!     "#,
//! )?;
//!
//! // Typed results
//! let returns = bridge.try_get_returns(&GetReturnsParams::default()).await?;
//! for ret in &returns {
//!     println!("{} ({})", ret.id, ret.origin());
//! }
//!
//! // Envelope: {"success": false, "error": "Validation failed: ..."}
//! let response = bridge.get_inventory(&GetInventoryParams::default()).await;
//! assert!(!response.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`operations`]: the twelve canonical operations
//! - [`envelope`]: uniform success / failure responses
//! - [`criteria`]: canonical query window to native search criteria
//! - [`translate`]: native ⇄ canonical entity translation, variant option resolution
//! - [`returns`]: RMA / credit memo capability fallback
//! - [`transport`]: the [`Transport`] trait and its HTTP implementation
//! - [`models`] and [`native`]: canonical and native data shapes
//! - [`config`], [`error`], [`observability`]: configuration, errors, logging
//!
//! # Error Handling
//!
//! Fallible functions return [`Result`]. The envelope methods never fail: every error
//! is logged and folded into `{"success": false, "error": "..."}`.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod config;
pub mod criteria;
pub mod envelope;
pub mod error;
pub mod models;
pub mod native;
pub mod observability;
pub mod operations;
pub mod returns;
pub mod transport;
pub mod translate;

pub use config::{BridgeConfig, FieldNamespace};
pub use envelope::OperationResponse;
pub use error::{BridgeError, Result};
pub use operations::{CommerceBridge, Operation};
pub use returns::{Backend, ReturnsBackend};
pub use transport::{HttpTransport, Transport};
