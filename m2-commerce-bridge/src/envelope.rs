//! Uniform operation response envelope.
//!
//! Every canonical operation answers with one JSON object:
//!
//! ```json
//! { "success": true, "orders": [ ... ] }
//! { "success": false, "error": "GET /orders failed with status 401: ..." }
//! ```
//!
//! The payload keys sit next to `success`; a failure carries only the error message.
//! Errors are logged when they are folded into an envelope, so nothing escapes the
//! operation boundary unrecorded.

use serde::{Serialize, Serializer};
use tracing::error;

use crate::{
    error::Result,
    models::{Customer, Fulfillment, InventoryRecord, Order, Product, Return, Variant},
};

/// Outcome of a canonical operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResponse<P> {
    /// The operation succeeded.
    Success(P),
    /// The operation failed; the message is user-facing.
    Failure {
        /// Error message.
        error: String,
    },
}

impl<P> OperationResponse<P> {
    /// Folds an operation result into an envelope, logging the failure.
    pub fn from_result(operation: &str, result: Result<P>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => {
                error!(operation, error = %e, "operation failed");
                Self::Failure { error: e.to_string() }
            }
        }
    }

    /// Returns `true` for a successful outcome.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the payload of a successful outcome.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the error message of a failed outcome.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }
}

impl<P: Serialize> Serialize for OperationResponse<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Success<'a, P> {
            success: bool,
            #[serde(flatten)]
            payload: &'a P,
        }

        #[derive(Serialize)]
        struct Failure<'a> {
            success: bool,
            error: &'a str,
        }

        match self {
            Self::Success(payload) => Success { success: true, payload }.serialize(serializer),
            Self::Failure { error } => Failure { success: false, error }.serialize(serializer),
        }
    }
}

/// Payload of operations answering with one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    /// The order.
    pub order: Order,
}

/// Payload of `get-orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdersPayload {
    /// Matching orders.
    pub orders: Vec<Order>,
}

/// Payload of `get-customers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomersPayload {
    /// Matching customers.
    pub customers: Vec<Customer>,
}

/// Payload of `get-products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsPayload {
    /// Matching products.
    pub products: Vec<Product>,
}

/// Payload of `get-product-variants`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantsPayload {
    /// Matching variants.
    pub variants: Vec<Variant>,
}

/// Payload of `get-inventory`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPayload {
    /// Inventory records.
    pub inventory: Vec<InventoryRecord>,
}

/// Payload of `fulfill-order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentPayload {
    /// The created fulfillment.
    pub fulfillment: Fulfillment,
}

/// Payload of `get-fulfillments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentsPayload {
    /// Matching fulfillments.
    pub fulfillments: Vec<Fulfillment>,
}

/// Payload of `create-return`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnPayload {
    /// The created return.
    #[serde(rename = "return")]
    pub created: Return,
}

/// Payload of `get-returns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsPayload {
    /// Matching returns.
    pub returns: Vec<Return>,
}
