//! Returns capability fallback.
//!
//! Structured return authorizations (RMA) exist only on the commerce edition of the
//! platform. Elsewhere the `/returns` resource answers `404` (or `403` when the module is
//! present but the integration lacks access) and refunds are recorded as credit memos.
//!
//! Every returns call therefore starts on the modern resource and, only when that
//! resource is absent, repeats the equivalent call against the credit memo resources.
//! The decision is made per call: nothing is remembered between calls, and any other
//! failure (validation, rate limiting, server errors, timeouts) propagates unchanged.
//!
//! ```text
//!            ┌──────────────┐  ok                 ┌──────────────┐
//!  call ───▶ │  TryModern   │ ──────────────────▶ │ origin: rma  │
//!            └──────┬───────┘                     └──────────────┘
//!                   │ 404 / 403
//!                   ▼
//!            ┌──────────────┐  ok                 ┌─────────────────────┐
//!            │  TryLegacy   │ ──────────────────▶ │ origin: credit_memo │
//!            └──────┬───────┘                     └─────────────────────┘
//!                   │ any error
//!                   ▼
//!                 error
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for generic bounds despite being in Edition 2024 prelude"
)]
use std::future::Future;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    config::FieldNamespace,
    criteria::{QueryWindow, build_search_criteria, ids_filter},
    error::Result,
    models::{GetReturnsParams, Return, ReturnDraft},
    native::{NativeCreditMemo, NativeRma, SearchResult},
    transport::{Transport, encode_path},
    translate::{
        common::{from_response, id_from_response},
        returns::{
            credit_memo_state, credit_memo_to_canonical, draft_to_refund, draft_to_rma,
            rma_to_canonical,
        },
    },
};

/// Which side of a capability fork served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The edition-specific resource.
    Modern,
    /// The resource every edition has.
    Legacy,
}

/// Backend of a returns call: RMA (`Modern`) or credit memo (`Legacy`).
pub type ReturnsBackend = Backend;

/// Runs `primary`; when it fails because the capability is absent, runs `fallback`.
///
/// Only [`crate::error::BridgeError::is_capability_absent`] failures trigger the fallback. The
/// capability-absence error itself is never returned: the result is either the
/// fallback's value or the fallback's own error.
///
/// # Errors
///
/// Returns the primary error when it is not a capability absence, otherwise whatever the
/// fallback returns.
pub async fn with_capability_fallback<T, P, F, FF>(
    capability: &str,
    primary: P,
    fallback: F,
) -> Result<(Backend, T)>
where
    P: Future<Output = Result<T>>,
    F: FnOnce() -> FF,
    FF: Future<Output = Result<T>>,
{
    match primary.await {
        Ok(value) => Ok((Backend::Modern, value)),
        Err(error) if error.is_capability_absent() => {
            debug!(capability, status = ?error.status(), "modern resource absent, using legacy resource");
            fallback().await.map(|value| (Backend::Legacy, value))
        }
        Err(error) => Err(error),
    }
}

/// Resolves returns reads and writes onto RMAs or credit memos.
#[derive(Debug)]
pub struct ReturnsResolver<'a, T> {
    transport: &'a T,
    namespace: &'a FieldNamespace,
    default_currency: &'a str,
}

impl<'a, T: Transport> ReturnsResolver<'a, T> {
    /// Creates a resolver over a transport.
    #[must_use]
    pub const fn new(transport: &'a T, namespace: &'a FieldNamespace, default_currency: &'a str) -> Self {
        Self { transport, namespace, default_currency }
    }

    /// Queries returns.
    ///
    /// `outcomes` has no native filter; it is applied to the translated returns of the
    /// fetched page. Paging therefore counts returns before that filter, and a page may
    /// come back short or empty while later pages still hold matches.
    ///
    /// RMAs carry only a request date, so the `updatedAt` bounds are ignored on that
    /// backend; credit memos honour all four bounds.
    ///
    /// # Errors
    ///
    /// Returns error if the serving backend fails or answers with a malformed payload.
    #[instrument(skip_all)]
    pub async fn query(&self, params: &GetReturnsParams) -> Result<Vec<Return>> {
        let (backend, returns) = with_capability_fallback(
            "returns",
            self.query_rma(params),
            || self.query_credit_memos(params),
        )
        .await?;
        debug!(?backend, count = returns.len(), "returns resolved");

        if params.outcomes.is_empty() {
            return Ok(returns);
        }
        Ok(returns
            .into_iter()
            .filter(|ret| {
                ret.outcome.as_deref().is_some_and(|outcome| {
                    params.outcomes.iter().any(|wanted| wanted.eq_ignore_ascii_case(outcome))
                })
            })
            .collect())
    }

    /// Creates a return: an RMA where supported, otherwise a refund (credit memo).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BridgeError::Validation`] before any call for a draft without lines,
    /// otherwise whatever the serving backend returns.
    #[instrument(skip_all, fields(order_id = %draft.order_id))]
    pub async fn create(&self, draft: &ReturnDraft) -> Result<Return> {
        let rma_body = draft_to_rma(draft)?;
        let refund_body = draft_to_refund(draft)?;

        let (backend, created) = with_capability_fallback(
            "returns",
            self.create_rma(&rma_body),
            || self.create_refund(&draft.order_id, &refund_body),
        )
        .await?;
        debug!(?backend, return_id = %created.id, "return created");
        Ok(created)
    }

    async fn query_rma(&self, params: &GetReturnsParams) -> Result<Vec<Return>> {
        let filters = [
            ids_filter("entity_id", &params.ids),
            ids_filter("order_id", &params.order_ids),
            ids_filter("increment_id", &params.return_numbers),
            ids_filter("status", &params.statuses),
        ];
        let window = QueryWindow { updated_at_min: None, updated_at_max: None, ..params.window.clone() };
        let criteria = build_search_criteria(&window, filters.into_iter().flatten().collect())?
            .with_field_renamed("created_at", "date_requested");

        let value = self.transport.get("/returns", Some(&criteria)).await?;
        let result: SearchResult<NativeRma> = from_response(value, "return search")?;
        Ok(result.items.iter().map(|rma| rma_to_canonical(rma, self.namespace)).collect())
    }

    async fn query_credit_memos(&self, params: &GetReturnsParams) -> Result<Vec<Return>> {
        let states: Vec<String> = params
            .statuses
            .iter()
            .filter_map(|status| credit_memo_state(status))
            .map(|state| state.to_string())
            .collect();
        if !params.statuses.is_empty() && states.is_empty() {
            debug!(statuses = ?params.statuses, "no requested status exists on credit memos");
            return Ok(Vec::new());
        }

        let filters = [
            ids_filter("entity_id", &params.ids),
            ids_filter("order_id", &params.order_ids),
            ids_filter("increment_id", &params.return_numbers),
            ids_filter("state", &states),
        ];
        let criteria = build_search_criteria(&params.window, filters.into_iter().flatten().collect())?;

        let value = self.transport.get("/creditmemos", Some(&criteria)).await?;
        let result: SearchResult<NativeCreditMemo> = from_response(value, "credit memo search")?;
        Ok(result
            .items
            .iter()
            .map(|memo| credit_memo_to_canonical(memo, self.namespace, self.default_currency))
            .collect())
    }

    async fn create_rma(&self, body: &Value) -> Result<Return> {
        let value = self.transport.post("/returns", body).await?;
        let native: NativeRma = from_response(value, "return")?;
        Ok(rma_to_canonical(&native, self.namespace))
    }

    async fn create_refund(&self, order_id: &str, body: &Value) -> Result<Return> {
        let path = encode_path(&["order", order_id, "refund"])?;
        let id = id_from_response(&self.transport.post(&path, body).await?, "credit memo")?;
        self.credit_memo(&id).await
    }

    async fn credit_memo(&self, id: &str) -> Result<Return> {
        let value = self.transport.get(&encode_path(&["creditmemo", id])?, None).await?;
        let native: NativeCreditMemo = from_response(value, "credit memo")?;
        Ok(credit_memo_to_canonical(&native, self.namespace, self.default_currency))
    }
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "test code uses unreachable for expected-path assertions"
)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{BridgeError, HttpMethod};

    fn absent(status: u16) -> BridgeError {
        BridgeError::Transport {
            status,
            method: HttpMethod::Get,
            endpoint: "/returns".to_owned(),
            message: "missing".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let calls = AtomicUsize::new(0);
        let result = with_capability_fallback("test", async { Ok(1) }, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(2)
        })
        .await
        .unwrap();

        assert_eq!(result, (Backend::Modern, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_and_forbidden_fall_back() {
        for status in [404, 403] {
            let result =
                with_capability_fallback("test", async { Err::<i32, _>(absent(status)) }, || async {
                    Ok(2)
                })
                .await
                .unwrap();
            assert_eq!(result, (Backend::Legacy, 2));
        }
    }

    #[tokio::test]
    async fn test_other_failures_propagate() {
        let calls = AtomicUsize::new(0);
        let result = with_capability_fallback("test", async { Err::<i32, _>(absent(500)) }, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(2)
        })
        .await;

        assert!(matches!(result, Err(BridgeError::Transport { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_timeout_does_not_fall_back() {
        let result = with_capability_fallback(
            "test",
            async {
                Err::<i32, _>(BridgeError::Timeout {
                    method: HttpMethod::Get,
                    endpoint: "/returns".to_owned(),
                })
            },
            || async { Ok(2) },
        )
        .await;
        assert!(matches!(result, Err(BridgeError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_fallback_error_is_returned() {
        let Err(error) = with_capability_fallback(
            "test",
            async { Err::<i32, _>(absent(404)) },
            || async { Err(BridgeError::Response("broken".to_owned())) },
        )
        .await
        else {
            unreachable!("expected fallback error")
        };
        assert!(matches!(error, BridgeError::Response(_)));
    }
}
