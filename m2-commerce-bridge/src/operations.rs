//! Canonical commerce operations.
//!
//! [`CommerceBridge`] exposes the twelve canonical operations. Each one exists twice:
//!
//! - `try_*` returns `Result<T>` for embedding code that wants typed errors;
//! - the plain method folds that result into an [`OperationResponse`], the uniform
//!   `{success, …}` / `{success: false, error}` envelope. Nothing escapes it.
//!
//! Every operation is one async unit issuing sequential transport calls. The bridge holds
//! only immutable configuration, so one instance can serve concurrent callers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use m2_commerce_bridge::{
//!     config::BridgeConfig,
//!     models::GetOrdersParams,
//!     operations::CommerceBridge,
//! };
//!
//! # async fn example() -> m2_commerce_bridge::error::Result<()> {
//! let mut config = BridgeConfig::new("https://shop.example.com");
//! config.access_token = Some("integration-token".to_owned());
//! let bridge = CommerceBridge::new(config)?;
//!
//! let params = GetOrdersParams { statuses: vec!["pending".to_owned()], ..Default::default() };
//! let response = bridge.get_orders(&params).await;
//! println!("{}", serde_json::to_string(&response).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::{fmt, path::Path, str::FromStr};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::{BridgeConfig, FieldNamespace},
    criteria::{
        ConditionType, ExtraFilter, QueryWindow, SearchCriteria, build_search_criteria, ids_filter,
    },
    envelope::{
        CustomersPayload, FulfillmentPayload, FulfillmentsPayload, InventoryPayload,
        OperationResponse, OrderPayload, OrdersPayload, ProductsPayload, ReturnPayload,
        ReturnsPayload, VariantsPayload,
    },
    error::{BridgeError, Result},
    models::{
        CancelOrderParams, Customer, FulfillOrderParams, Fulfillment, GetCustomersParams,
        GetFulfillmentsParams, GetInventoryParams, GetOrdersParams, GetProductVariantsParams,
        GetProductsParams, GetReturnsParams, InventoryRecord, Order, OrderDraft, Product, Return,
        ReturnDraft, UpdateOrderParams, Variant,
    },
    native::{
        NativeAttributeMetadata, NativeCustomer, NativeOrder, NativeProduct, NativeShipment,
        NativeSourceItem, NativeStockItem, SearchResult,
    },
    returns::{ReturnsResolver, with_capability_fallback},
    transport::{HttpTransport, Transport, encode_path},
    translate::{
        ParentOption, VariantContext, customer,
        common::{from_response, id_from_response},
        fulfillment, inventory, order, product, resolve_for_children,
    },
};

/// Page size of multi-source inventory lookups.
const INVENTORY_PAGE_SIZE: u32 = 100;

/// Order comment used when a cancellation carries neither reason nor notes.
const CANCELLED_COMMENT: &str = "Order canceled";

/// The twelve canonical operations, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create-order`
    CreateOrder,
    /// `update-order`
    UpdateOrder,
    /// `cancel-order`
    CancelOrder,
    /// `fulfill-order`
    FulfillOrder,
    /// `create-return`
    CreateReturn,
    /// `get-orders`
    GetOrders,
    /// `get-customers`
    GetCustomers,
    /// `get-products`
    GetProducts,
    /// `get-product-variants`
    GetProductVariants,
    /// `get-inventory`
    GetInventory,
    /// `get-fulfillments`
    GetFulfillments,
    /// `get-returns`
    GetReturns,
}

impl Operation {
    /// Every operation, actions first.
    pub const ALL: [Self; 12] = [
        Self::CreateOrder,
        Self::UpdateOrder,
        Self::CancelOrder,
        Self::FulfillOrder,
        Self::CreateReturn,
        Self::GetOrders,
        Self::GetCustomers,
        Self::GetProducts,
        Self::GetProductVariants,
        Self::GetInventory,
        Self::GetFulfillments,
        Self::GetReturns,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateOrder => "create-order",
            Self::UpdateOrder => "update-order",
            Self::CancelOrder => "cancel-order",
            Self::FulfillOrder => "fulfill-order",
            Self::CreateReturn => "create-return",
            Self::GetOrders => "get-orders",
            Self::GetCustomers => "get-customers",
            Self::GetProducts => "get-products",
            Self::GetProductVariants => "get-product-variants",
            Self::GetInventory => "get-inventory",
            Self::GetFulfillments => "get-fulfillments",
            Self::GetReturns => "get-returns",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BridgeError::InvalidInput(format!("unknown operation: {s}")))
    }
}

/// Commerce adapter over the platform's REST API.
#[derive(Debug)]
pub struct CommerceBridge<T: Transport = HttpTransport> {
    config: BridgeConfig,
    namespace: FieldNamespace,
    transport: T,
}

impl CommerceBridge<HttpTransport> {
    /// Creates a bridge talking HTTP to the configured platform.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::assemble(config, transport))
    }

    /// Creates a bridge from a TOML configuration string.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration cannot be parsed or is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Self::new(BridgeConfig::from_toml(toml_str)?)
    }

    /// Creates a bridge from a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the configuration is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(BridgeConfig::from_file(path)?)
    }
}

impl<T: Transport> CommerceBridge<T> {
    /// Creates a bridge over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn with_transport(config: BridgeConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: BridgeConfig, transport: T) -> Self {
        let namespace = config.field_namespace();
        Self { config, namespace, transport }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn currency(&self) -> &str {
        &self.config.default_currency
    }

    fn returns(&self) -> ReturnsResolver<'_, T> {
        ReturnsResolver::new(&self.transport, &self.namespace, self.currency())
    }

    /// Runs an operation by wire name with JSON arguments and returns the JSON envelope.
    ///
    /// Arguments that do not match the operation's parameter shape produce a failure
    /// envelope without any transport call.
    #[instrument(skip(self, args))]
    pub async fn execute(&self, operation: &str, args: Value) -> Value {
        let Ok(op) = operation.parse::<Operation>() else {
            return envelope_json(&OperationResponse::<Value>::from_result(
                operation,
                Err(BridgeError::InvalidInput(format!("unknown operation: {operation}"))),
            ));
        };

        match op {
            Operation::CreateOrder => match parse_args::<OrderDraft>(op, args) {
                Ok(draft) => envelope_json(&self.create_order(&draft).await),
                Err(e) => failure_json::<OrderPayload>(op, e),
            },
            Operation::UpdateOrder => match parse_args::<UpdateOrderParams>(op, args) {
                Ok(params) => envelope_json(&self.update_order(&params).await),
                Err(e) => failure_json::<OrderPayload>(op, e),
            },
            Operation::CancelOrder => match parse_args::<CancelOrderParams>(op, args) {
                Ok(params) => envelope_json(&self.cancel_order(&params).await),
                Err(e) => failure_json::<OrderPayload>(op, e),
            },
            Operation::FulfillOrder => match parse_args::<FulfillOrderParams>(op, args) {
                Ok(params) => envelope_json(&self.fulfill_order(&params).await),
                Err(e) => failure_json::<FulfillmentPayload>(op, e),
            },
            Operation::CreateReturn => match parse_args::<ReturnDraft>(op, args) {
                Ok(draft) => envelope_json(&self.create_return(&draft).await),
                Err(e) => failure_json::<ReturnPayload>(op, e),
            },
            Operation::GetOrders => match parse_args::<GetOrdersParams>(op, args) {
                Ok(params) => envelope_json(&self.get_orders(&params).await),
                Err(e) => failure_json::<OrdersPayload>(op, e),
            },
            Operation::GetCustomers => match parse_args::<GetCustomersParams>(op, args) {
                Ok(params) => envelope_json(&self.get_customers(&params).await),
                Err(e) => failure_json::<CustomersPayload>(op, e),
            },
            Operation::GetProducts => match parse_args::<GetProductsParams>(op, args) {
                Ok(params) => envelope_json(&self.get_products(&params).await),
                Err(e) => failure_json::<ProductsPayload>(op, e),
            },
            Operation::GetProductVariants => {
                match parse_args::<GetProductVariantsParams>(op, args) {
                    Ok(params) => envelope_json(&self.get_product_variants(&params).await),
                    Err(e) => failure_json::<VariantsPayload>(op, e),
                }
            }
            Operation::GetInventory => match parse_args::<GetInventoryParams>(op, args) {
                Ok(params) => envelope_json(&self.get_inventory(&params).await),
                Err(e) => failure_json::<InventoryPayload>(op, e),
            },
            Operation::GetFulfillments => match parse_args::<GetFulfillmentsParams>(op, args) {
                Ok(params) => envelope_json(&self.get_fulfillments(&params).await),
                Err(e) => failure_json::<FulfillmentsPayload>(op, e),
            },
            Operation::GetReturns => match parse_args::<GetReturnsParams>(op, args) {
                Ok(params) => envelope_json(&self.get_returns(&params).await),
                Err(e) => failure_json::<ReturnsPayload>(op, e),
            },
        }
    }

    // Actions

    /// Creates an order.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] for a draft without valid lines, otherwise
    /// transport and response errors.
    #[instrument(skip_all, fields(lines = draft.line_items.len()))]
    pub async fn try_create_order(&self, draft: &OrderDraft) -> Result<Order> {
        info!("creating order");
        let body = order::draft_to_native(draft, &self.namespace, self.currency())?;
        let value = self.transport.post("/orders", &body).await?;
        let native: NativeOrder = from_response(value, "order")?;
        Ok(order::to_canonical(&native, &self.namespace, true))
    }

    /// `create-order` envelope.
    pub async fn create_order(&self, draft: &OrderDraft) -> OperationResponse<OrderPayload> {
        let result = self.try_create_order(draft).await.map(|order| OrderPayload { order });
        OperationResponse::from_result(Operation::CreateOrder.as_str(), result)
    }

    /// Updates an order's addresses, status or notes and returns the updated order.
    ///
    /// Addresses are saved one by one, keeping the native address ids; status and notes
    /// become one order comment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when the update changes nothing, otherwise
    /// transport and response errors.
    #[instrument(skip_all, fields(order_id = %params.id))]
    pub async fn try_update_order(&self, params: &UpdateOrderParams) -> Result<Order> {
        info!("updating order");
        let updates = &params.updates;
        if updates.is_empty() {
            return Err(BridgeError::Validation(
                "update-order requires at least one of billingAddress, shippingAddress, \
                 status or notes"
                    .to_owned(),
            ));
        }
        let order_path = encode_path(&["orders", &params.id])?;

        if updates.billing_address.is_some() || updates.shipping_address.is_some() {
            let current = self.fetch_order(&order_path).await?;
            let changes = [
                ("billing", updates.billing_address.as_ref(), current.billing_address.as_ref()),
                ("shipping", updates.shipping_address.as_ref(), current.shipping_address()),
            ];
            for (address_type, address, existing) in changes {
                let Some(address) = address else { continue };
                let body = order::address_update_to_native(&params.id, address, address_type, existing)?;
                self.transport.put(&order_path, &body).await?;
                debug!(address_type, "order address saved");
            }
        }

        if updates.status.is_some() || updates.notes.is_some() {
            let comment = updates.notes.clone().unwrap_or_else(|| {
                format!("Status changed to {}", updates.status.as_deref().unwrap_or_default())
            });
            let body = order::comment_to_native(
                &params.id,
                &comment,
                updates.status.as_deref(),
                updates.notify_customer,
            );
            self.transport.post(&encode_path(&["orders", &params.id, "comments"])?, &body).await?;
        }

        Ok(order::to_canonical(&self.fetch_order(&order_path).await?, &self.namespace, true))
    }

    /// `update-order` envelope.
    pub async fn update_order(&self, params: &UpdateOrderParams) -> OperationResponse<OrderPayload> {
        let result = self.try_update_order(params).await.map(|order| OrderPayload { order });
        OperationResponse::from_result(Operation::UpdateOrder.as_str(), result)
    }

    /// Cancels an order, records the reason as a comment and returns the order.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Response`] when the platform refuses the cancellation,
    /// otherwise transport and response errors.
    #[instrument(skip_all, fields(order_id = %params.order_id))]
    pub async fn try_cancel_order(&self, params: &CancelOrderParams) -> Result<Order> {
        info!("canceling order");
        let cancel_path = encode_path(&["orders", &params.order_id, "cancel"])?;
        let accepted = self.transport.post(&cancel_path, &json!({})).await?;
        if accepted == Value::Bool(false) {
            return Err(BridgeError::Response(format!(
                "platform refused to cancel order {}",
                params.order_id
            )));
        }

        let comment = cancellation_comment(params.reason.as_deref(), params.notes.as_deref());
        if comment.is_some() || params.notify_customer {
            let comment = comment.unwrap_or_else(|| CANCELLED_COMMENT.to_owned());
            let body =
                order::comment_to_native(&params.order_id, &comment, None, params.notify_customer);
            let comments_path = encode_path(&["orders", &params.order_id, "comments"])?;
            self.transport.post(&comments_path, &body).await?;
        }

        let native = self.fetch_order(&encode_path(&["orders", &params.order_id])?).await?;
        Ok(order::to_canonical(&native, &self.namespace, true))
    }

    /// `cancel-order` envelope.
    pub async fn cancel_order(&self, params: &CancelOrderParams) -> OperationResponse<OrderPayload> {
        let result = self.try_cancel_order(params).await.map(|order| OrderPayload { order });
        OperationResponse::from_result(Operation::CancelOrder.as_str(), result)
    }

    /// Ships order lines and returns the created fulfillment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] for a zero quantity, otherwise transport and
    /// response errors.
    #[instrument(skip_all, fields(order_id = %params.order_id))]
    pub async fn try_fulfill_order(&self, params: &FulfillOrderParams) -> Result<Fulfillment> {
        info!("fulfilling order");
        let body = fulfillment::request_to_native(params)?;
        let ship_path = encode_path(&["order", &params.order_id, "ship"])?;
        let shipment_id = id_from_response(&self.transport.post(&ship_path, &body).await?, "shipment")?;
        debug!(%shipment_id, "shipment created");

        let value = self.transport.get(&encode_path(&["shipment", &shipment_id])?, None).await?;
        let native: NativeShipment = from_response(value, "shipment")?;
        Ok(fulfillment::to_canonical(&native, &self.namespace))
    }

    /// `fulfill-order` envelope.
    pub async fn fulfill_order(
        &self,
        params: &FulfillOrderParams,
    ) -> OperationResponse<FulfillmentPayload> {
        let result = self
            .try_fulfill_order(params)
            .await
            .map(|fulfillment| FulfillmentPayload { fulfillment });
        OperationResponse::from_result(Operation::FulfillOrder.as_str(), result)
    }

    /// Creates a return: an RMA where the platform supports them, a refund otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] for a draft without valid lines, otherwise
    /// errors of the serving backend.
    #[instrument(skip_all, fields(order_id = %draft.order_id))]
    pub async fn try_create_return(&self, draft: &ReturnDraft) -> Result<Return> {
        info!("creating return");
        self.returns().create(draft).await
    }

    /// `create-return` envelope.
    pub async fn create_return(&self, draft: &ReturnDraft) -> OperationResponse<ReturnPayload> {
        let result = self.try_create_return(draft).await.map(|created| ReturnPayload { created });
        OperationResponse::from_result(Operation::CreateReturn.as_str(), result)
    }

    // Queries

    /// Queries orders.
    ///
    /// `externalIds` and `names` both match the order number; a leading `#` on a name is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns transport and response errors.
    #[instrument(skip_all)]
    pub async fn try_get_orders(&self, params: &GetOrdersParams) -> Result<Vec<Order>> {
        info!("querying orders");
        let numbers: Vec<&str> = params
            .external_ids
            .iter()
            .map(String::as_str)
            .chain(params.names.iter().map(|name| name.trim_start_matches('#')))
            .collect();
        let filters = [
            ids_filter("entity_id", &params.ids),
            ids_filter("increment_id", &numbers),
            ids_filter("status", &params.statuses),
        ];

        let orders: Vec<NativeOrder> = self.search("/orders", &params.window, filters, "order search").await?;
        Ok(orders
            .iter()
            .map(|native| order::to_canonical(native, &self.namespace, params.include_line_items))
            .collect())
    }

    /// `get-orders` envelope.
    pub async fn get_orders(&self, params: &GetOrdersParams) -> OperationResponse<OrdersPayload> {
        let result = self.try_get_orders(params).await.map(|orders| OrdersPayload { orders });
        OperationResponse::from_result(Operation::GetOrders.as_str(), result)
    }

    /// Queries customers.
    ///
    /// # Errors
    ///
    /// Returns transport and response errors.
    #[instrument(skip_all)]
    pub async fn try_get_customers(&self, params: &GetCustomersParams) -> Result<Vec<Customer>> {
        info!("querying customers");
        let filters = [ids_filter("entity_id", &params.ids), ids_filter("email", &params.emails)];
        let customers: Vec<NativeCustomer> =
            self.search("/customers/search", &params.window, filters, "customer search").await?;
        Ok(customers.iter().map(|native| customer::to_canonical(native, &self.namespace)).collect())
    }

    /// `get-customers` envelope.
    pub async fn get_customers(
        &self,
        params: &GetCustomersParams,
    ) -> OperationResponse<CustomersPayload> {
        let result =
            self.try_get_customers(params).await.map(|customers| CustomersPayload { customers });
        OperationResponse::from_result(Operation::GetCustomers.as_str(), result)
    }

    /// Queries products.
    ///
    /// # Errors
    ///
    /// Returns transport and response errors.
    #[instrument(skip_all)]
    pub async fn try_get_products(&self, params: &GetProductsParams) -> Result<Vec<Product>> {
        info!("querying products");
        let filters = [ids_filter("entity_id", &params.ids), ids_filter("sku", &params.skus)];
        let products: Vec<NativeProduct> =
            self.search("/products", &params.window, filters, "product search").await?;
        Ok(products
            .iter()
            .map(|native| product::to_canonical(native, &self.namespace, self.currency()))
            .collect())
    }

    /// `get-products` envelope.
    pub async fn get_products(&self, params: &GetProductsParams) -> OperationResponse<ProductsPayload> {
        let result = self.try_get_products(params).await.map(|products| ProductsPayload { products });
        OperationResponse::from_result(Operation::GetProducts.as_str(), result)
    }

    /// Queries variants.
    ///
    /// With `productIds`, each parent is resolved on its own: its configurable options,
    /// their attribute codes and its children. A parent that fails is logged and left
    /// out; the others still contribute. `ids` and `skus` then filter the children, and
    /// the temporal window does not apply.
    ///
    /// Without `productIds`, simple products are searched directly and carry their own
    /// SKU as `externalProductId`.
    ///
    /// # Errors
    ///
    /// Returns transport and response errors of the direct search. Per-parent failures
    /// are never returned.
    #[instrument(skip_all, fields(parents = params.product_ids.len()))]
    pub async fn try_get_product_variants(
        &self,
        params: &GetProductVariantsParams,
    ) -> Result<Vec<Variant>> {
        info!("querying product variants");
        if params.product_ids.is_empty() {
            let filters = [
                Some(ExtraFilter::eq("type_id", "simple")),
                ids_filter("entity_id", &params.ids),
                ids_filter("sku", &params.skus),
            ];
            let products: Vec<NativeProduct> =
                self.search("/products", &params.window, filters, "product search").await?;
            return Ok(products
                .iter()
                .map(|native| {
                    product::variant_to_canonical(
                        native,
                        &self.namespace,
                        VariantContext::orphan(self.currency()),
                    )
                })
                .collect());
        }

        let mut variants = Vec::new();
        for product_id in &params.product_ids {
            match self.parent_variants(product_id, params).await {
                Ok(found) => variants.extend(found),
                Err(e) => warn!(%product_id, error = %e, "skipping parent product"),
            }
        }
        Ok(variants)
    }

    /// `get-product-variants` envelope.
    pub async fn get_product_variants(
        &self,
        params: &GetProductVariantsParams,
    ) -> OperationResponse<VariantsPayload> {
        let result =
            self.try_get_product_variants(params).await.map(|variants| VariantsPayload { variants });
        OperationResponse::from_result(Operation::GetProductVariants.as_str(), result)
    }

    /// Reads inventory for the given SKUs.
    ///
    /// Multi-source stock is read first. Deployments without it answer `404`/`403`, and
    /// then the legacy single stock is read SKU by SKU; a SKU the platform does not know
    /// (`404`) is logged and left out, any other failure ends the call.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] before any call when `skus` is empty,
    /// otherwise errors of the serving backend.
    #[instrument(skip_all, fields(skus = params.skus.len()))]
    pub async fn try_get_inventory(&self, params: &GetInventoryParams) -> Result<Vec<InventoryRecord>> {
        info!("querying inventory");
        if params.skus.is_empty() {
            return Err(BridgeError::Validation("get-inventory requires at least one SKU".to_owned()));
        }

        let (backend, records) = with_capability_fallback(
            "inventory",
            self.source_items(params),
            || self.stock_items(params),
        )
        .await?;
        debug!(?backend, count = records.len(), "inventory resolved");
        Ok(records)
    }

    /// `get-inventory` envelope.
    pub async fn get_inventory(&self, params: &GetInventoryParams) -> OperationResponse<InventoryPayload> {
        let result = self.try_get_inventory(params).await.map(|inventory| InventoryPayload { inventory });
        OperationResponse::from_result(Operation::GetInventory.as_str(), result)
    }

    /// Queries fulfillments.
    ///
    /// # Errors
    ///
    /// Returns transport and response errors.
    #[instrument(skip_all)]
    pub async fn try_get_fulfillments(
        &self,
        params: &GetFulfillmentsParams,
    ) -> Result<Vec<Fulfillment>> {
        info!("querying fulfillments");
        let filters = [ids_filter("entity_id", &params.ids), ids_filter("order_id", &params.order_ids)];
        let shipments: Vec<NativeShipment> =
            self.search("/shipments", &params.window, filters, "shipment search").await?;
        Ok(shipments.iter().map(|native| fulfillment::to_canonical(native, &self.namespace)).collect())
    }

    /// `get-fulfillments` envelope.
    pub async fn get_fulfillments(
        &self,
        params: &GetFulfillmentsParams,
    ) -> OperationResponse<FulfillmentsPayload> {
        let result = self
            .try_get_fulfillments(params)
            .await
            .map(|fulfillments| FulfillmentsPayload { fulfillments });
        OperationResponse::from_result(Operation::GetFulfillments.as_str(), result)
    }

    /// Queries returns from RMAs, or from credit memos where RMAs do not exist.
    ///
    /// # Errors
    ///
    /// Returns errors of the serving backend.
    #[instrument(skip_all)]
    pub async fn try_get_returns(&self, params: &GetReturnsParams) -> Result<Vec<Return>> {
        info!("querying returns");
        self.returns().query(params).await
    }

    /// `get-returns` envelope.
    pub async fn get_returns(&self, params: &GetReturnsParams) -> OperationResponse<ReturnsPayload> {
        let result = self.try_get_returns(params).await.map(|returns| ReturnsPayload { returns });
        OperationResponse::from_result(Operation::GetReturns.as_str(), result)
    }

    // Internals

    async fn search<N, const F: usize>(
        &self,
        path: &str,
        window: &QueryWindow,
        filters: [Option<ExtraFilter>; F],
        what: &str,
    ) -> Result<Vec<N>>
    where
        N: DeserializeOwned,
    {
        let criteria = build_search_criteria(window, filters.into_iter().flatten().collect())?;
        let value = self.transport.get(path, Some(&criteria)).await?;
        let result: SearchResult<N> = from_response(value, what)?;
        debug!(path, count = result.items.len(), total = ?result.total_count, "search returned");
        Ok(result.items)
    }

    async fn fetch_order(&self, path: &str) -> Result<NativeOrder> {
        from_response(self.transport.get(path, None).await?, "order")
    }

    async fn parent_variants(
        &self,
        product_id: &str,
        params: &GetProductVariantsParams,
    ) -> Result<Vec<Variant>> {
        let criteria = SearchCriteria::single("entity_id", product_id, ConditionType::Eq);
        let value = self.transport.get("/products", Some(&criteria)).await?;
        let found: SearchResult<NativeProduct> = from_response(value, "product search")?;
        let parent = found
            .items
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Response(format!("product {product_id} not found")))?;
        let sku = parent
            .sku
            .as_deref()
            .ok_or_else(|| BridgeError::Response(format!("product {product_id} has no SKU")))?;

        let mut options = Vec::new();
        for native in parent.configurable_options() {
            options.push(self.with_attribute_code(ParentOption::from_native(native)).await);
        }

        let value = self.transport.get(&encode_path(&["configurable-products", sku, "children"])?, None).await?;
        let children: Vec<NativeProduct> = from_response(value, "configurable children")?;
        let parent_id = parent.id.as_deref().unwrap_or(product_id);

        Ok(resolve_for_children(&options, &children)
            .into_iter()
            .filter(|(child, _)| child_matches(child, params))
            .map(|(child, resolved)| {
                product::variant_to_canonical(
                    child,
                    &self.namespace,
                    VariantContext {
                        currency: self.currency(),
                        parent_id: Some(parent_id),
                        selected_options: &resolved.selected,
                    },
                )
            })
            .collect())
    }

    /// Looks up the real attribute code; on failure the label-derived key applies.
    async fn with_attribute_code(&self, option: ParentOption) -> ParentOption {
        if option.attribute_code.is_some() || option.attribute_id.is_empty() {
            return option;
        }
        match self.attribute_metadata(&option.attribute_id).await {
            Ok(NativeAttributeMetadata { attribute_code: Some(code), .. }) if !code.trim().is_empty() => {
                option.with_code(code)
            }
            Ok(_) => option,
            Err(e) => {
                debug!(attribute_id = %option.attribute_id, error = %e, "attribute code lookup failed");
                option
            }
        }
    }

    async fn attribute_metadata(&self, attribute_id: &str) -> Result<NativeAttributeMetadata> {
        let path = encode_path(&["products", "attributes", attribute_id])?;
        from_response(self.transport.get(&path, None).await?, "attribute")
    }

    async fn stock_item(&self, sku: &str) -> Result<NativeStockItem> {
        let path = encode_path(&["stockItems", sku])?;
        from_response(self.transport.get(&path, None).await?, "stock item")
    }

    async fn source_items(&self, params: &GetInventoryParams) -> Result<Vec<InventoryRecord>> {
        let window = QueryWindow { page_size: Some(INVENTORY_PAGE_SIZE), ..QueryWindow::default() };
        let filters = [ids_filter("sku", &params.skus), ids_filter("source_code", &params.location_ids)];
        let mut criteria = build_search_criteria(&window, filters.into_iter().flatten().collect())?;
        criteria.sort_orders = None;

        let value = self.transport.get("/inventory/source-items", Some(&criteria)).await?;
        let result: SearchResult<NativeSourceItem> = from_response(value, "source item search")?;
        Ok(result
            .items
            .iter()
            .map(|item| inventory::source_item_to_canonical(item, &self.namespace))
            .collect())
    }

    async fn stock_items(&self, params: &GetInventoryParams) -> Result<Vec<InventoryRecord>> {
        let mut records = Vec::new();
        for sku in &params.skus {
            match self.stock_item(sku).await {
                Ok(item) => {
                    let location_allowed = params.location_ids.is_empty()
                        || item.stock_id.as_ref().is_some_and(|id| params.location_ids.contains(id));
                    if location_allowed {
                        records.push(inventory::stock_item_to_canonical(sku, &item, &self.namespace));
                    }
                }
                Err(e) if e.status() == Some(404) => warn!(%sku, error = %e, "skipping unknown SKU"),
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}

fn child_matches(child: &NativeProduct, params: &GetProductVariantsParams) -> bool {
    let id_ok = params.ids.is_empty() || child.id.as_ref().is_some_and(|id| params.ids.contains(id));
    let sku_ok =
        params.skus.is_empty() || child.sku.as_ref().is_some_and(|sku| params.skus.contains(sku));
    id_ok && sku_ok
}

fn cancellation_comment(reason: Option<&str>, notes: Option<&str>) -> Option<String> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    match (reason, notes) {
        (Some(reason), Some(notes)) => Some(format!("Cancellation reason: {reason}\n{notes}")),
        (Some(reason), None) => Some(format!("Cancellation reason: {reason}")),
        (None, Some(notes)) => Some(notes.to_owned()),
        (None, None) => None,
    }
}

fn parse_args<P: DeserializeOwned>(op: Operation, args: Value) -> Result<P> {
    serde_json::from_value(args)
        .map_err(|e| BridgeError::InvalidInput(format!("invalid arguments for {op}: {e}")))
}

fn failure_json<P: Serialize>(op: Operation, error: BridgeError) -> Value {
    envelope_json(&OperationResponse::<P>::from_result(op.as_str(), Err(error)))
}

fn envelope_json<P: Serialize>(response: &OperationResponse<P>) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        json!({ "success": false, "error": format!("cannot encode response: {e}") })
    })
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "test code uses unreachable for expected-path assertions"
)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("delete-order".parse::<Operation>().is_err());
    }

    #[test]
    fn test_cancellation_comment() {
        assert_eq!(
            cancellation_comment(Some("fraud"), Some("called customer")).as_deref(),
            Some("Cancellation reason: fraud\ncalled customer")
        );
        assert_eq!(
            cancellation_comment(Some("fraud"), None).as_deref(),
            Some("Cancellation reason: fraud")
        );
        assert_eq!(cancellation_comment(None, Some("dup")).as_deref(), Some("dup"));
        assert_eq!(cancellation_comment(Some("  "), None), None);
    }

    #[test]
    fn test_child_matches_filters() {
        let child: NativeProduct =
            serde_json::from_value(json!({"id": 11, "sku": "MB01-red"})).unwrap();

        assert!(child_matches(&child, &GetProductVariantsParams::default()));
        let by_sku = GetProductVariantsParams { skus: vec!["MB01-red".to_owned()], ..Default::default() };
        assert!(child_matches(&child, &by_sku));
        let by_id = GetProductVariantsParams { ids: vec!["12".to_owned()], ..Default::default() };
        assert!(!child_matches(&child, &by_id));
    }

    #[test]
    fn test_parse_args_error_is_invalid_input() {
        let Err(BridgeError::InvalidInput(msg)) =
            parse_args::<ReturnDraft>(Operation::CreateReturn, json!({"orderId": 7}))
        else {
            unreachable!("expected InvalidInput")
        };
        assert!(msg.contains("create-return"));
    }
}
