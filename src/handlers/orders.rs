use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::errors::AppError;

use super::{parse_order_id, AppState};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub item: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub item: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub item: String,
    pub quantity: i32,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id(),
            item: order.item().to_string(),
            quantity: order.quantity(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GetOrderResponse {
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderResponse {
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteOrderResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order with a server-assigned id.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid order data"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let order = state
        .within_deadline(state.orders.create_order(body.item, body.quantity))
        .await?;

    Ok(HttpResponse::Created().json(CreateOrderResponse { id: order.id() }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = GetOrderResponse),
        (status = 400, description = "Malformed order id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_order_id(&path)?;
    let order = state.within_deadline(state.orders.get_order(id)).await?;

    Ok(HttpResponse::Ok().json(GetOrderResponse {
        order: order.into(),
    }))
}

/// PUT /orders/{id}
///
/// Replaces the item and quantity of an existing order.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = UpdateOrderResponse),
        (status = 400, description = "Malformed order id or invalid order data"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_order_id(&path)?;
    let body = body.into_inner();
    let order = state
        .within_deadline(state.orders.update_order(id, body.item, body.quantity))
        .await?;

    Ok(HttpResponse::Ok().json(UpdateOrderResponse {
        order: order.into(),
    }))
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order deleted", body = DeleteOrderResponse),
        (status = 400, description = "Malformed order id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_order_id(&path)?;
    state.within_deadline(state.orders.delete_order(id)).await?;

    Ok(HttpResponse::Ok().json(DeleteOrderResponse { success: true }))
}

/// GET /orders
///
/// Returns every order, ascending by id.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let orders = state.within_deadline(state.orders.list_orders()).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}
