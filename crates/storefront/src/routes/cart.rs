//! Cart route handlers.
//!
//! Each session owns a cart token stored in the session; the token names the
//! cart in the registry and in storage. Every handler returns the cart as it
//! stands after the operation.
//!
//! Changes write through to storage, so they run on the blocking pool with the
//! cart's lock held.

use axum::{Json, extract::State};
use campus_market_core::{
    CartError, CartLineItem, CartProduct, CartProductInput, CurrencyCode, LineKey, ProductId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartToken, SessionCart, SessionCartStore};
use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// One cart line as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartLineItem,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub line_total: Decimal,
    pub formatted_line_total: String,
}

/// The cart as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
    pub formatted_total: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            formatted_total: currency.format(Decimal::ZERO),
            item_count: 0,
        }
    }

    /// Render a store's current state.
    #[must_use]
    pub fn from_store(store: &SessionCartStore, currency: CurrencyCode) -> Self {
        let total = store.total();
        Self {
            items: store
                .items()
                .iter()
                .map(|item| {
                    let line_total = item.line_total();
                    CartItemView {
                        item: item.clone(),
                        line_total,
                        formatted_line_total: currency.format(line_total),
                    }
                })
                .collect(),
            total,
            formatted_total: currency.format(total),
            item_count: store.item_count(),
        }
    }
}

/// Cart count badge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

// =============================================================================
// Requests
// =============================================================================

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub quantity: Option<u32>,
}

impl AddToCartRequest {
    /// Validate into a product and a quantity (default 1).
    fn into_product(self) -> Result<(CartProduct, u32)> {
        let input = CartProductInput {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            selected_size: self.selected_size,
            selected_color: self.selected_color,
        };
        Ok((CartProduct::try_from(input)?, self.quantity.unwrap_or(1)))
    }
}

/// Update quantity request body.
///
/// `quantity` is signed so that zero and negative values reach the store's
/// "below one is ignored" rule instead of failing to parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub id: ProductId,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub quantity: i64,
}

impl UpdateQuantityRequest {
    fn key(&self) -> LineKey {
        LineKey::from_parts(
            self.id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart token from the session.
async fn get_cart_token(session: &Session) -> Result<Option<CartToken>> {
    Ok(session.get::<CartToken>(session_keys::CART_TOKEN).await?)
}

/// Get the session's cart, creating a token for sessions without one.
async fn session_cart(state: &AppState, session: &Session) -> Result<SessionCart> {
    let token = match get_cart_token(session).await? {
        Some(token) => token,
        None => {
            let token = CartToken::generate();
            session.insert(session_keys::CART_TOKEN, token).await?;
            tracing::debug!(%token, "Assigned cart token to session");
            token
        }
    };
    Ok(state.carts().cart(token).await?)
}

/// Get the session's cart only if it already has one.
async fn existing_session_cart(state: &AppState, session: &Session) -> Result<Option<SessionCart>> {
    match get_cart_token(session).await? {
        Some(token) => Ok(Some(state.carts().cart(token).await?)),
        None => Ok(None),
    }
}

/// Lock `cart` and run `op` on the blocking pool, then render the cart.
async fn change_cart<F>(cart: SessionCart, currency: CurrencyCode, op: F) -> Result<Json<CartView>>
where
    F: FnOnce(&mut SessionCartStore) -> std::result::Result<(), CartError> + Send + 'static,
{
    let mut store = cart.lock_owned().await;
    let view = tokio::task::spawn_blocking(move || {
        op(&mut *store)?;
        Ok::<_, CartError>(CartView::from_store(&*store, currency))
    })
    .await
    .map_err(|e| AppError::Internal(format!("cart task failed: {e}")))??;
    Ok(Json(view))
}

/// Apply `op` to the session's existing cart, or return an empty view.
async fn change_existing_cart<F>(
    state: &AppState,
    session: &Session,
    op: F,
) -> Result<Json<CartView>>
where
    F: FnOnce(&mut SessionCartStore) -> std::result::Result<(), CartError> + Send + 'static,
{
    let currency = state.config().currency;
    match existing_session_cart(state, session).await? {
        Some(cart) => change_cart(cart, currency, op).await,
        None => Ok(Json(CartView::empty(currency))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the session's cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let currency = state.config().currency;
    let view = match existing_session_cart(&state, &session).await? {
        Some(cart) => CartView::from_store(&*cart.lock().await, currency),
        None => CartView::empty(currency),
    };
    Ok(Json(view))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCountView>> {
    let count = match existing_session_cart(&state, &session).await? {
        Some(cart) => cart.lock().await.item_count(),
        None => 0,
    };
    Ok(Json(CartCountView { count }))
}

/// Add a product to the cart.
///
/// Creates the session's cart if it doesn't exist yet. Rejects products
/// without an `id` or `price`, zero quantities, and additions that would push
/// a quantity or the total out of range.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let (product, quantity) = request.into_product()?;
    let cart = session_cart(&state, &session).await?;

    change_cart(cart, state.config().currency, move |store| {
        store.add_to_cart(product, quantity)
    })
    .await
}

/// Set a line item's quantity. Quantities below one leave the cart unchanged.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let key = request.key();
    let quantity = if request.quantity < 1 {
        0
    } else {
        u32::try_from(request.quantity)
            .map_err(|_| AppError::BadRequest(format!("quantity {} is too large", request.quantity)))?
    };

    change_existing_cart(&state, &session, move |store| {
        store.update_quantity(&key, quantity).map(|_| ())
    })
    .await
}

/// Remove a line item.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(key): Json<LineKey>,
) -> Result<Json<CartView>> {
    let key = key.normalized();
    change_existing_cart(&state, &session, move |store| {
        store.remove_from_cart(&key);
        Ok(())
    })
    .await
}

/// Remove every line item.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    change_existing_cart(&state, &session, |store| {
        store.clear_cart();
        Ok(())
    })
    .await
}
