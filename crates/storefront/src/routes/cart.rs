//! Cart route handlers.
//!
//! Cart mutations are plain form posts that redirect back to the cart page.
//! Failures travel along as an `error` query parameter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{instrument, warn};

use super::Layout;
use crate::filters;
use crate::middleware::CspNonce;
use crate::services::{CartActionError, CartService};
use crate::shopware::Cart;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: Option<String>,
    pub variant_id: Option<String>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: Option<String>,
}

/// Cart page query.
#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    pub error: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub cart: Option<Cart>,
    pub error: Option<String>,
}

impl CartTemplate {
    fn filled_cart(&self) -> Option<&Cart> {
        self.cart.as_ref().filter(|cart| !cart.is_empty())
    }
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Redirect to the cart page, carrying the action error if there is one.
fn back_to_cart(result: Result<(), CartActionError>) -> Redirect {
    match result {
        Ok(()) => Redirect::to("/cart"),
        Err(e) => {
            warn!(error = %e, "Cart action failed");
            Redirect::to(&format!(
                "/cart?error={}",
                urlencoding::encode(&e.to_string())
            ))
        }
    }
}

/// Display cart page. Creates a context so later actions have a token.
#[instrument(skip(state, cookies, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
    cookies: Cookies,
    nonce: CspNonce,
) -> CartTemplate {
    state.cart().create_cart_and_set_cookie(&cookies).await;

    let (layout, cart) = tokio::join!(
        Layout::load(&state, &cookies, nonce),
        state.cart().get_cart(&cookies),
    );

    CartTemplate {
        layout,
        cart,
        error: query.error.filter(|e| !e.is_empty()),
    }
}

/// Add one unit of a variant.
#[instrument(skip(state, cookies))]
pub async fn add(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    back_to_cart(
        state
            .cart()
            .add_item(&cookies, form.variant_id.as_deref())
            .await,
    )
}

/// Change the quantity of a line. Zero removes it.
#[instrument(skip(state, cookies))]
pub async fn update(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    back_to_cart(
        state
            .cart()
            .update_item_quantity(
                &cookies,
                form.line_id.as_deref(),
                form.variant_id.as_deref(),
                form.quantity,
            )
            .await,
    )
}

/// Remove a line.
#[instrument(skip(state, cookies))]
pub async fn remove(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    back_to_cart(
        state
            .cart()
            .remove_item(&cookies, form.line_id.as_deref())
            .await,
    )
}

/// Cart count badge fragment.
#[instrument(skip(state, cookies))]
pub async fn count(State(state): State<AppState>, cookies: Cookies) -> CartCountTemplate {
    let count = if CartService::context_token(&cookies).is_some() {
        state
            .cart()
            .get_cart(&cookies)
            .await
            .map_or(0, |cart| cart.total_quantity)
    } else {
        0
    };

    CartCountTemplate { count }
}

/// Redirect to the checkout.
#[instrument(skip(state, cookies))]
pub async fn checkout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    match state.cart().redirect_to_checkout(&cookies).await {
        Ok(url) => Redirect::to(&url),
        Err(e) => back_to_cart(Err(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};

    use crate::routes::tests::{get, send};

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_without_cart_redirects_with_error() {
        let (status, headers, _) = send(form_post("/cart/add", "variant_id=v1")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "/cart?error=Could%20not%20get%20cart"
        );
    }

    #[tokio::test]
    async fn test_remove_without_cookie() {
        let (_, headers, _) = send(form_post("/cart/remove", "line_id=l1")).await;
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "/cart?error=Cart%20ID%20is%20missing"
        );
    }

    #[tokio::test]
    async fn test_update_with_cookie_reports_failure() {
        let mut request = form_post("/cart/update", "line_id=l1&variant_id=v1&quantity=2");
        request
            .headers_mut()
            .insert(header::COOKIE, "sw-context-token=ctx".parse().unwrap());
        let (_, headers, _) = send(request).await;
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "/cart?error=Error%20updating%20item%20quantity"
        );
    }

    #[tokio::test]
    async fn test_checkout_without_cookie() {
        let (status, headers, _) = get("/checkout").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "/cart?error=Missing%20cart%20ID"
        );
    }

    #[tokio::test]
    async fn test_cart_count_fragment() {
        let (status, _, body) = get("/cart/count").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains('0'));
    }

    #[tokio::test]
    async fn test_cart_page_shows_error() {
        let (status, _, body) = get("/cart?error=Missing%20cart%20ID").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Missing cart ID"));
        assert!(body.contains("Your cart is empty"));
    }
}
