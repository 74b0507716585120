//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Product media is served from the Shopware host and the checkout lives on
//! the shop domain, so those origins are the only ones the policy lets in.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use super::csp::CspNonce;
use crate::config::StorefrontConfig;

/// Content security policy with the origins the storefront talks to.
#[derive(Clone, Debug)]
pub struct ContentSecurityPolicy {
    inner: Arc<PolicySources>,
}

#[derive(Debug)]
struct PolicySources {
    /// Origin serving product and category media.
    media_origin: Option<String>,
    /// Origin of the checkout form target.
    checkout_origin: Option<String>,
    upgrade_insecure: bool,
}

fn origin_of(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    match url.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

impl ContentSecurityPolicy {
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        let own_origin = origin_of(&config.base_url);
        let checkout_origin = origin_of(&config.checkout_url).filter(|o| Some(o) != own_origin.as_ref());

        Self {
            inner: Arc::new(PolicySources {
                media_origin: origin_of(&config.shopware.store_domain),
                checkout_origin,
                upgrade_insecure: config.is_secure(),
            }),
        }
    }

    /// Header value for a response, allowing inline scripts with `nonce`.
    #[must_use]
    pub fn header_value(&self, nonce: Option<&CspNonce>) -> String {
        let sources = &self.inner;
        let script_src = nonce
            .filter(|n| !n.value().is_empty())
            .map_or_else(|| "'self'".to_string(), |n| format!("'self' {}", n.source()));
        let img_src = sources
            .media_origin
            .as_ref()
            .map_or_else(|| "'self' data:".to_string(), |o| format!("'self' data: {o}"));
        let form_action = sources
            .checkout_origin
            .as_ref()
            .map_or_else(|| "'self'".to_string(), |o| format!("'self' {o}"));

        let mut policy = format!(
            "default-src 'none'; \
             script-src {script_src}; \
             style-src 'self'; \
             font-src 'self'; \
             img-src {img_src}; \
             connect-src 'self'; \
             frame-src 'none'; \
             object-src 'none'; \
             base-uri 'self'; \
             form-action {form_action}; \
             frame-ancestors 'none'"
        );
        if sources.upgrade_insecure {
            policy.push_str("; upgrade-insecure-requests");
        }
        policy
    }
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy` built by [`ContentSecurityPolicy`]
/// - `Permissions-Policy` denying device features
/// - `Cache-Control: no-store` unless the handler set its own
/// - `Cross-Origin-Opener-Policy: same-origin`
/// - `Cross-Origin-Embedder-Policy: credentialless` (media is cross-origin)
pub async fn security_headers_middleware(
    State(policy): State<ContentSecurityPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let csp = policy.header_value(request.extensions().get::<CspNonce>());
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    // Cart pages carry the context token, so default to uncached
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    response
}
