//! Origin allow-list applied to WebSocket upgrades.

use axum::http::HeaderMap;
use axum::http::header::ORIGIN;

use roomchat_core::error::AppError;

/// Which `Origin` headers may open a WebSocket.
///
/// `"*"` in the list allows any origin. A request without an `Origin`
/// header is not from a browser and is allowed.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allow_any: bool,
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Build a policy from configured origins.
    pub fn new(origins: &[String]) -> Self {
        Self {
            allow_any: origins.iter().any(|o| o == "*"),
            allowed: origins.iter().map(|o| normalize(o).to_string()).collect(),
        }
    }

    /// Whether `origin` may connect.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allow_any || self.allowed.iter().any(|o| o == normalize(origin))
    }

    /// Check the request headers, failing with an authorization error.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let Some(value) = headers.get(ORIGIN) else {
            return Ok(());
        };
        let origin = value
            .to_str()
            .map_err(|_| AppError::authorization("Origin header is not valid text"))?;

        if self.is_allowed(origin) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Origin '{origin}' is not allowed"
            )))
        }
    }
}

fn normalize(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}
