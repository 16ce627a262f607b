use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Error, Result};

/// CORS for the dashboard front end: one configured origin, or any origin when unset.
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match allowed_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|e| Error::Config(format!("CORS_ALLOWED_ORIGIN is invalid: {}", e)))?;
            Ok(layer.allow_origin(origin))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_origin() {
        assert!(cors_layer(Some("http://localhost:5173")).is_ok());
        assert!(cors_layer(None).is_ok());
    }

    #[test]
    fn rejects_an_origin_with_control_characters() {
        assert!(matches!(
            cors_layer(Some("http://bad\norigin")),
            Err(Error::Config(_))
        ));
    }
}
