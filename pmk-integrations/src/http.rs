//! Shared HTTP plumbing for vendor adapters.

use pmk_core::{PmkError, Result, Vendor};
use pmk_telemetry::Instrument;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Per-call timeout applied to every vendor request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One `reqwest` client bound to a vendor, a base URL and a fixed header set.
///
/// Non-2xx responses become [`PmkError::VendorApi`]; network failures and timeouts become
/// [`PmkError::Transport`].
#[derive(Clone)]
pub struct VendorHttp {
    client: Client,
    vendor: Vendor,
    base_url: String,
}

impl VendorHttp {
    pub fn new(
        vendor: Vendor,
        base_url: impl Into<String>,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PmkError::Config(format!("Failed to create {vendor} HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, vendor, base_url })
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, self.request(Method::POST, path).json(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, self.request(Method::PATCH, path).json(body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let vendor = self.vendor;
        let span = pmk_telemetry::vendor_call_span(vendor.as_str(), &format!("{method} {path}"));

        async move {
            let response = request.send().await.map_err(|e| transport_error(vendor, &e))?;
            let status = response.status();
            let body = response.text().await.map_err(|e| transport_error(vendor, &e))?;

            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "{vendor} request failed");
                return Err(PmkError::VendorApi { vendor, status: status.as_u16(), body });
            }

            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(body).map_err(|e| PmkError::Transport {
                vendor,
                message: format!("unexpected response body: {e}"),
            })
        }
        .instrument(span)
        .await
    }
}

fn transport_error(vendor: Vendor, error: &reqwest::Error) -> PmkError {
    let message =
        if error.is_timeout() { format!("request timed out: {error}") } else { error.to_string() };
    PmkError::Transport { vendor, message }
}

/// Build a header map, marking `sensitive` values so they never show up in debug output.
pub fn headers(
    vendor: Vendor,
    sensitive: &[(&'static str, &str)],
    plain: &[(&'static str, &str)],
) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value, is_sensitive) in sensitive
        .iter()
        .map(|(n, v)| (*n, *v, true))
        .chain(plain.iter().map(|(n, v)| (*n, *v, false)))
    {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| PmkError::Config(format!("Invalid {vendor} header value for {name}")))?;
        value.set_sensitive(is_sensitive);
        map.insert(HeaderName::from_static(name), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_marks_sensitive_values() {
        let map = headers(Vendor::Notion, &[("authorization", "Bearer x")], &[(
            "notion-version",
            "2022-06-28",
        )])
        .unwrap();
        assert!(map["authorization"].is_sensitive());
        assert!(!map["notion-version"].is_sensitive());
    }

    #[test]
    fn test_headers_rejects_invalid_values() {
        let err = headers(Vendor::Linear, &[("authorization", "bad\nkey")], &[]).unwrap_err();
        assert!(matches!(err, PmkError::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let http = VendorHttp::new(
            Vendor::Miro,
            "https://api.miro.com/v2/",
            HeaderMap::new(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(http.base_url(), "https://api.miro.com/v2");
    }
}
