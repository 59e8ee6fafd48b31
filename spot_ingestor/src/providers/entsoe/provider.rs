use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;

use crate::providers::{PriceProvider, ProviderInitError, TransportError};

/// Public day-ahead endpoint of the transparency platform.
pub const DEFAULT_BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Environment variable holding the API security token.
pub const SECURITY_TOKEN_VAR: &str = "TRANSPARENCY_PLATFORM_SECURITY_TOKEN";

/// Day-ahead prices document type.
const DOCUMENT_TYPE: &str = "A44";

/// The platform expects period bounds as `YYYYMMDDHH00`.
const PERIOD_FORMAT: &str = "%Y%m%d%H00";

/// Responses for long historical windows can be tens of megabytes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct EntsoeProvider {
    client: Client,
    base_url: String,
    security_token: SecretString,
}

impl EntsoeProvider {
    /// Creates a provider reading the security token from the
    /// `TRANSPARENCY_PLATFORM_SECURITY_TOKEN` environment variable.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let token = SecretString::new(get_env_var(SECURITY_TOKEN_VAR)?.into());
        Self::with_token(base_url, token)
    }

    pub fn with_token(
        base_url: impl Into<String>,
        security_token: SecretString,
    ) -> Result<Self, ProviderInitError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            security_token,
        })
    }
}

#[async_trait]
impl PriceProvider for EntsoeProvider {
    async fn fetch_window(
        &self,
        area_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String, TransportError> {
        let query = [
            ("securityToken", self.security_token.expose_secret().to_string()),
            ("periodStart", start.format(PERIOD_FORMAT).to_string()),
            ("periodEnd", end.format(PERIOD_FORMAT).to_string()),
            ("documentType", DOCUMENT_TYPE.to_string()),
            ("in_Domain", area_code.to_string()),
            ("out_Domain", area_code.to_string()),
        ];

        tracing::info!(
            url = %self.base_url,
            %start,
            %end,
            area_code,
            "reading day-ahead values"
        );
        let response = self.client.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        tracing::info!(
            status = status.as_u16(),
            length = body.len(),
            "received response"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_bounds_use_platform_format() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(start.format(PERIOD_FORMAT).to_string(), "202401010000");
        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(late.format(PERIOD_FORMAT).to_string(), "202412312300");
    }
}
