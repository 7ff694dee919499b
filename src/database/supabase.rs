use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{LocationStore, StoreError};
use crate::config::SupabaseConfig;
use crate::types::{LocationRecord, LOCATION_TABLE};

/// Single-row representation, as requested by `.insert(..).select().single()`
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Supabase table client using the service-role key.
///
/// Talks to the project's PostgREST endpoint directly. No session handling,
/// token refresh or retries; the key is static for the process lifetime.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    table_url: Url,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let table_url = config
            .url
            .join(&format!("rest/v1/{}", LOCATION_TABLE))
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let mut headers = HeaderMap::new();

        let mut apikey = HeaderValue::from_str(&config.service_role_key)
            .map_err(|_| StoreError::Config("service role key is not a valid header value".into()))?;
        apikey.set_sensitive(true);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_role_key))
            .map_err(|_| StoreError::Config("service role key is not a valid header value".into()))?;
        bearer.set_sensitive(true);

        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("Supabase client ready for {}", table_url);

        Ok(Self { http, table_url })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }
}

#[async_trait]
impl LocationStore for SupabaseClient {
    async fn insert(&self, record: &LocationRecord) -> Result<Value, StoreError> {
        let response = self
            .http
            .post(self.table_url.clone())
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(remote_error(status, &body));
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(row @ Value::Object(_)) => {
                debug!("Inserted row into {}", LOCATION_TABLE);
                Ok(row)
            }
            Ok(other) => Err(StoreError::UnexpectedResponse(format!(
                "expected a single row object, got {}",
                other
            ))),
            Err(e) => Err(StoreError::UnexpectedResponse(e.to_string())),
        }
    }
}

fn remote_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            message: Some(message),
            code,
            details,
            hint,
        }) => {
            debug!(?code, ?details, ?hint, "PostgREST rejected insert");
            StoreError::Remote {
                status: status.as_u16(),
                code,
                message,
            }
        }
        _ => StoreError::Remote {
            status: status.as_u16(),
            code: None,
            message: format!("{} {}", status, body.trim()).trim().to_string(),
        },
    }
}
