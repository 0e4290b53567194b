use anyhow::{Context, Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::StoreError;
use crate::query::TableQuery;

/// Handle to the PostgREST store. Built once at startup and shared; holds the
/// HTTP connection pool.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key).context("Invalid anon key header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Public reads fall back to the anon key as bearer
        let bearer = auth_token.unwrap_or(&self.anon_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .context("Invalid bearer token header value")?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(StoreError::from_status(status.as_u16(), error_text).into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Runs a typed read and deserializes every returned row.
    pub async fn select<T>(&self, query: &TableQuery, auth_token: Option<&str>) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let rows: Vec<Value> = self.request(Method::GET, &query.to_path(), auth_token, None).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row)
                .with_context(|| format!("Malformed row in {}", query.table())))
            .collect()
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T>(&self, table: &'static str, body: Value, auth_token: Option<&str>) -> Result<T>
    where T: DeserializeOwned {
        let path = TableQuery::new(table).to_path();
        let mut rows: Vec<T> = self.request_with_headers(
            Method::POST,
            &path,
            auth_token,
            Some(body),
            Some(return_representation()),
        ).await?;

        if rows.is_empty() {
            return Err(anyhow!("Insert into {} returned no rows", table));
        }
        Ok(rows.swap_remove(0))
    }

    /// Patches every row matched by `query` and returns the updated rows.
    pub async fn update<T>(&self, query: &TableQuery, body: Value, auth_token: Option<&str>) -> Result<Vec<T>>
    where T: DeserializeOwned {
        self.request_with_headers(
            Method::PATCH,
            &query.to_path(),
            auth_token,
            Some(body),
            Some(return_representation()),
        ).await
    }
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}
