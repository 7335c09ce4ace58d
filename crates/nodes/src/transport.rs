//! `ReqwestTransport` — a bearer-token [`HttpTransport`] backed by `reqwest`.
//!
//! Hosts that already own an authenticated client should implement
//! [`HttpTransport`] themselves; this one covers the common OAuth
//! access-token case.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::models::{HttpMethod, HttpRequest, HttpResponse};
use crate::traits::HttpTransport;
use crate::TransportError;

pub struct ReqwestTransport {
    client: Client,
    access_token: String,
}

impl ReqwestTransport {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), access_token)
    }

    pub fn with_client(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }
}

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_owned()))
        })
        .collect()
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?
            .to_vec();

        if !status.is_success() {
            warn!("{} {} returned {}", request.method, request.url, status.as_u16());
            return Err(TransportError {
                status: Some(status.as_u16()),
                headers,
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
