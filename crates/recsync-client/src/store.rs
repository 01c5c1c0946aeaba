// Dweve Recsync - Tabular Record Synchronization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Blocking REST implementation of [`RecordStore`].

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, Result};
use recsync_core::{record_id, Query, RecordStore, RemoteRecord, StoreError, Value};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the session token.
pub const AUTH_HEADER: &str = "Authentication-Token";

/// Query parameter bounding list responses.
pub const LIMIT_PARAM: &str = "_limit";

#[derive(Deserialize)]
struct LoginResponse {
    authentication_token: String,
}

#[derive(Deserialize)]
struct ListResponse {
    data: Vec<RemoteRecord>,
    #[serde(default)]
    has_more: bool,
}

/// A customer-scoped connection to the record API.
pub struct RestStore {
    client: Client,
    config: ClientConfig,
    token: String,
    customer: String,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.config.base_url)
            .field("customer", &self.customer)
            .finish()
    }
}

impl RestStore {
    /// Authenticate and select a customer.
    ///
    /// Password credentials are exchanged for a token first. The token is
    /// then checked by listing the account's customers; the configured
    /// customer is used when set, otherwise the first one listed.
    pub fn connect(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        let token = match credentials {
            Credentials::Token(token) => token,
            Credentials::Password { email, password } => {
                login(&client, &config, &email, &password)?
            }
        };

        let mut store = Self {
            client,
            config,
            token,
            customer: String::new(),
        };

        let customers = store.customers()?;
        store.customer = match store.config.customer.clone() {
            Some(customer) => customer,
            None => customers
                .iter()
                .find_map(record_id)
                .ok_or(ClientError::NoCustomer)?,
        };

        info!(customer = %store.customer, "connected to record API");
        Ok(store)
    }

    /// The selected customer id.
    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Customers visible to the session.
    pub fn customers(&self) -> Result<Vec<RemoteRecord>> {
        let url = self.config.endpoint(None, "customer", None);
        let request = self.client.get(&url);
        let list: ListResponse = self.send(request, &url)?;
        Ok(list.data)
    }

    fn url(&self, record_type: &str, id: Option<&str>) -> String {
        self.config.endpoint(Some(&self.customer), record_type, id)
    }

    fn send<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request.header(AUTH_HEADER, &self.token).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            warn!(status = %status, url, "request failed");
            return Err(status_error(status, url, body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn list(&self, record_type: &str, query: &Query, limit: usize) -> Result<Vec<RemoteRecord>> {
        let url = self.url(record_type, None);
        let mut params = query_params(query);
        params.push((LIMIT_PARAM.to_string(), limit.to_string()));

        debug!(url = %url, params = ?params, "GET");
        let list: ListResponse = self.send(self.client.get(&url).query(&params), &url)?;
        if list.has_more {
            debug!(url = %url, limit, "more matches than requested");
        }
        Ok(list.data)
    }

    fn post(&self, record_type: &str, object: &RemoteRecord) -> Result<RemoteRecord> {
        let url = self.url(record_type, None);
        debug!(url = %url, "POST");
        self.send(self.client.post(&url).json(object), &url)
    }

    fn put(&self, record_type: &str, id: &str, object: &RemoteRecord) -> Result<RemoteRecord> {
        let url = self.url(record_type, Some(id));
        debug!(url = %url, "PUT");
        self.send(self.client.put(&url).json(object), &url)
    }
}

fn login(client: &Client, config: &ClientConfig, email: &str, password: &str) -> Result<String> {
    let url = config.endpoint(None, "login", None);
    debug!(url = %url, email, "logging in");

    let response = client
        .post(&url)
        .form(&[("email", email), ("password", password)])
        .send()?;
    let status = response.status();
    let body = response.text()?;

    if status != StatusCode::OK {
        return Err(ClientError::LoginRejected {
            status: status.as_u16(),
            message: if body.is_empty() {
                "invalid username/password".to_string()
            } else {
                body
            },
        });
    }

    let login: LoginResponse = serde_json::from_str(&body).map_err(|e| ClientError::Decode {
        url: url.clone(),
        message: e.to_string(),
    })?;
    Ok(login.authentication_token)
}

fn status_error(status: StatusCode, url: &str, body: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(format!("invalid authorization for {url}")),
        StatusCode::NOT_FOUND => ClientError::NotFound(url.to_string()),
        _ => ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            message: body,
        },
    }
}

/// Query filters as URL parameters. Lists repeat their key.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(query.len());
    for (key, value) in query {
        push_param(&mut params, key, value);
    }
    params
}

fn push_param(params: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::String(s) => params.push((key.to_string(), s.clone())),
        Value::Bool(b) => params.push((key.to_string(), b.to_string())),
        Value::List(items) => {
            for item in items {
                push_param(params, key, item);
            }
        }
        Value::Object(_) => params.push((key.to_string(), value.to_payload().to_string())),
    }
}

impl RecordStore for RestStore {
    fn filter(
        &self,
        record_type: &str,
        query: &Query,
        limit: usize,
    ) -> std::result::Result<Vec<RemoteRecord>, StoreError> {
        Ok(self.list(record_type, query, limit)?)
    }

    fn create(
        &self,
        record_type: &str,
        object: &RemoteRecord,
    ) -> std::result::Result<RemoteRecord, StoreError> {
        Ok(self.post(record_type, object)?)
    }

    fn update(
        &self,
        record_type: &str,
        id: &str,
        object: &RemoteRecord,
    ) -> std::result::Result<RemoteRecord, StoreError> {
        Ok(self.put(record_type, id, object)?)
    }

    fn check_session(&self) -> std::result::Result<(), StoreError> {
        self.customers().map(|_| ()).map_err(StoreError::from)
    }
}
