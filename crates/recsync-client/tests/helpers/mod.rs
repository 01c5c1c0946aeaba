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

//! Shared mock record API for the RestStore tests.

use recsync_client::{ClientConfig, Credentials, AUTH_HEADER};
use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "tok-123";

/// A mock API that accepts `ada@acme.test` / `secret` and token
/// [`TOKEN`], lists customers 7 and 8, and answers anything else
/// with 401.
pub async fn mock_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/"))
        .and(body_string_contains("email=ada%40acme.test"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"authentication_token": TOKEN})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/"))
        .respond_with(ResponseTemplate::new(400))
        .with_priority(6)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/customer/"))
        .and(header(AUTH_HEADER, TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 7, "name": "Acme"}, {"id": 8}],
            "has_more": false,
        })))
        .mount(&server)
        .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid token"})))
        .with_priority(10)
        .mount(&server)
        .await;

    server
}

pub fn config(uri: &str) -> ClientConfig {
    ClientConfig {
        base_url: uri.to_string(),
        ..Default::default()
    }
}

pub fn token() -> Credentials {
    Credentials::Token(TOKEN.to_string())
}

pub fn password(password: &str) -> Credentials {
    Credentials::Password {
        email: "ada@acme.test".to_string(),
        password: password.to_string(),
    }
}

/// Run blocking client code off the async runtime.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

pub fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
