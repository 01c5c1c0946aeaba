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

//! Client configuration and credentials.

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.studentrecord.com";

/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the record API.
///
/// # Examples
///
/// ```
/// use recsync_client::ClientConfig;
///
/// let config = ClientConfig {
///     customer: Some("12".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(config.endpoint(Some("12"), "person", None), "https://api.studentrecord.com/api/v1/12/person/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// Version path segment.
    pub api_version: String,
    /// Customer to act for. When unset the first customer visible to the
    /// account is used.
    pub customer: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            customer: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// URL of an endpoint.
    ///
    /// Customer-scoped endpoints take the customer as their first segment;
    /// `login` and `customer` do not.
    pub fn endpoint(&self, customer: Option<&str>, endpoint: &str, id: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_version
        );
        if let Some(customer) = customer {
            url.push_str(customer);
            url.push('/');
        }
        url.push_str(endpoint);
        url.push('/');
        if let Some(id) = id {
            url.push_str(id);
            url.push('/');
        }
        url
    }
}

/// How to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// An existing authentication token.
    Token(String),
    /// Log in with an account's email and password.
    Password { email: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let config = ClientConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint(None, "login", None),
            "http://localhost:8080/api/v1/login/"
        );
        assert_eq!(
            config.endpoint(Some("3"), "organization", Some("41")),
            "http://localhost:8080/api/v1/3/organization/41/"
        );
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::Password {
            email: "ada@acme.test".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(shown.contains("ada@acme.test"));
        assert!(!shown.contains("hunter2"));
        assert!(!format!("{:?}", Credentials::Token("abc123".to_string())).contains("abc123"));
    }
}
