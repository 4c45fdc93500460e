//! Upstream collaborators.
//!
//! [`LogsApi`] is everything the log client needs from the platform: a
//! signed log URL, the list of process types, the historical log body and a
//! live connector. [`HttpApi`] talks to the real REST API; tests use
//! in-memory fakes.

use crate::endpoint::{StreamEndpoint, TransportKind};
use crate::error::{LogsError, Result};
use crate::logs::LogTarget;
use crate::transport::{self, ConnectError, Connector};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use url::Url;

/// Status and body of a historical log request.
pub struct HistoryResponse {
    pub status: StatusCode,
    pub body: Box<dyn Read>,
}

pub trait LogsApi {
    /// Signed, time-limited log URL for an application or an add-on.
    fn log_endpoint(&self, target: &LogTarget) -> Result<StreamEndpoint>;

    /// Process type names currently defined for `app`, in API order.
    fn list_process_types(&self, app: &str) -> Result<Vec<String>>;

    /// Issue the historical request. `url` already carries `n` and `filter`.
    fn open_history(&self, url: &Url) -> Result<HistoryResponse>;

    /// Connector for the live transport picked for this session.
    fn live_connector(&self, kind: TransportKind) -> Result<Box<dyn Connector>, ConnectError> {
        transport::connector_for(kind)
    }
}

#[derive(Debug, Deserialize)]
struct AppLogsResponse {
    logs_url: String,
}

#[derive(Debug, Deserialize)]
struct AddonLogsResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContainersResponse {
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    name: String,
}

/// REST implementation of [`LogsApi`].
pub struct HttpApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let base = Url::parse(api_url)?;
        if base.cannot_be_a_base() {
            return Err(LogsError::InvalidEndpoint(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let client = Client::builder().user_agent(transport::user_agent()).build()?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str], what: &'static str) -> Result<T> {
        let url = self.url_for(segments);
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogsError::Api {
                what,
                status: status.to_string(),
            });
        }

        let body = response.text()?;
        tracing::debug!(%url, %body, "api response");
        Ok(serde_json::from_str(&body)?)
    }
}

impl LogsApi for HttpApi {
    fn log_endpoint(&self, target: &LogTarget) -> Result<StreamEndpoint> {
        let raw = match target {
            LogTarget::App(app) => {
                self.get_json::<AppLogsResponse>(&["v1", "apps", app.as_str(), "logs"], "get logs URL")?
                    .logs_url
            }
            LogTarget::Addon { app, addon } => {
                self.get_json::<AddonLogsResponse>(
                    &["v1", "apps", app.as_str(), "addons", addon.as_str(), "logs"],
                    "get add-on logs URL",
                )?
                .url
            }
        };
        StreamEndpoint::parse(&raw)
    }

    fn list_process_types(&self, app: &str) -> Result<Vec<String>> {
        let response: ContainersResponse =
            self.get_json(&["v1", "apps", app, "containers"], "list containers")?;
        Ok(response.containers.into_iter().map(|c| c.name).collect())
    }

    fn open_history(&self, url: &Url) -> Result<HistoryResponse> {
        let response = self.client.get(url.clone()).send()?;
        Ok(HistoryResponse {
            status: response.status(),
            body: Box::new(response),
        })
    }
}
