//! Blocking JSON client for the filter-data endpoint.

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::conf::{C_CONTENT_TYPE_JSON, C_ENDPOINT_URL_DEFAULT};

/// Endpoint request failures.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Server answered with a non-success status.
    #[error("HTTP error! Status: {0}")]
    Status(u16),
    /// Connection, DNS or protocol failure.
    #[error("HTTP transport error: {0}")]
    Transport(Box<ureq::Transport>),
    /// Response body is not valid JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] std::io::Error),
}

impl From<ureq::Error> for EndpointError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(n_status, _) => Self::Status(n_status),
            ureq::Error::Transport(transport) => Self::Transport(Box::new(transport)),
        }
    }
}

/// Client bound to one endpoint URL. No auth, no retry.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    url: String,
    agent: ureq::Agent,
}

impl Default for EndpointClient {
    fn default() -> Self {
        Self::new(C_ENDPOINT_URL_DEFAULT)
    }
}

impl EndpointClient {
    /// Client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the endpoint; `None` on any failure (logged).
    pub fn fetch_filter_data(&self) -> Option<Value> {
        match self.try_fetch() {
            Ok(data) => {
                info!(url = %self.url, %data, "Data received");
                Some(data)
            }
            Err(err) => {
                error!(url = %self.url, %err, "Error fetching data");
                None
            }
        }
    }

    /// POST `data` as JSON; failures are logged only.
    pub fn post_filter_data(&self, data: &Value) {
        match self.try_post(data) {
            Ok(response) => info!(url = %self.url, %response, "Data successfully posted"),
            Err(err) => error!(url = %self.url, %err, "Error posting data"),
        }
    }

    /// GET the endpoint and decode the JSON body.
    pub fn try_fetch(&self) -> Result<Value, EndpointError> {
        let response = self
            .agent
            .get(&self.url)
            .set("Content-Type", C_CONTENT_TYPE_JSON)
            .call()?;
        Ok(response.into_json::<Value>()?)
    }

    /// POST `data` as JSON and decode the JSON response body.
    pub fn try_post(&self, data: &Value) -> Result<Value, EndpointError> {
        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", C_CONTENT_TYPE_JSON)
            .send_json(data)?;
        Ok(response.into_json::<Value>()?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::thread::JoinHandle;

    use serde_json::json;

    use super::*;

    /// Serve exactly one request; return `(method, body)` seen by the server.
    fn spawn_one_shot_server(
        n_status: u16,
        body_response: &'static str,
    ) -> (String, JoinHandle<(String, String)>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let n_port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let mut body_request = String::new();
            request.as_reader().read_to_string(&mut body_request).unwrap();
            let c_method = request.method().to_string();
            let response = tiny_http::Response::from_string(body_response)
                .with_status_code(n_status)
                .with_header(
                    "Content-Type: application/json"
                        .parse::<tiny_http::Header>()
                        .unwrap(),
                );
            request.respond(response).unwrap();
            (c_method, body_request)
        });
        (format!("http://127.0.0.1:{n_port}/flask/filter-data"), handle)
    }

    #[test]
    fn fetch_returns_decoded_json() {
        let (c_url, handle) = spawn_one_shot_server(200, r#"{"filters": ["Region"]}"#);
        let client = EndpointClient::new(c_url);

        assert_eq!(
            client.fetch_filter_data(),
            Some(json!({"filters": ["Region"]}))
        );
        let (c_method, _) = handle.join().unwrap();
        assert_eq!(c_method, "GET");
    }

    #[test]
    fn fetch_swallows_http_errors() {
        let (c_url, handle) = spawn_one_shot_server(500, r#"{"error": "boom"}"#);
        let client = EndpointClient::new(c_url);
        assert_eq!(client.fetch_filter_data(), None);
        handle.join().unwrap();

        let (c_url, handle) = spawn_one_shot_server(404, "{}");
        let err = EndpointClient::new(c_url).try_fetch().unwrap_err();
        assert!(matches!(err, EndpointError::Status(404)));
        assert_eq!(err.to_string(), "HTTP error! Status: 404");
        handle.join().unwrap();
    }

    #[test]
    fn fetch_reports_undecodable_body() {
        let (c_url, handle) = spawn_one_shot_server(200, "not json");
        let err = EndpointClient::new(c_url).try_fetch().unwrap_err();
        assert!(matches!(err, EndpointError::Decode(_)));
        handle.join().unwrap();
    }

    #[test]
    fn post_sends_json_body() {
        let (c_url, handle) = spawn_one_shot_server(200, r#"{"ok": true}"#);
        let client = EndpointClient::new(c_url);

        let data = json!({"name": "Region", "values": ["East", "West"]});
        assert_eq!(client.try_post(&data).unwrap(), json!({"ok": true}));

        let (c_method, body_request) = handle.join().unwrap();
        assert_eq!(c_method, "POST");
        assert_eq!(
            serde_json::from_str::<Value>(&body_request).unwrap(),
            data
        );
    }

    #[test]
    fn unreachable_endpoint_is_silent() {
        let n_port = {
            let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
            server.server_addr().to_ip().unwrap().port()
        };
        let client = EndpointClient::new(format!("http://127.0.0.1:{n_port}/flask/filter-data"));

        assert_eq!(client.fetch_filter_data(), None);
        client.post_filter_data(&json!({}));
        assert!(matches!(
            client.try_fetch(),
            Err(EndpointError::Transport(_))
        ));
    }

    #[test]
    fn default_client_targets_deployed_endpoint() {
        assert!(EndpointClient::default().url().ends_with("/flask/filter-data"));
    }
}
