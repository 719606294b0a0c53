use std::sync::Arc;

use metrics::counter;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crewdesk_core::TokenPair;

use crate::error::{ApiError, RefreshError};
use crate::events::SessionEvents;
use crate::refresh::{RefreshGate, Ticket};
use crate::store::SharedCredentialStore;

/// Authenticated HTTP client for the dashboard backend.
///
/// Every request carries the stored bearer token when one exists. A 401
/// answer triggers a single coordinated refresh (see [`RefreshGate`]) and one
/// replay of the original request; any further failure propagates to the
/// caller unchanged.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
    store: SharedCredentialStore,
    gate: Arc<RefreshGate>,
    events: SessionEvents,
}

pub(crate) enum Payload {
    Empty,
    Json(serde_json::Value),
    File {
        field: &'static str,
        filename: String,
        bytes: Vec<u8>,
    },
}

pub(crate) struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Payload,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: SharedCredentialStore) -> Self {
        Self {
            http: Client::new(),
            base: base_url.into(),
            store,
            gate: Arc::new(RefreshGate::new()),
            events: SessionEvents::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn store(&self) -> &SharedCredentialStore {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, Option<String>)],
    ) -> Result<T, ApiError> {
        let response = self
            .execute(RequestSpec {
                method: Method::GET,
                path: path.to_string(),
                query: present(query),
                payload: Payload::Empty,
            })
            .await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(RequestSpec {
                method: Method::POST,
                path: path.to_string(),
                query: Vec::new(),
                payload: Payload::Json(serde_json::to_value(body).map_err(ApiError::Encode)?),
            })
            .await?;
        Ok(response.json().await?)
    }

    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(RequestSpec {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            payload: Payload::Json(serde_json::to_value(body).map_err(ApiError::Encode)?),
        })
        .await?;
        Ok(())
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(RequestSpec {
                method: Method::PUT,
                path: path.to_string(),
                query: Vec::new(),
                payload: Payload::Json(serde_json::to_value(body).map_err(ApiError::Encode)?),
            })
            .await?;
        Ok(response.json().await?)
    }

    /// PUT with no body, for idempotent state flips like marking a
    /// notification read.
    pub async fn put_unit(&self, path: &str) -> Result<(), ApiError> {
        self.execute(RequestSpec {
            method: Method::PUT,
            path: path.to_string(),
            query: Vec::new(),
            payload: Payload::Empty,
        })
        .await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(RequestSpec {
            method: Method::DELETE,
            path: path.to_string(),
            query: Vec::new(),
            payload: Payload::Empty,
        })
        .await?;
        Ok(())
    }

    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(RequestSpec {
                method: Method::POST,
                path: path.to_string(),
                query: Vec::new(),
                payload: Payload::File {
                    field: "file",
                    filename: filename.into(),
                    bytes,
                },
            })
            .await?;
        Ok(response.json().await?)
    }

    async fn execute(&self, spec: RequestSpec) -> Result<Response, ApiError> {
        let bearer = self
            .store
            .tokens()
            .await
            .map_err(ApiError::Store)?
            .map(|pair| pair.access_token);
        let response = self.dispatch(&spec, bearer.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ok_or_status(response).await;
        }

        // One replay per request. The replay's own 401 falls through to the
        // caller instead of looping back into another refresh.
        let token = self.fresh_access_token().await?;
        counter!("api_requests_replayed_total").increment(1);
        debug!(path = %spec.path, "replaying request with refreshed token");
        let response = self.dispatch(&spec, Some(&token)).await?;
        ok_or_status(response).await
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(&spec.path);
        let mut request = self.http.request(spec.method.clone(), url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        request = match &spec.payload {
            Payload::Empty => request,
            Payload::Json(value) => request.json(value),
            Payload::File {
                field,
                filename,
                bytes,
            } => {
                let part =
                    reqwest::multipart::Part::bytes(bytes.clone()).file_name(filename.clone());
                request.multipart(reqwest::multipart::Form::new().part(*field, part))
            }
        };
        Ok(request.send().await?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns an access token minted by the in-flight refresh, starting one
    /// if nobody else has. Terminal failures clear the stored session and
    /// notify subscribers before propagating.
    pub(crate) async fn fresh_access_token(&self) -> Result<String, ApiError> {
        match self.gate.begin().await {
            Ticket::Follower(outcome) => {
                debug!("refresh already in flight, queueing request");
                let outcome = outcome.await.unwrap_or(Err(RefreshError::Abandoned));
                Ok(outcome?)
            }
            Ticket::Leader => {
                counter!("auth_refresh_attempts_total").increment(1);
                let outcome = self.run_refresh().await;
                self.gate.finish(outcome.clone()).await;
                if let Err(err) = &outcome {
                    warn!(error = %err, "token refresh failed, resetting session");
                    counter!("auth_refresh_failures_total").increment(1);
                    if let Err(store_err) = self.store.clear_session().await {
                        warn!(error = %store_err, "failed to clear credential store");
                    }
                    self.events.notify_session_expired();
                }
                Ok(outcome?)
            }
        }
    }

    async fn run_refresh(&self) -> Result<String, RefreshError> {
        let pair = self
            .store
            .tokens()
            .await
            .map_err(|err| RefreshError::Storage(err.to_string()))?;
        let Some(pair) = pair else {
            return Err(RefreshError::MissingRefreshToken);
        };

        // Plain request on purpose: the refresh call itself must never loop
        // back through the 401 interception.
        let response = self
            .http
            .post(self.endpoint("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": pair.refresh_token }))
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(RefreshError::Rejected {
                status: response.status().as_u16(),
            });
        }
        let next: TokenPair = response
            .json()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;
        self.store
            .set_tokens(next.clone())
            .await
            .map_err(|err| RefreshError::Storage(err.to_string()))?;
        debug!("token refresh succeeded");
        Ok(next.access_token)
    }
}

fn present(query: &[(&str, Option<String>)]) -> Vec<(String, String)> {
    query
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect()
}

async fn ok_or_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryCredentialStore;

    #[test]
    fn absent_query_parameters_are_omitted() {
        let query = present(&[
            ("role", Some("chef".to_string())),
            ("user_id", None),
            ("date_from", Some("2026-01-01".to_string())),
        ]);
        assert_eq!(
            query,
            vec![
                ("role".to_string(), "chef".to_string()),
                ("date_from".to_string(), "2026-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let client = ApiClient::new(
            "http://127.0.0.1:9/api/",
            Arc::new(MemoryCredentialStore::new()),
        );
        assert_eq!(
            client.endpoint("/auth/login"),
            "http://127.0.0.1:9/api/auth/login"
        );
        assert_eq!(client.endpoint("tasks"), "http://127.0.0.1:9/api/tasks");
    }
}
