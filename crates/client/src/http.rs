use async_trait::async_trait;
use contracts::query::{QueryMapFeaturesRequest, QueryMapFeaturesResponse};
use contracts::runtime_map::RuntimeMap;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::agent::{CreateRuntimeMapRequest, MapAgent, unwrap_root};
use crate::error::ClientError;

const JSON_FORMAT: &str = "application/json";

/// `mapagent` HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpMapAgent {
    http: reqwest::Client,
    agent_url: Url,
    strings_base: Option<Url>,
}

impl HttpMapAgent {
    pub fn new(agent_url: &str) -> Result<Self, ClientError> {
        let agent_url = Url::parse(agent_url).map_err(|source| ClientError::InvalidUrl {
            url: agent_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            agent_url,
            strings_base: None,
        })
    }

    /// Directory serving `<locale>.json` string bundles.
    pub fn with_strings_base(mut self, base: &str) -> Result<Self, ClientError> {
        let mut url = Url::parse(base).map_err(|source| ClientError::InvalidUrl {
            url: base.to_string(),
            source,
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.strings_base = Some(url);
        Ok(self)
    }

    async fn get(&self, operation: &str, params: &[(&str, String)]) -> Result<reqwest::Response, ClientError> {
        debug!("mapagent GET {operation}");
        let resp = self
            .http
            .get(self.agent_url.clone())
            .query(&[("OPERATION", operation)])
            .query(params)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                operation: operation.to_string(),
                source,
            })?;
        check_status(operation, resp)
    }

    async fn json(operation: &str, resp: reqwest::Response) -> Result<Value, ClientError> {
        let text = resp.text().await.map_err(|source| ClientError::Http {
            operation: operation.to_string(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&text).map_err(|e| ClientError::decode(operation, e))?;
        Ok(unwrap_root(value))
    }
}

fn check_status(operation: &str, resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ClientError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait(?Send)]
impl MapAgent for HttpMapAgent {
    fn agent_url(&self) -> &str {
        self.agent_url.as_str()
    }

    async fn create_session(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let op = "CREATESESSION";
        let resp = self
            .get(
                op,
                &[
                    ("VERSION", "1.0.0".into()),
                    ("USERNAME", username.into()),
                    ("PASSWORD", password.into()),
                ],
            )
            .await?;
        let text = resp.text().await.map_err(|source| ClientError::Http {
            operation: op.to_string(),
            source,
        })?;
        let session = text.trim().to_string();
        if session.is_empty() {
            return Err(ClientError::Server("server returned an empty session id".into()));
        }
        Ok(session)
    }

    async fn create_runtime_map(
        &self,
        request: &CreateRuntimeMapRequest,
    ) -> Result<RuntimeMap, ClientError> {
        let op = "CREATERUNTIMEMAP";
        let resp = self
            .get(
                op,
                &[
                    ("VERSION", "3.0.0".into()),
                    ("MAPDEFINITION", request.map_definition.clone()),
                    ("SESSION", request.session.clone()),
                    ("REQUESTEDFEATURES", request.requested_features.bits().to_string()),
                    ("TARGETMAPNAME", request.target_map_name.clone()),
                    ("FORMAT", JSON_FORMAT.into()),
                    ("CLEAN", "1".into()),
                ],
            )
            .await?;
        let json = Self::json(op, resp).await?;
        serde_json::from_value(json).map_err(|e| ClientError::decode(op, e))
    }

    async fn get_resource_json(&self, resource_id: &str, session: &str) -> Result<Value, ClientError> {
        let op = "GETRESOURCECONTENT";
        let resp = self
            .get(
                op,
                &[
                    ("VERSION", "1.0.0".into()),
                    ("RESOURCEID", resource_id.into()),
                    ("SESSION", session.into()),
                    ("FORMAT", JSON_FORMAT.into()),
                    ("CLEAN", "1".into()),
                ],
            )
            .await?;
        Self::json(op, resp).await
    }

    async fn query_map_features(
        &self,
        request: &QueryMapFeaturesRequest,
    ) -> Result<QueryMapFeaturesResponse, ClientError> {
        let op = "QUERYMAPFEATURES";
        let mut form = request.to_params();
        form.push(("OPERATION", op.into()));
        form.push(("VERSION", "2.6.0".into()));
        form.push(("FORMAT", JSON_FORMAT.into()));
        form.push(("CLEAN", "1".into()));
        let resp = self
            .http
            .post(self.agent_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                operation: op.to_string(),
                source,
            })?;
        let resp = check_status(op, resp)?;
        let json = Self::json(op, resp).await?;
        if json.is_null() {
            return Ok(QueryMapFeaturesResponse::default());
        }
        serde_json::from_value(json).map_err(|e| ClientError::decode(op, e))
    }

    fn tile_template_url(
        &self,
        resource_id: &str,
        group_name: &str,
        x_token: &str,
        y_token: &str,
        z_token: &str,
    ) -> String {
        format!(
            "{}?OPERATION=GETTILEIMAGE&VERSION=1.2.0&USERNAME=Anonymous&MAPDEFINITION={}&BASEMAPLAYERGROUPNAME={}&TILECOL={x_token}&TILEROW={y_token}&SCALEINDEX={z_token}",
            self.agent_url,
            urlencoding::encode(resource_id),
            urlencoding::encode(group_name),
        )
    }

    async fn fetch_string_bundle(&self, locale: &str) -> Result<Option<Value>, ClientError> {
        let Some(base) = &self.strings_base else {
            return Ok(None);
        };
        let op = "string bundle";
        let url = base
            .join(&format!("{locale}.json"))
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{base}{locale}.json"),
                source,
            })?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                operation: op.to_string(),
                source,
            })?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let text = resp.text().await.map_err(|source| ClientError::Http {
            operation: op.to_string(),
            source,
        })?;
        let json = serde_json::from_str(&text).map_err(|e| ClientError::decode(op, e))?;
        Ok(Some(json))
    }
}
