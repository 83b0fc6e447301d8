//! Heroku Platform API v3 client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RANGE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{SnapshotSource, SourceError};
use crate::config::PlatformConfig;
use crate::types::{
    sort_releases_desc, Addon, AppInfo, ConfigVars, FormationEntry, Instance, InstanceStatus,
    Release,
};

const ACCEPT_V3: &str = "application/vnd.heroku+json; version=3";

/// Characters escaped in an app name path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// [`SnapshotSource`] backed by the Heroku Platform API.
#[derive(Clone)]
pub struct HerokuClient {
    http: Client,
    base_url: String,
    release_limit: usize,
}

impl HerokuClient {
    /// Build a client. Returns `None` when no API key is configured.
    pub fn from_config(config: &PlatformConfig) -> Result<Option<Self>, SourceError> {
        match &config.api_key {
            Some(key) => Self::new(
                key,
                &config.base_url,
                config.timeout,
                config.release_limit,
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
        release_limit: usize,
    ) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| SourceError::InvalidCredentials)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("heroku_watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            release_limit: release_limit.max(1),
        })
    }

    fn app_path(entity: &str, tail: &str) -> String {
        format!("/apps/{}{}", utf8_percent_encode(entity, SEGMENT), tail)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        range: Option<String>,
    ) -> Result<T, SourceError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(range) = range {
            req = req.header(RANGE, range);
        }

        let resp = req.send().await?;
        let status = resp.status();

        // 206 is a normal answer to a Range request.
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::InvalidCredentials);
        }

        let message = resp
            .json::<ApiErrorWire>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        Err(SourceError::Status {
            status: status.as_u16(),
            path: path.to_string(),
            message,
        })
    }

    /// Run `request` and collapse failures into `None`, logging them.
    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        entity: &str,
        tail: &str,
        range: Option<String>,
    ) -> Option<T> {
        let path = Self::app_path(entity, tail);
        match self.request::<T>(&path, range).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    app = %entity,
                    operation,
                    timeout = e.is_timeout(),
                    error = %e,
                    "platform fetch failed"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for HerokuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HerokuClient")
            .field("base_url", &self.base_url)
            .field("release_limit", &self.release_limit)
            .finish()
    }
}

#[async_trait]
impl SnapshotSource for HerokuClient {
    async fn instances(&self, entity: &str) -> Option<Vec<Instance>> {
        let dynos: Vec<DynoWire> = self.fetch("instances", entity, "/dynos", None).await?;
        Some(dynos.into_iter().map(Instance::from).collect())
    }

    async fn releases(&self, entity: &str) -> Option<Vec<Release>> {
        let range = format!("version ..; order=desc, max={}", self.release_limit);
        let wire: Vec<ReleaseWire> = self
            .fetch("releases", entity, "/releases", Some(range))
            .await?;

        let mut releases: Vec<Release> = wire.into_iter().map(Release::from).collect();
        sort_releases_desc(&mut releases);
        releases.truncate(self.release_limit);
        Some(releases)
    }

    async fn config_vars(&self, entity: &str) -> Option<ConfigVars> {
        // Unset vars come back as null.
        let raw: std::collections::BTreeMap<String, Option<String>> =
            self.fetch("config_vars", entity, "/config-vars", None).await?;
        Some(
            raw.into_iter()
                .map(|(k, v)| (k, v.unwrap_or_default()))
                .collect(),
        )
    }

    async fn formation(&self, entity: &str) -> Option<Vec<FormationEntry>> {
        let wire: Vec<FormationWire> = self.fetch("formation", entity, "/formation", None).await?;
        Some(wire.into_iter().map(FormationEntry::from).collect())
    }

    async fn app_info(&self, entity: &str) -> Option<AppInfo> {
        let wire: AppWire = self.fetch("app_info", entity, "", None).await?;
        Some(AppInfo::from(wire))
    }

    async fn addons(&self, entity: &str) -> Option<Vec<Addon>> {
        let wire: Vec<AddonWire> = self.fetch("addons", entity, "/addons", None).await?;
        Some(wire.into_iter().map(Addon::from).collect())
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Deserialize)]
struct ApiErrorWire {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct DynoWire {
    name: String,
    #[serde(rename = "type", default)]
    process_type: String,
    #[serde(default)]
    state: String,
}

impl From<DynoWire> for Instance {
    fn from(w: DynoWire) -> Self {
        Instance {
            name: w.name,
            process_type: w.process_type,
            status: InstanceStatus::parse(&w.state),
        }
    }
}

#[derive(Deserialize)]
struct UserWire {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ReleaseWire {
    version: u64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    user: Option<UserWire>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<ReleaseWire> for Release {
    fn from(w: ReleaseWire) -> Self {
        Release {
            version: w.version,
            description: w.description.unwrap_or_default(),
            author_email: w.user.and_then(|u| u.email).unwrap_or_default(),
            created_at: w.created_at,
        }
    }
}

#[derive(Deserialize)]
struct FormationWire {
    #[serde(rename = "type")]
    process_type: String,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    size: String,
}

impl From<FormationWire> for FormationEntry {
    fn from(w: FormationWire) -> Self {
        FormationEntry {
            process_type: w.process_type,
            quantity: w.quantity,
            size: w.size,
        }
    }
}

#[derive(Deserialize)]
struct NamedWire {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct AddonWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    plan: Option<NamedWire>,
    #[serde(default)]
    state: Option<String>,
}

impl From<AddonWire> for Addon {
    fn from(w: AddonWire) -> Self {
        Addon {
            name: w.name.unwrap_or_else(|| "Unknown".into()),
            plan: w
                .plan
                .and_then(|p| p.name)
                .unwrap_or_else(|| "Unknown".into()),
            state: w.state.unwrap_or_else(|| "Unknown".into()),
        }
    }
}

#[derive(Deserialize)]
struct AppWire {
    name: String,
    #[serde(default)]
    owner: Option<UserWire>,
    #[serde(default)]
    region: Option<NamedWire>,
    #[serde(default)]
    stack: Option<NamedWire>,
    #[serde(default)]
    web_url: Option<String>,
}

impl From<AppWire> for AppInfo {
    fn from(w: AppWire) -> Self {
        AppInfo {
            name: w.name,
            owner_email: w.owner.and_then(|o| o.email),
            region: w.region.and_then(|r| r.name),
            stack: w.stack.and_then(|s| s.name),
            web_url: w.web_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_path_escapes_name() {
        assert_eq!(HerokuClient::app_path("my-app", "/dynos"), "/apps/my-app/dynos");
        assert_eq!(HerokuClient::app_path("a/b", ""), "/apps/a%2Fb");
        assert_eq!(HerokuClient::app_path("a b", "/releases"), "/apps/a%20b/releases");
    }

    #[test]
    fn test_dyno_decoding() {
        let json = r#"[
            {"name":"web.1","type":"web","state":"up","size":"Basic"},
            {"name":"worker.1","type":"worker","state":"crashed"},
            {"name":"run.42","type":"run","state":"provisioning"}
        ]"#;
        let dynos: Vec<DynoWire> = serde_json::from_str(json).unwrap();
        let instances: Vec<Instance> = dynos.into_iter().map(Instance::from).collect();

        assert_eq!(instances[0].status, InstanceStatus::Running);
        assert_eq!(instances[1].process_type, "worker");
        assert_eq!(instances[1].status, InstanceStatus::Crashed);
        assert_eq!(instances[2].status, InstanceStatus::Unknown);
    }

    #[test]
    fn test_release_decoding() {
        let json = r#"{
            "version": 12,
            "description": "Deploy 1a2b3c",
            "user": {"email": "dev@example.com", "id": "x"},
            "created_at": "2024-03-01T12:00:00Z",
            "status": "succeeded"
        }"#;
        let release = Release::from(serde_json::from_str::<ReleaseWire>(json).unwrap());
        assert_eq!(release.version, 12);
        assert_eq!(release.author_email, "dev@example.com");
        assert!(release.created_at.is_some());

        let bare = Release::from(serde_json::from_str::<ReleaseWire>(r#"{"version": 1}"#).unwrap());
        assert!(bare.description.is_empty());
        assert!(bare.author_email.is_empty());
    }

    #[test]
    fn test_app_and_addon_decoding() {
        let app = AppInfo::from(
            serde_json::from_str::<AppWire>(
                r#"{"name":"myapp","owner":{"email":"o@example.com"},
                    "region":{"name":"eu"},"stack":{"name":"heroku-22"},
                    "web_url":"https://myapp.herokuapp.com/"}"#,
            )
            .unwrap(),
        );
        assert_eq!(app.region.as_deref(), Some("eu"));
        assert_eq!(app.stack.as_deref(), Some("heroku-22"));

        let addon = Addon::from(serde_json::from_str::<AddonWire>(r#"{"name":"pg-1"}"#).unwrap());
        assert_eq!(addon.plan, "Unknown");
        assert_eq!(addon.state, "Unknown");
    }

    #[test]
    fn test_client_builds() {
        let client =
            HerokuClient::new("key", "https://api.example.com/", Duration::from_secs(5), 0)
                .unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.release_limit, 1);
    }
}
