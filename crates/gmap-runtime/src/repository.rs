#![forbid(unsafe_code)]

//! Guardian repository seam.
//!
//! The data source is external: the host fetches raw JSON (or implements
//! [`GuardianRepository`]) and hands the decoded [`SnapshotPayload`] to the
//! program. The optional `http` feature adds a blocking HTTP client for
//! native hosts.

use std::fmt;

use gmap_core::{GuardianNode, MapMetrics, NetworkConnection};
use serde::de::DeserializeOwned;

/// Errors raised while fetching or decoding repository data.
#[derive(Debug)]
pub enum FetchError {
    /// The request never produced a response.
    Transport(String),
    /// The server answered with a non-success status.
    Status { status: u16, url: String },
    /// The body was not the expected JSON shape.
    Decode(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status { status, url } => write!(f, "HTTP {status} from {url}"),
            Self::Decode(err) => write!(f, "decode error: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Transport(_) | Self::Status { .. } => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

/// Everything one refresh needs to build a snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotPayload {
    pub nodes: Vec<GuardianNode>,
    pub connections: Vec<NetworkConnection>,
    /// Server-computed metrics; computed locally when absent.
    pub metrics: Option<MapMetrics>,
}

impl SnapshotPayload {
    /// Decode raw response bodies.
    pub fn from_json(
        nodes: &str,
        connections: &str,
        metrics: Option<&str>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            nodes: decode(nodes)?,
            connections: decode(connections)?,
            metrics: metrics.map(decode).transpose()?,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Read-only source of guardian records.
pub trait GuardianRepository {
    fn fetch_nodes(&self) -> Result<Vec<GuardianNode>, FetchError>;

    fn fetch_connections(&self) -> Result<Vec<NetworkConnection>, FetchError>;

    /// Aggregate metrics, if the source computes them.
    fn fetch_metrics(&self) -> Result<Option<MapMetrics>, FetchError> {
        Ok(None)
    }
}

/// Fetch all three resources; the first failure wins.
pub fn fetch_payload<R: GuardianRepository + ?Sized>(
    repo: &R,
) -> Result<SnapshotPayload, FetchError> {
    Ok(SnapshotPayload {
        nodes: repo.fetch_nodes()?,
        connections: repo.fetch_connections()?,
        metrics: repo.fetch_metrics()?,
    })
}

/// In-memory repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    payload: SnapshotPayload,
    failure: Option<String>,
}

impl MemoryRepository {
    pub fn new(nodes: Vec<GuardianNode>, connections: Vec<NetworkConnection>) -> Self {
        Self {
            payload: SnapshotPayload {
                nodes,
                connections,
                metrics: None,
            },
            failure: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: MapMetrics) -> Self {
        self.payload.metrics = Some(metrics);
        self
    }

    /// Make every fetch fail with a transport error.
    #[must_use]
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn check(&self) -> Result<(), FetchError> {
        match &self.failure {
            Some(msg) => Err(FetchError::Transport(msg.clone())),
            None => Ok(()),
        }
    }
}

impl GuardianRepository for MemoryRepository {
    fn fetch_nodes(&self) -> Result<Vec<GuardianNode>, FetchError> {
        self.check()?;
        Ok(self.payload.nodes.clone())
    }

    fn fetch_connections(&self) -> Result<Vec<NetworkConnection>, FetchError> {
        self.check()?;
        Ok(self.payload.connections.clone())
    }

    fn fetch_metrics(&self) -> Result<Option<MapMetrics>, FetchError> {
        self.check()?;
        Ok(self.payload.metrics.clone())
    }
}

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use http::HttpRepository;

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
mod http {
    use super::{FetchError, GuardianRepository, decode};
    use gmap_core::{GuardianNode, MapMetrics, NetworkConnection};
    use serde::de::DeserializeOwned;

    /// Blocking HTTP repository serving `{base_url}/nodes`,
    /// `{base_url}/connections` and `{base_url}/metrics`.
    #[derive(Debug, Clone)]
    pub struct HttpRepository {
        client: reqwest::blocking::Client,
        base_url: String,
    }

    impl HttpRepository {
        pub fn new(base_url: &str) -> Self {
            Self {
                client: reqwest::blocking::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }

        fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
            let url = format!("{}{}", self.base_url, path);
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            if !response.status().is_success() {
                return Err(FetchError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }
            let body = response
                .text()
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            decode(&body)
        }
    }

    impl GuardianRepository for HttpRepository {
        fn fetch_nodes(&self) -> Result<Vec<GuardianNode>, FetchError> {
            self.get("/nodes")
        }

        fn fetch_connections(&self) -> Result<Vec<NetworkConnection>, FetchError> {
            self.get("/connections")
        }

        fn fetch_metrics(&self) -> Result<Option<MapMetrics>, FetchError> {
            self.get::<MapMetrics>("/metrics").map(Some)
        }
    }
}
