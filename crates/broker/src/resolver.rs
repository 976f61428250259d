//! Broker Resolver - where the cluster currently lives
//!
//! A resolver produces the ordered list of broker endpoints the delivery
//! client should bootstrap from. The strategy is fixed at configuration
//! time:
//!
//! - [`StaticResolver`] parses a configured `host:port,host:port` string
//!   once and hands back the same set on every call.
//! - [`RegistryResolver`] asks a coordination registry on every call, so
//!   a refresh after a delivery failure observes broker membership
//!   changes. Nothing is cached.
//!
//! Resolution failure is reported, never swallowed here; the engine
//! decides to log and continue with an empty set.

use std::fmt;

use serde::Deserialize;

use crate::error::ResolveError;
use crate::registry::RegistryClient;

/// Ordered list of broker endpoints (`host:port`)
///
/// Rebuilt wholesale on every refresh, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerSet {
    endpoints: Vec<String>,
}

impl BrokerSet {
    /// Create a broker set from endpoint strings
    pub fn new(endpoints: Vec<String>) -> Self {
        Self { endpoints }
    }

    /// The endpoints in order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Number of endpoints
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no endpoints are known
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl fmt::Display for BrokerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoints.join(","))
    }
}

/// Strategy for producing the current broker set
pub trait BrokerResolver: Send {
    /// Produce a fresh broker set
    fn resolve(&mut self) -> Result<BrokerSet, ResolveError>;
}

/// Fixed broker list from configuration
///
/// The endpoint string is split once at construction; `resolve` is then
/// just a copy.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    brokers: BrokerSet,
}

impl StaticResolver {
    /// Parse a comma-delimited endpoint string
    ///
    /// Blank entries are dropped, so trailing commas and stray spaces in
    /// hand-written configs are harmless.
    pub fn new(endpoints: &str) -> Self {
        let endpoints: Vec<String> = endpoints
            .split(',')
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .map(String::from)
            .collect();

        Self {
            brokers: BrokerSet::new(endpoints),
        }
    }
}

impl BrokerResolver for StaticResolver {
    fn resolve(&mut self) -> Result<BrokerSet, ResolveError> {
        Ok(self.brokers.clone())
    }
}

/// Registered broker metadata, as stored in the registry
#[derive(Debug, Deserialize)]
struct BrokerMeta {
    host: String,
    port: u16,
}

/// Registry-backed broker discovery
///
/// Broker ids live as child nodes under `<base>/ids`; each id node holds
/// a JSON payload with the broker's `host` and `port`.
pub struct RegistryResolver<C> {
    client: C,
    base_path: String,
}

impl<C: RegistryClient> RegistryResolver<C> {
    /// Create a resolver over a registry connection
    pub fn new(client: C, base_path: impl Into<String>) -> Self {
        Self {
            client,
            base_path: base_path.into(),
        }
    }

    /// The registry path broker ids are listed under
    pub fn ids_path(&self) -> String {
        format!("{}/ids", self.base_path)
    }
}

impl<C: RegistryClient> BrokerResolver for RegistryResolver<C> {
    fn resolve(&mut self) -> Result<BrokerSet, ResolveError> {
        let ids_path = self.ids_path();
        let ids = self.client.children(&ids_path)?;

        let mut endpoints = Vec::with_capacity(ids.len());
        for id in ids {
            let raw = self.client.read(&format!("{ids_path}/{id}"))?;
            let meta: BrokerMeta =
                serde_json::from_slice(&raw).map_err(|err| ResolveError::Metadata {
                    id: id.clone(),
                    message: err.to_string(),
                })?;
            endpoints.push(format!("{}:{}", meta.host, meta.port));
        }

        tracing::debug!(brokers = endpoints.len(), path = %ids_path, "resolved broker set from registry");

        Ok(BrokerSet::new(endpoints))
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
