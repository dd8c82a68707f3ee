//! Router configuration and JSON route manifests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::request::{DEFAULT_SCRIPT_NAME, Method};
use crate::router::{RouteOptions, RouteTable};
use crate::url::UrlBuilder;

fn default_prefix() -> String {
    "/".to_string()
}

fn default_script_name() -> String {
    DEFAULT_SCRIPT_NAME.to_string()
}

/// Application-level router settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Absolute base URL of the application, used to build links.
    #[serde(default)]
    pub base_url: String,
    /// Prefix applied to every registered rule.
    #[serde(default = "default_prefix")]
    pub path_prefix: String,
    /// Entry script stripped from the reported script path.
    #[serde(default = "default_script_name")]
    pub script_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path_prefix: default_prefix(),
            script_name: default_script_name(),
        }
    }
}

impl RouterConfig {
    /// Creates a URL builder for this configuration.
    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::new(self.base_url.clone()).with_prefix(&self.path_prefix)
    }
}

/// One method name or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MethodNames {
    /// A single method, e.g. `"GET"`.
    One(String),
    /// Several methods, e.g. `["GET", "POST"]`.
    Many(Vec<String>),
}

impl MethodNames {
    /// Parses every name into a [`Method`].
    pub fn parse(&self) -> Result<Vec<Method>> {
        let names = match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names.as_slice(),
        };

        names
            .iter()
            .map(|name| {
                Method::from_str(name).ok_or_else(|| RouterError::UnsupportedMethod(name.clone()))
            })
            .collect()
    }
}

/// A route declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteEntry {
    /// Method or methods the rule is registered for.
    pub method: MethodNames,
    /// Rule pattern.
    pub rule: String,
    /// Handler name.
    pub handler: String,
    /// Response options.
    #[serde(default)]
    pub options: RouteOptions,
}

/// A JSON description of a route table.
///
/// ```json
/// {
///   "baseUrl": "https://example.com",
///   "pathPrefix": "/blog",
///   "routes": [
///     { "method": "GET", "rule": "/posts/(:slug)", "handler": "show_post" },
///     { "method": ["GET", "POST"], "rule": "/login", "handler": "login",
///       "options": { "contentType": "text/html" } }
///   ],
///   "errors": { "404": "not_found", "500": "server_error" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteManifest {
    /// Router settings.
    #[serde(flatten)]
    pub config: RouterConfig,
    /// Routes, in registration order.
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Error handler names keyed by code.
    #[serde(default)]
    pub errors: BTreeMap<u16, String>,
}

impl RouteManifest {
    /// Parses a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RouterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading route manifest");
        Self::from_json(&json)
    }

    /// Builds the route table described by this manifest. Handlers are
    /// referenced by name.
    pub fn build(&self) -> Result<RouteTable<String>> {
        let mut table = RouteTable::new();
        table.set_prefix(&self.config.path_prefix);

        for entry in &self.routes {
            let methods = entry.method.parse()?;
            table.register(methods, &entry.rule, entry.handler.clone(), entry.options.clone());
        }

        for (code, handler) in &self.errors {
            table.set_error(*code, handler.clone());
        }

        Ok(table)
    }
}
