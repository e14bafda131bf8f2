//! Raw plugin protocol: JSON input on stdin, JSON result on stdout.

use std::io::Read;

use scenepath_common::{Error, Result};
use serde::Deserialize;

use crate::tasks::TaskArgs;

/// Session cookie the host hands to plugins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// How to reach the host that invoked the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConnection {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub session_cookie: Option<SessionCookie>,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_port() -> u16 {
    9999
}

impl ServerConnection {
    /// Base URL of the host. A wildcard bind address maps to localhost.
    pub fn base_url(&self) -> String {
        let host = match self.host.as_deref() {
            None | Some("") | Some("0.0.0.0") | Some("::") => "localhost",
            Some(host) => host,
        };
        format!("{}://{}:{}", self.scheme, host, self.port)
    }
}

/// Everything the host sends on stdin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginInput {
    pub server_connection: ServerConnection,
    #[serde(default)]
    pub args: TaskArgs,
}

/// Read and parse the plugin input.
pub fn read_input<R: Read>(reader: R) -> Result<PluginInput> {
    serde_json::from_reader(reader)
        .map_err(|e| Error::config(format!("invalid plugin input: {}", e)))
}
