//! Configuration types for gandalf
//!
//! The variables file is YAML; every key is optional.
//!
//! ```yaml
//! ignore_column: gandalf_ignore
//! zone:
//!   delimiter: ";"
//!   marker: zone-version
//!   placeholder: "@ZONE_VERSION@"
//! dhcp:
//!   router: 10.0.0.1
//!   filename: pxelinux.0
//! vars:
//!   admin: hostmaster.bar.com.
//! ```

use crate::error::{Error, Result};
use crate::inventory::{DEFAULT_IGNORE_COLUMN, InventoryOptions};
use crate::render::DhcpOptions;
use crate::zone::ZoneMarker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main gandalf configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GandalfConfig {
    /// Inventory column marking rows to skip
    #[serde(default = "default_ignore_column")]
    pub ignore_column: String,

    /// Zone serial marker tokens
    #[serde(default)]
    pub zone: ZoneMarker,

    /// Defaults for DHCP sections of artifact specs
    #[serde(default)]
    pub dhcp: DhcpOptions,

    /// Values for `${name}` expansion in artifact headers and footers
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

impl GandalfConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            ignore_column: default_ignore_column(),
            zone: ZoneMarker::default(),
            dhcp: DhcpOptions::default(),
            vars: BTreeMap::new(),
        }
    }

    /// Parse a YAML variables document
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let config: GandalfConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a variables file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ignore_column.trim().is_empty() {
            return Err(Error::config("ignore_column cannot be empty"));
        }
        self.zone.validate()?;

        if self.vars.contains_key(ZONE_VERSION_VAR) {
            return Err(Error::config(format!(
                "'{}' is reserved for the zone version line",
                ZONE_VERSION_VAR
            )));
        }
        Ok(())
    }

    /// Inventory parser options derived from this configuration
    pub fn inventory_options(&self) -> InventoryOptions {
        InventoryOptions::default().with_ignore_column(self.ignore_column.clone())
    }
}

impl Default for GandalfConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Variable name expanding to the zone version line
pub const ZONE_VERSION_VAR: &str = "zone_version";

fn default_ignore_column() -> String {
    DEFAULT_IGNORE_COLUMN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = GandalfConfig::from_yaml("").unwrap();
        assert_eq!(config.ignore_column, "gandalf_ignore");
        assert_eq!(config.zone, ZoneMarker::default());
        assert!(config.vars.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let config = GandalfConfig::from_yaml(
            "ignore_column: Skip\nzone:\n  marker: serial-no\ndhcp:\n  router: 10.0.0.1\nvars:\n  admin: root.bar.com.\n",
        )
        .unwrap();
        assert_eq!(config.ignore_column, "Skip");
        assert_eq!(config.zone.marker, "serial-no");
        assert_eq!(config.zone.delimiter, ";");
        assert_eq!(config.dhcp.router, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(config.vars["admin"], "root.bar.com.");
        assert_eq!(config.inventory_options().ignore_column, "Skip");
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            GandalfConfig::from_yaml("zone: [1, 2]"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            GandalfConfig::from_yaml("ignore_column: \"  \""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            GandalfConfig::from_yaml("vars:\n  zone_version: x\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            GandalfConfig::from_yaml("zone:\n  marker: \"\"\n"),
            Err(Error::Config(_))
        ));
    }
}
