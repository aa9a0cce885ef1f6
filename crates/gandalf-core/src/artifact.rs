//! Artifact specs
//!
//! An artifact spec describes one output file: literal header and footer
//! text around a list of renderer sections, each over a filtered record set.
//!
//! ```yaml
//! zone: true
//! header: |
//!   $TTL 1d
//!   @ IN SOA ns1.bar.com. ${admin} (
//!       ${zone_version}
//!       1h 15m 1w 1d )
//! sections:
//!   - view: dns_forward
//!     mode: addr
//!     filter:
//!       include: { domain: bar.com }
//! ```
//!
//! `${name}` expands from the configured variables; `${zone_version}` is the
//! version line the [`ZoneReconciler`] later fills in.

use crate::config::{GandalfConfig, ZONE_VERSION_VAR};
use crate::error::{Error, Result};
use crate::inventory::HostRecord;
use crate::query::Filter;
use crate::render::View;
use crate::zone::{Reconciled, ZoneReconciler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// One renderer over a filtered record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Renderer and its parameters
    #[serde(flatten)]
    pub view: View,

    /// Records the renderer sees
    #[serde(default)]
    pub filter: Filter,
}

/// Description of one output file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Reconcile the zone serial before writing
    #[serde(default)]
    pub zone: bool,

    /// Deployed zone to compare against; defaults to the output path
    #[serde(default)]
    pub previous: Option<PathBuf>,

    /// Literal text before the sections
    #[serde(default)]
    pub header: String,

    /// Renderer sections, in output order
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Literal text after the sections
    #[serde(default)]
    pub footer: String,
}

/// Text of a finished artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// File content, ending with a newline
    pub text: String,
    /// Serial decision, for zone artifacts
    pub zone: Option<Reconciled>,
}

impl ArtifactSpec {
    /// Parse a YAML artifact spec
    pub fn from_yaml(text: &str) -> Result<Self> {
        let spec: ArtifactSpec = serde_yaml::from_str(text)?;
        if spec.sections.is_empty() && spec.header.is_empty() && spec.footer.is_empty() {
            return Err(Error::artifact("spec has no header, sections or footer"));
        }
        Ok(spec)
    }

    /// Render header, sections and footer into one text
    ///
    /// Zone artifacts still carry the version placeholder at this point.
    pub fn render(&self, records: &[HostRecord], config: &GandalfConfig) -> Result<String> {
        let mut parts = Vec::with_capacity(self.sections.len() + 2);

        let header = expand_vars(&self.header, config)?;
        if !header.trim().is_empty() {
            parts.push(header.trim_end_matches('\n').to_string());
        }

        for section in &self.sections {
            let selected = section.filter.select(records);
            let view = match &section.view {
                View::Dhcp(options) => View::Dhcp(options.or_defaults(&config.dhcp)),
                other => other.clone(),
            };
            debug!("Rendering {} over {} record(s)", view.name(), selected.len());

            let body = view.render(selected)?;
            if !body.is_empty() {
                parts.push(body);
            }
        }

        let footer = expand_vars(&self.footer, config)?;
        if !footer.trim().is_empty() {
            parts.push(footer.trim_end_matches('\n').to_string());
        }

        let mut text = parts.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Render and, for zone artifacts, reconcile the serial
    ///
    /// `previous` is the deployed zone text; it is ignored for non-zone
    /// artifacts.
    pub fn build(
        &self,
        records: &[HostRecord],
        config: &GandalfConfig,
        reconciler: &ZoneReconciler,
        previous: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let text = self.render(records, config)?;
        if !self.zone {
            return Ok(BuiltArtifact { text, zone: None });
        }

        let placeholder = &reconciler.marker().placeholder;
        if !text.contains(placeholder.as_str()) {
            return Err(Error::artifact(format!(
                "zone artifact has no version placeholder (use ${{{}}} or '{}')",
                ZONE_VERSION_VAR, placeholder
            )));
        }

        let reconciled = reconciler.reconcile(&text, previous);
        Ok(BuiltArtifact {
            text: reconciled.text.clone(),
            zone: Some(reconciled),
        })
    }
}

/// Expand `${name}` references
///
/// `${zone_version}` becomes the configured version line. Unknown names are
/// an error; a `${` without closing brace is copied as is.
pub fn expand_vars(text: &str, config: &GandalfConfig) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = rest[start + 2..start + 2 + len].trim();

        out.push_str(&rest[..start]);
        if name == ZONE_VERSION_VAR {
            out.push_str(&config.zone.version_line());
        } else {
            let value = config
                .vars
                .get(name)
                .ok_or_else(|| Error::artifact(format!("unknown variable '{}'", name)))?;
            out.push_str(value);
        }
        rest = &rest[start + 3 + len..];
    }

    out.push_str(rest);
    Ok(out)
}
