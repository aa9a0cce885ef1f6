//! Forward and reverse zone record renderers

use crate::error::{Error, Result};
use crate::inventory::HostRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Which forward records to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardMode {
    /// `A` records pointing at the host's address
    Addr,
    /// `CNAME` records pointing at `resides_on`
    Cname,
}

impl ForwardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardMode::Addr => "addr",
            ForwardMode::Cname => "cname",
        }
    }
}

impl fmt::Display for ForwardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForwardMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "addr" => Ok(ForwardMode::Addr),
            "cname" => Ok(ForwardMode::Cname),
            other => Err(Error::invalid_argument(format!(
                "unknown forward record mode '{}' (expected addr or cname)",
                other
            ))),
        }
    }
}

/// Render forward zone records, sorted by the full line
pub fn dns_forward<'a>(
    records: impl IntoIterator<Item = &'a HostRecord>,
    mode: ForwardMode,
) -> String {
    let mut lines: Vec<String> = records
        .into_iter()
        .map(|host| match mode {
            ForwardMode::Addr => {
                format!("{:<24}{:<8}{:<8}{}", host.hostname(), "IN", "A", host.ip())
            }
            ForwardMode::Cname => format!(
                "{:<24}{:<8}{:<8}{}",
                host.hostname(),
                "IN",
                "CNAME",
                host.resides_on()
            ),
        })
        .collect();

    lines.sort();
    lines.join("\n")
}

/// Render reverse zone `PTR` records
///
/// Every address must belong to exactly one host; otherwise the lowest
/// shared address is reported with all of its hostnames. Lines are ordered
/// by the numeric value of the last octet.
pub fn dns_reverse<'a>(records: impl IntoIterator<Item = &'a HostRecord>) -> Result<String> {
    let records: Vec<&HostRecord> = records.into_iter().collect();

    let mut owners: BTreeMap<Ipv4Addr, Vec<&str>> = BTreeMap::new();
    for host in &records {
        owners.entry(host.ip()).or_default().push(host.hostname());
    }
    if let Some((ip, hostnames)) = owners.into_iter().find(|(_, names)| names.len() > 1) {
        return Err(Error::Conflict {
            ip,
            hostnames: hostnames.into_iter().map(str::to_string).collect(),
        });
    }

    let mut lines: Vec<(u8, String)> = records
        .iter()
        .map(|host| {
            let last_octet = host.ip().octets()[3];
            let line = format!(
                "{:<8}{:<8}{:<8}{:<8}{}.",
                last_octet,
                "1d",
                "IN",
                "PTR",
                host.fqdn()
            );
            (last_octet, line)
        })
        .collect();

    lines.sort();
    Ok(lines
        .into_iter()
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n"))
}
