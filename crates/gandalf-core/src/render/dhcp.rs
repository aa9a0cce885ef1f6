use crate::address::broadcast_address;
use crate::error::{Error, Result};
use crate::inventory::HostRecord;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Optional parts of a DHCP host clause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpOptions {
    /// Emit `option host-name "<fqdn>";` (off when unset)
    #[serde(default)]
    pub hostname_option: Option<bool>,

    /// Emit `option routers <router>;`
    #[serde(default)]
    pub router: Option<Ipv4Addr>,

    /// Emit `option filename "<filename>";`
    #[serde(default)]
    pub filename: Option<String>,
}

impl DhcpOptions {
    /// Fill every unset option from `defaults`
    pub fn or_defaults(&self, defaults: &DhcpOptions) -> DhcpOptions {
        DhcpOptions {
            hostname_option: self.hostname_option.or(defaults.hostname_option),
            router: self.router.or(defaults.router),
            filename: self.filename.clone().or_else(|| defaults.filename.clone()),
        }
    }
}

/// Render one static lease clause per host, sorted by the clause text
///
/// Hosts without a mask or a MAC address cannot be leased and fail the
/// whole rendering.
pub fn dhcp_leases<'a>(
    records: impl IntoIterator<Item = &'a HostRecord>,
    options: &DhcpOptions,
) -> Result<String> {
    let mut clauses = records
        .into_iter()
        .map(|host| host_clause(host, options))
        .collect::<Result<Vec<_>>>()?;

    clauses.sort();
    Ok(clauses.join("\n"))
}

fn host_clause(host: &HostRecord, options: &DhcpOptions) -> Result<String> {
    let mask = host
        .mask()
        .ok_or_else(|| Error::missing_field(host.hostname(), "mask"))?;
    if host.mac().is_empty() {
        return Err(Error::missing_field(host.hostname(), "mac"));
    }

    let mut statements = Vec::with_capacity(6);
    if options.hostname_option.unwrap_or(false) {
        statements.push(format!("option host-name \"{}\";", host.fqdn()));
    }
    statements.push(format!("hardware ethernet {};", host.mac()));
    statements.push(format!("fixed-address {};", host.ip()));
    statements.push(format!(
        "option broadcast-address {};",
        broadcast_address(host.ip(), mask)
    ));
    if let Some(router) = options.router {
        statements.push(format!("option routers {};", router));
    }
    if let Some(filename) = &options.filename {
        statements.push(format!("option filename \"{}\";", filename));
    }

    Ok(format!("host {} {{ {} }}", host.hostname(), statements.join(" ")))
}
