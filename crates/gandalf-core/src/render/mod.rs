//! Output format renderers
//!
//! Each renderer turns a set of [`HostRecord`]s into one block of text:
//! lines joined by `\n`, no trailing newline. Output never depends on the
//! order of the input, with one deliberate exception: hosts sharing an
//! address in [`hosts_file`] keep their inventory order.
//!
//! - [`hosts_file`]: `/etc/hosts` lines
//! - [`dns_forward`]: `A` or `CNAME` zone records
//! - [`dns_reverse`]: `PTR` zone records
//! - [`dhcp_leases`]: ISC dhcpd static host clauses
//!
//! [`View`] selects one of them by name, so artifact specs can name the
//! renderer they want.

mod dhcp;
mod dns;
mod hosts;

pub use dhcp::{DhcpOptions, dhcp_leases};
pub use dns::{ForwardMode, dns_forward, dns_reverse};
pub use hosts::hosts_file;

use crate::error::Result;
use crate::inventory::HostRecord;
use serde::{Deserialize, Serialize};

/// A renderer and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    /// [`hosts_file`]
    Hosts,
    /// [`dns_forward`]
    DnsForward {
        /// Record type to emit
        mode: ForwardMode,
    },
    /// [`dns_reverse`]
    DnsReverse,
    /// [`dhcp_leases`]
    Dhcp(DhcpOptions),
}

impl View {
    /// Run the selected renderer
    pub fn render<'a, I>(&self, records: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a HostRecord>,
    {
        match self {
            View::Hosts => Ok(hosts_file(records)),
            View::DnsForward { mode } => Ok(dns_forward(records, *mode)),
            View::DnsReverse => dns_reverse(records),
            View::Dhcp(options) => dhcp_leases(records, options),
        }
    }

    /// Short name for log messages
    pub fn name(&self) -> &'static str {
        match self {
            View::Hosts => "hosts",
            View::DnsForward { .. } => "dns_forward",
            View::DnsReverse => "dns_reverse",
            View::Dhcp(_) => "dhcp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_view_dispatch() {
        let records = [HostRecord::builder("foo", "bar.com", Ipv4Addr::new(10, 0, 0, 1)).build()];

        assert_eq!(
            View::Hosts.render(&records).unwrap(),
            "10.0.0.1 foo foo.bar.com"
        );
        assert_eq!(
            View::DnsReverse.render(&records).unwrap(),
            "1       1d      IN      PTR     foo.bar.com."
        );
        assert!(View::Dhcp(DhcpOptions::default()).render(&records).is_err());
    }

    #[test]
    fn test_view_from_yaml() {
        let view: View = serde_yaml::from_str("view: dns_forward\nmode: cname\n").unwrap();
        assert_eq!(
            view,
            View::DnsForward {
                mode: ForwardMode::Cname
            }
        );

        let view: View =
            serde_yaml::from_str("view: dhcp\nhostname_option: true\nrouter: 10.0.0.1\n").unwrap();
        assert_eq!(
            view,
            View::Dhcp(DhcpOptions {
                hostname_option: Some(true),
                router: Some(Ipv4Addr::new(10, 0, 0, 1)),
                filename: None,
            })
        );

        assert!(serde_yaml::from_str::<View>("view: dns_forward\nmode: ptr\n").is_err());
        assert!(serde_yaml::from_str::<View>("view: zone\n").is_err());
    }
}
