// # Host Records
//
// A `HostRecord` is one validated inventory row. Records are built once by
// the inventory parser and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Kind of network entity an inventory row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Compute node
    Comp,
    /// Head node
    Head,
    /// Alias for another host (rendered as CNAME)
    Alias,
    /// Cisco integrated management controller
    Cimc,
    /// Fabric interconnect
    Fi,
    /// Other hardware
    Hardware,
}

impl EntityType {
    /// All accepted entity types
    pub const ALL: [EntityType; 6] = [
        EntityType::Comp,
        EntityType::Head,
        EntityType::Alias,
        EntityType::Cimc,
        EntityType::Fi,
        EntityType::Hardware,
    ];

    /// Inventory spelling of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Comp => "comp",
            EntityType::Head => "head",
            EntityType::Alias => "alias",
            EntityType::Cimc => "cimc",
            EntityType::Fi => "fi",
            EntityType::Hardware => "hardware",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// One validated inventory row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    pub(crate) hostname: String,
    pub(crate) domain: String,
    pub(crate) ip: Ipv4Addr,
    pub(crate) mac: String,
    pub(crate) vlan: Option<u16>,
    pub(crate) mask: Option<u8>,
    pub(crate) entity_type: Option<EntityType>,
    pub(crate) resides_on: String,
    pub(crate) extra: BTreeMap<String, String>,
}

impl HostRecord {
    /// Start building a record by hand (tests and embedding callers)
    ///
    /// The parser is the only path that validates field text; the builder
    /// takes already-typed values.
    pub fn builder(
        hostname: impl Into<String>,
        domain: impl Into<String>,
        ip: Ipv4Addr,
    ) -> HostRecordBuilder {
        HostRecordBuilder {
            record: HostRecord {
                hostname: hostname.into(),
                domain: domain.into(),
                ip,
                mac: String::new(),
                vlan: None,
                mask: None,
                entity_type: None,
                resides_on: String::new(),
                extra: BTreeMap::new(),
            },
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `hostname.domain`
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.hostname, self.domain)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// MAC address as written in the inventory; empty when unknown
    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn vlan(&self) -> Option<u16> {
        self.vlan
    }

    /// Prefix length of the host's network
    pub fn mask(&self) -> Option<u8> {
        self.mask
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }

    /// Hostname this record points at (CNAME target), unchecked
    pub fn resides_on(&self) -> &str {
        &self.resides_on
    }

    /// Columns the parser does not interpret
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Look up any field by its normalized column name
    ///
    /// Typed fields are rendered back to their inventory spelling; absent
    /// optional fields read as the empty string. Unknown names fall through
    /// to the pass-through columns.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "hostname" => self.hostname.clone(),
            "domain" => self.domain.clone(),
            "ip" => self.ip.to_string(),
            "mac" => self.mac.clone(),
            "vlan" => self.vlan.map(|v| v.to_string()).unwrap_or_default(),
            "mask" => self.mask.map(|m| m.to_string()).unwrap_or_default(),
            "entity_type" => self
                .entity_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            "resides_on" => self.resides_on.clone(),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }
}

/// Builder for [`HostRecord`]
#[derive(Debug, Clone)]
pub struct HostRecordBuilder {
    record: HostRecord,
}

impl HostRecordBuilder {
    pub fn mac(mut self, mac: impl Into<String>) -> Self {
        self.record.mac = mac.into();
        self
    }

    pub fn vlan(mut self, vlan: u16) -> Self {
        self.record.vlan = Some(vlan);
        self
    }

    pub fn mask(mut self, mask: u8) -> Self {
        self.record.mask = Some(mask);
        self
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.record.entity_type = Some(entity_type);
        self
    }

    pub fn resides_on(mut self, target: impl Into<String>) -> Self {
        self.record.resides_on = target.into();
        self
    }

    pub fn extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.extra.insert(column.into(), value.into());
        self
    }

    pub fn build(self) -> HostRecord {
        self.record
    }
}
