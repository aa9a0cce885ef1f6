//! Column normalization and per-field validators
//!
//! Every validator takes the trimmed cell text and answers whether it is
//! acceptable. Malformed numbers are a plain `false`, never a panic.

use super::record::EntityType;
use std::net::Ipv4Addr;

/// Normalize a header cell: trim, lower-case, spaces to underscores
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Run the validator declared for `column`; undeclared columns pass
pub fn validate(column: &str, value: &str) -> bool {
    match column {
        "hostname" | "domain" => !value.is_empty(),
        "vlan" => value.is_empty() || parse_vlan(value).is_some(),
        "ip" => parse_ipv4(value).is_some(),
        "mask" => parse_mask(value).is_some(),
        "mac" => value.is_empty() || is_mac(value),
        "entity_type" => value.parse::<EntityType>().is_ok(),
        _ => true,
    }
}

/// Decimal integer in the style the inventory writes them: optional sign,
/// ASCII digits only
fn parse_int(value: &str) -> Option<i64> {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// VLAN id strictly between 0 and 4096
pub fn parse_vlan(value: &str) -> Option<u16> {
    parse_int(value)
        .filter(|v| *v > 0 && *v < 4096)
        .and_then(|v| u16::try_from(v).ok())
}

/// Prefix length in `0..=32`
pub fn parse_mask(value: &str) -> Option<u8> {
    parse_int(value)
        .filter(|m| (0..=32).contains(m))
        .and_then(|m| u8::try_from(m).ok())
}

/// Strict dotted-quad: four decimal octets, no leading zeros
pub fn parse_ipv4(value: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = value.split('.');

    for slot in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if part.len() > 1 && part.starts_with('0') {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// Six colon-separated groups of exactly two hex digits
pub fn is_mac(value: &str) -> bool {
    let groups: Vec<&str> = value.split(':').collect();
    groups.len() == 6
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.bytes().all(|b| b.is_ascii_hexdigit()))
}
