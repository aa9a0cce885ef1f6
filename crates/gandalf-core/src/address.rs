//! IPv4 subnet arithmetic

use std::net::Ipv4Addr;

/// Netmask for a prefix length; lengths above 32 are treated as 32
pub fn netmask(prefix_len: u8) -> Ipv4Addr {
    Ipv4Addr::from(mask_bits(prefix_len))
}

/// First address of the network `ip/prefix_len`
pub fn network_address(ip: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & mask_bits(prefix_len))
}

/// Broadcast address of the network `ip/prefix_len`: every host bit set
pub fn broadcast_address(ip: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let mask = mask_bits(prefix_len);
    Ipv4Addr::from((u32::from(ip) & mask) | !mask)
}

fn mask_bits(prefix_len: u8) -> u32 {
    let host_bits = 32 - u32::from(prefix_len.min(32));
    u32::MAX.checked_shl(host_bits).unwrap_or(0)
}
