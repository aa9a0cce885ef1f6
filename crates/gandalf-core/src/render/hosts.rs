use crate::inventory::HostRecord;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Render `/etc/hosts` lines, one per address
///
/// Addresses are sorted numerically. Hosts sharing an address keep their
/// inventory order on the line, each as `name name.domain`.
pub fn hosts_file<'a>(records: impl IntoIterator<Item = &'a HostRecord>) -> String {
    let mut groups: BTreeMap<Ipv4Addr, Vec<&HostRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.ip()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(ip, members)| {
            let mut line = ip.to_string();
            for host in members {
                line.push(' ');
                line.push_str(host.hostname());
                line.push(' ');
                line.push_str(&host.fqdn());
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
