//! Shared fixtures for contract tests
//!
//! A small but complete inventory plus helpers for pinning the date and
//! laying out spec trees on disk.

#![allow(dead_code)]

use chrono::NaiveDate;
use gandalf_core::inventory::{self, InventoryOptions};
use gandalf_core::{FixedClock, HostRecord, ZoneMarker, ZoneReconciler};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Inventory with comments, an ignored row, aliases and hosts sharing a
/// subnet
pub const INVENTORY: &str = "\
# lab inventory
Hostname,Domain,IP,MAC,VLAN,Mask,Entity Type,Resides On,gandalf_ignore
head1,bar.com,10.0.0.1,00:11:22:33:44:01,10,24,head,,
comp1,bar.com,10.0.0.11,00:11:22:33:44:11,10,24,comp,,
comp2,bar.com,10.0.0.12,00:11:22:33:44:12,10,24,comp,,

# retired
comp3,bar.com,10.0.0.13,00:11:22:33:44:13,10,24,comp,,yes
www,bar.com,10.0.0.1,,,24,alias,head1,
";

/// Parse [`INVENTORY`] with default options
pub fn hosts() -> Vec<HostRecord> {
    inventory::parse_str(INVENTORY, &InventoryOptions::default())
        .expect("fixture inventory is valid")
}

/// Reconciler whose clock reads the given date
pub fn reconciler_on(y: i32, m: u32, d: u32) -> ZoneReconciler {
    let date = NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
    ZoneReconciler::with_clock(ZoneMarker::default(), Arc::new(FixedClock::new(date)))
}

/// Zone text with the given serial token on the version line
pub fn zone_with_serial(serial: &str, records: &str) -> String {
    format!(
        "$TTL 1d\n@ IN SOA ns1.bar.com. root.bar.com. (\n        {} ; zone-version\n        1h 15m 1w 1d )\n{}",
        serial, records
    )
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    fs::write(path, content).expect("write fixture file");
}
