//! Zone serial reconciliation
//!
//! A rendered zone carries its serial on a single "version line": the
//! serial, the comment delimiter, then the marker, e.g.
//!
//! ```text
//!         2024060100 ; zone-version
//! ```
//!
//! Freshly rendered zones hold the placeholder where the serial goes. The
//! reconciler compares the new zone with the previously deployed one,
//! ignoring comments, whitespace and the version line itself, and picks the
//! serial:
//!
//! | previous zone      | content  | serial                                    |
//! |--------------------|----------|-------------------------------------------|
//! | missing/unreadable | -        | `YYYYMMDD00` of today                     |
//! | serial `0`/absent  | -        | `YYYYMMDD00` of today                     |
//! | serial `s`         | same     | `s`                                       |
//! | serial `s`         | changed  | `YYYYMMDD00` if greater than `s`, else `s + 1` |
//!
//! The previous zone file is the only state; no counter is kept anywhere.

use crate::error::{Error, Result};
use crate::traits::{Clock, SystemClock};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tokens locating the serial inside a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMarker {
    /// Comment delimiter of the zone dialect
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Marker text following the delimiter on the version line
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Stand-in for the serial in freshly rendered zones
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl ZoneMarker {
    /// Validate the marker tokens
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::config("zone comment delimiter cannot be empty"));
        }
        if self.marker.is_empty() {
            return Err(Error::config("zone version marker cannot be empty"));
        }
        if self.placeholder.is_empty() {
            return Err(Error::config("zone version placeholder cannot be empty"));
        }
        if self.placeholder.contains(&self.marker) || self.marker.contains(&self.placeholder) {
            return Err(Error::config(
                "zone version placeholder and marker must not overlap",
            ));
        }
        if self.placeholder.contains(&self.delimiter) {
            return Err(Error::config(
                "zone version placeholder cannot contain the comment delimiter",
            ));
        }
        Ok(())
    }

    /// The line a zone header embeds where the serial belongs
    pub fn version_line(&self) -> String {
        format!("{} {} {}", self.placeholder, self.delimiter, self.marker)
    }

    /// Serial carried by the first version line, `0` if there is none
    ///
    /// The serial is the last word before the delimiter preceding the
    /// marker, in plain decimal.
    pub fn extract_version(&self, zone: &str) -> u64 {
        let Some(line) = zone.lines().find(|line| line.contains(&self.marker)) else {
            return 0;
        };
        let head = line
            .find(&self.marker)
            .map(|pos| &line[..pos])
            .unwrap_or(line);
        let Some(cut) = head.rfind(&self.delimiter) else {
            return 0;
        };

        head[..cut]
            .split_whitespace()
            .last()
            .filter(|token| token.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|token| token.parse().ok())
            .unwrap_or(0)
    }

    /// Comparison signature of a zone
    ///
    /// Version lines are dropped, comments cut, whitespace collapsed and
    /// blank lines removed.
    pub fn normalize(&self, zone: &str) -> String {
        zone.lines()
            .filter(|line| !line.contains(&self.marker))
            .map(|line| {
                let body = match line.find(&self.delimiter) {
                    Some(pos) => &line[..pos],
                    None => line,
                };
                body.split_whitespace().collect::<Vec<_>>().join(" ")
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ZoneMarker {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            marker: default_marker(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_marker() -> String {
    "zone-version".to_string()
}

fn default_placeholder() -> String {
    "@ZONE_VERSION@".to_string()
}

/// Serial candidate for a calendar date: `YYYYMMDD00`
pub fn candidate_version(date: NaiveDate) -> u64 {
    let year = u64::try_from(date.year()).unwrap_or(0);
    year * 1_000_000 + u64::from(date.month()) * 10_000 + u64::from(date.day()) * 100
}

/// Outcome of a reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Zone text with the placeholder replaced by [`Self::version`]
    pub text: String,
    /// Serial written into the zone
    pub version: u64,
    /// Serial found in the previous zone (`0` without one)
    pub previous_version: u64,
    /// Whether the zone counted as changed
    pub changed: bool,
}

/// Decides zone serials against the previously deployed zone
#[derive(Clone)]
pub struct ZoneReconciler {
    marker: ZoneMarker,
    clock: Arc<dyn Clock>,
}

impl ZoneReconciler {
    /// Create a reconciler dating serials by the local clock
    pub fn new(marker: ZoneMarker) -> Self {
        Self::with_clock(marker, Arc::new(SystemClock))
    }

    /// Create a reconciler with an explicit date source
    pub fn with_clock(marker: ZoneMarker, clock: Arc<dyn Clock>) -> Self {
        Self { marker, clock }
    }

    pub fn marker(&self) -> &ZoneMarker {
        &self.marker
    }

    /// See [`ZoneMarker::extract_version`]
    pub fn extract_version(&self, zone: &str) -> u64 {
        self.marker.extract_version(zone)
    }

    /// See [`ZoneMarker::normalize`]
    pub fn normalize(&self, zone: &str) -> String {
        self.marker.normalize(zone)
    }

    /// Pick the serial for `new_zone` and splice it in
    ///
    /// `previous` is the deployed zone text, `None` when it could not be
    /// read.
    pub fn reconcile(&self, new_zone: &str, previous: Option<&str>) -> Reconciled {
        let (changed, previous_version) = match previous {
            None => (true, 0),
            Some(previous) => {
                let old = self.extract_version(previous);
                let changed = old == 0 || self.normalize(new_zone) != self.normalize(previous);
                (changed, old)
            }
        };

        let version = if changed {
            let candidate = candidate_version(self.clock.today());
            if candidate > previous_version {
                candidate
            } else {
                previous_version.saturating_add(1)
            }
        } else {
            previous_version
        };

        if !new_zone.contains(&self.marker.placeholder) {
            warn!(
                "Zone text has no '{}' placeholder; serial {} not written",
                self.marker.placeholder, version
            );
        }
        debug!(
            "Zone serial {} -> {} (changed: {})",
            previous_version, version, changed
        );

        Reconciled {
            text: new_zone.replace(&self.marker.placeholder, &version.to_string()),
            version,
            previous_version,
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FixedClock;

    fn reconciler(y: i32, m: u32, d: u32) -> ZoneReconciler {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        ZoneReconciler::with_clock(ZoneMarker::default(), Arc::new(FixedClock::new(date)))
    }

    fn zone(serial: &str, body: &str) -> String {
        format!(
            "$TTL 1d\n@ IN SOA ns1.bar.com. admin.bar.com. (\n    {} ; zone-version\n    1h 15m 1w 1d )\n{}",
            serial, body
        )
    }

    #[test]
    fn test_candidate_version() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(candidate_version(date), 2024060100);
    }

    #[test]
    fn test_extract_version() {
        let marker = ZoneMarker::default();
        assert_eq!(marker.extract_version(&zone("2016123100", "")), 2016123100);
        assert_eq!(marker.extract_version("foo IN A 10.0.0.1"), 0);
        assert_eq!(marker.extract_version(&zone("@ZONE_VERSION@", "")), 0);
        assert_eq!(marker.extract_version(&zone("-5", "")), 0);
        assert_eq!(marker.extract_version("  zone-version 2016123100"), 0);
        assert_eq!(
            marker.extract_version("1 ; zone-version\n2 ; zone-version"),
            1
        );
    }

    #[test]
    fn test_normalize_ignores_comments_whitespace_and_version() {
        let marker = ZoneMarker::default();
        let a = zone("2016123100", "foo   IN  A   10.0.0.1 ; web\n\n");
        let b = zone("2017010100", "foo IN A 10.0.0.1");
        assert_eq!(marker.normalize(&a), marker.normalize(&b));
        assert!(!marker.normalize(&a).contains("zone-version"));
    }

    #[test]
    fn test_unchanged_zone_keeps_serial() {
        let r = reconciler(2017, 1, 1);
        let body = "foo IN A 10.0.0.1";
        let out = r.reconcile(&zone("@ZONE_VERSION@", body), Some(&zone("2016123100", body)));
        assert_eq!(out.version, 2016123100);
        assert!(!out.changed);
        assert_eq!(out.text, zone("2016123100", body));
    }

    #[test]
    fn test_changed_zone_takes_todays_serial() {
        let r = reconciler(2017, 1, 1);
        let out = r.reconcile(
            &zone("@ZONE_VERSION@", "foo IN A 10.0.0.2"),
            Some(&zone("2016123100", "foo IN A 10.0.0.1")),
        );
        assert_eq!(out.version, 2017010100);
        assert_eq!(out.previous_version, 2016123100);
        assert!(out.changed);
    }

    #[test]
    fn test_changed_zone_same_day_increments() {
        let r = reconciler(2017, 1, 1);
        let out = r.reconcile(
            &zone("@ZONE_VERSION@", "foo IN A 10.0.0.2"),
            Some(&zone("2017010130", "foo IN A 10.0.0.1")),
        );
        assert_eq!(out.version, 2017010131);

        let unchanged = r.reconcile(
            &zone("@ZONE_VERSION@", "foo IN A 10.0.0.1"),
            Some(&zone("2017010130", "foo IN A 10.0.0.1")),
        );
        assert_eq!(unchanged.version, 2017010130);
    }

    #[test]
    fn test_missing_history_or_zero_serial_counts_as_changed() {
        let r = reconciler(2017, 1, 1);
        let body = "foo IN A 10.0.0.1";
        let fresh = r.reconcile(&zone("@ZONE_VERSION@", body), None);
        assert_eq!(fresh.version, 2017010100);
        assert!(fresh.changed);

        let zeroed = r.reconcile(&zone("@ZONE_VERSION@", body), Some(&zone("0", body)));
        assert_eq!(zeroed.version, 2017010100);
        assert!(zeroed.changed);
    }

    #[test]
    fn test_marker_validation() {
        assert!(ZoneMarker::default().validate().is_ok());

        let same = ZoneMarker {
            placeholder: "zone-version".into(),
            ..ZoneMarker::default()
        };
        assert!(same.validate().is_err());

        let empty = ZoneMarker {
            delimiter: String::new(),
            ..ZoneMarker::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_custom_marker_dialect() {
        let marker = ZoneMarker {
            delimiter: "#".into(),
            marker: "serial".into(),
            placeholder: "SERIAL_HERE".into(),
        };
        assert_eq!(marker.version_line(), "SERIAL_HERE # serial");
        assert_eq!(marker.extract_version("  42 # serial"), 42);
        assert_eq!(marker.normalize("a  b # note\n42 # serial"), "a b");
    }
}
