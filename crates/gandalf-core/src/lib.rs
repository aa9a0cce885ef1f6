// # gandalf-core
//
// Core library for gandalf: host inventory in, network config files out.
//
// ## Architecture Overview
//
// - **inventory**: CSV inventory parsing with all-or-nothing validation
// - **address**: IPv4 subnet arithmetic
// - **render**: hosts-file, forward/reverse zone and DHCP lease renderers
// - **zone**: zone serial reconciliation against the deployed zone
// - **query**: field-predicate record selection
// - **artifact**: YAML artifact specs tying renderers into output files
// - **walk**: spec tree to output path mapping
// - **config**: YAML variables file
//
// ## Design Principles
//
// 1. **Pure core**: renderers and the reconciler are functions of their
//    inputs; file I/O stays at the edges
// 2. **Deterministic output**: renderers sort internally, so input order
//    never changes the bytes written
// 3. **Fail whole**: one bad inventory field rejects the inventory
// 4. **No hidden state**: the previous zone file is the only history

pub mod address;
pub mod artifact;
pub mod config;
pub mod error;
pub mod inventory;
pub mod query;
pub mod render;
pub mod traits;
pub mod walk;
pub mod zone;

// Re-export core types for convenience
pub use artifact::{ArtifactSpec, BuiltArtifact, Section};
pub use config::GandalfConfig;
pub use error::{Error, Result};
pub use inventory::{EntityType, HostRecord, InventoryOptions};
pub use query::Filter;
pub use render::{DhcpOptions, ForwardMode, View};
pub use traits::{Clock, FixedClock, SystemClock};
pub use walk::{ArtifactPath, find_artifacts};
pub use zone::{Reconciled, ZoneMarker, ZoneReconciler};
