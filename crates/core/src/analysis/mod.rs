//! Topology analysis.
//!
//! - `hierarchy`: folds embedded thread classes into their most-derived thread
//! - `connectivity`: pairs publishers with subscribers per layer and scope and
//!   tracks endpoints left without a counterpart

pub mod connectivity;
pub mod hierarchy;

pub use connectivity::{
    resolve_topology, ApplicationTopology, Connection, DisconnectedEndpoint,
    DisconnectedSubscribers, Endpoint, EndpointRole, LayerStats, PlatformTopology, ScopeMatch,
    ThreadTopology, Topology, TopologyStats,
};
pub use hierarchy::{is_direct_subclass, resolve_thread_hierarchy};
