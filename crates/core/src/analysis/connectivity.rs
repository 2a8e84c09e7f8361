use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::model::{Application, Deployment, Layer, Platform, PubSubEntry};

/// A publish or subscribe entry located in its platform and application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Endpoint {
    pub platform: String,
    pub application: String,
    pub entry: PubSubEntry,
}

impl Endpoint {
    pub fn new(platform: &str, application: &str, entry: &PubSubEntry) -> Self {
        Self {
            platform: platform.to_string(),
            application: application.to_string(),
            entry: entry.clone(),
        }
    }
}

/// One resolved publisher -> subscriber edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub layer: Layer,
    pub publisher: Endpoint,
    pub subscriber: Endpoint,
}

/// Result of matching one publisher scope against its candidate subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeMatch {
    pub connections: Vec<Connection>,
    /// Publishers with no subscriber in scope; inner publications are never listed.
    pub disconnected_publishers: Vec<Endpoint>,
}

/// Accumulator of subscribers not yet reached by any publisher.
///
/// One accumulator is seeded per scope (application for interthread, platform
/// for interprocess, deployment for intervehicle) and threaded through every
/// matcher call for that scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectedSubscribers {
    entries: BTreeMap<(String, String), BTreeSet<PubSubEntry>>,
}

impl DisconnectedSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interthread subscribers of every thread in one application.
    pub fn for_threads(platform: &Platform, application: &Application) -> Self {
        let mut acc = Self::new();
        for thread in application.threads.values() {
            acc.extend(&platform.name, &application.name, &thread.subscribes);
        }
        acc
    }

    /// Interprocess subscribers of every application on one platform.
    pub fn for_processes(platform: &Platform) -> Self {
        let mut acc = Self::new();
        for application in platform.applications.values() {
            acc.extend(&platform.name, &application.name, &application.interprocess_subscribes);
        }
        acc
    }

    /// Intervehicle subscribers of every application in the deployment.
    pub fn for_vehicles(deployment: &Deployment) -> Self {
        let mut acc = Self::new();
        for platform in deployment.platforms.values() {
            for application in platform.applications.values() {
                acc.extend(&platform.name, &application.name, &application.intervehicle_subscribes);
            }
        }
        acc
    }

    pub fn insert(&mut self, platform: &str, application: &str, entry: PubSubEntry) {
        self.entries
            .entry((platform.to_string(), application.to_string()))
            .or_default()
            .insert(entry);
    }

    fn extend(&mut self, platform: &str, application: &str, subs: &BTreeSet<PubSubEntry>) {
        for sub in subs {
            self.insert(platform, application, sub.clone());
        }
    }

    /// Mark `sub` as reached, along with its wildcard-scheme twin.
    pub fn satisfy(&mut self, platform: &str, application: &str, sub: &PubSubEntry) {
        let key = (platform.to_string(), application.to_string());
        if let Some(set) = self.entries.get_mut(&key) {
            set.remove(sub);
            set.remove(&sub.with_wildcard_scheme());
        }
    }

    pub fn contains(&self, platform: &str, application: &str, sub: &PubSubEntry) -> bool {
        self.entries
            .get(&(platform.to_string(), application.to_string()))
            .is_some_and(|set| set.contains(sub))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining subscribers ordered by platform, application, then entry.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.entries
            .iter()
            .flat_map(|((platform, application), set)| {
                set.iter().map(move |entry| Endpoint::new(platform, application, entry))
            })
            .collect()
    }
}

/// Subscriptions of one application that a publisher scope may reach.
struct Candidates<'a> {
    platform: &'a str,
    application: &'a str,
    subscribes: &'a BTreeSet<PubSubEntry>,
}

/// Pair every publication with every compatible subscription (many-to-many).
fn match_scope(
    layer: Layer,
    platform: &str,
    application: &str,
    publishes: &BTreeSet<PubSubEntry>,
    candidates: &[Candidates<'_>],
    disconnected_subs: &mut DisconnectedSubscribers,
) -> ScopeMatch {
    let mut result = ScopeMatch::default();

    for publication in publishes {
        let mut connected = false;
        for candidate in candidates {
            for sub in candidate.subscribes {
                if !publication.connects(sub) {
                    continue;
                }
                connected = true;
                disconnected_subs.satisfy(candidate.platform, candidate.application, sub);
                result.connections.push(Connection {
                    layer,
                    publisher: Endpoint::new(platform, application, publication),
                    subscriber: Endpoint::new(candidate.platform, candidate.application, sub),
                });
            }
        }
        if !connected && !publication.is_inner_pub {
            result.disconnected_publishers.push(Endpoint::new(platform, application, publication));
        }
    }

    result
}

/// Interthread matching: the publications of every thread folded into
/// `display_name` against the subscriptions of every thread of the application.
///
/// Folded threads share entry keys, so both sides are collapsed into sets first
/// and an identical declaration is matched once.
pub fn match_thread(
    platform: &Platform,
    application: &Application,
    display_name: &str,
    disconnected_subs: &mut DisconnectedSubscribers,
) -> ScopeMatch {
    let publishes: BTreeSet<PubSubEntry> = application
        .threads
        .values()
        .filter(|t| application.most_derived_name(&t.name) == display_name)
        .flat_map(|t| t.publishes.iter().cloned())
        .collect();
    let subscribes: BTreeSet<PubSubEntry> =
        application.threads.values().flat_map(|t| t.subscribes.iter().cloned()).collect();
    let candidates = [Candidates {
        platform: &platform.name,
        application: &application.name,
        subscribes: &subscribes,
    }];
    match_scope(
        Layer::InterThread,
        &platform.name,
        &application.name,
        &publishes,
        &candidates,
        disconnected_subs,
    )
}

/// Interprocess matching: one application's publications against its platform.
pub fn match_process(
    platform: &Platform,
    application: &Application,
    disconnected_subs: &mut DisconnectedSubscribers,
) -> ScopeMatch {
    let candidates: Vec<Candidates<'_>> = platform
        .applications
        .values()
        .map(|a| Candidates {
            platform: &platform.name,
            application: &a.name,
            subscribes: &a.interprocess_subscribes,
        })
        .collect();
    match_scope(
        Layer::InterProcess,
        &platform.name,
        &application.name,
        &application.interprocess_publishes,
        &candidates,
        disconnected_subs,
    )
}

/// Intervehicle matching: one application's publications against the whole deployment.
pub fn match_vehicle(
    deployment: &Deployment,
    platform: &Platform,
    application: &Application,
    disconnected_subs: &mut DisconnectedSubscribers,
) -> ScopeMatch {
    let candidates: Vec<Candidates<'_>> = deployment
        .platforms
        .values()
        .flat_map(|p| {
            p.applications.values().map(move |a| Candidates {
                platform: &p.name,
                application: &a.name,
                subscribes: &a.intervehicle_subscribes,
            })
        })
        .collect();
    match_scope(
        Layer::InterVehicle,
        &platform.name,
        &application.name,
        &application.intervehicle_publishes,
        &candidates,
        disconnected_subs,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadTopology {
    /// Most-derived name; one node per display name.
    pub display_name: String,
    /// Raw names of the threads folded into this node, ascending.
    pub folded: Vec<String>,
    pub interthread: ScopeMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationTopology {
    pub name: String,
    pub threads: Vec<ThreadTopology>,
    pub disconnected_thread_subscribers: Vec<Endpoint>,
    pub interprocess: ScopeMatch,
    pub intervehicle: ScopeMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformTopology {
    pub name: String,
    pub applications: Vec<ApplicationTopology>,
    pub disconnected_process_subscribers: Vec<Endpoint>,
}

/// Which side of a connection an endpoint is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    Publisher,
    Subscriber,
}

/// An endpoint left without a counterpart in its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectedEndpoint {
    pub role: EndpointRole,
    #[serde(flatten)]
    pub endpoint: Endpoint,
}

/// Fully resolved connectivity of a deployment, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub deployment: String,
    pub platforms: Vec<PlatformTopology>,
    pub disconnected_vehicle_subscribers: Vec<Endpoint>,
}

/// Per-layer counts of edges and leftover endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerStats {
    pub connections: usize,
    pub disconnected_publishers: usize,
    pub disconnected_subscribers: usize,
}

impl LayerStats {
    fn add_scope(&mut self, scope: &ScopeMatch) {
        self.connections += scope.connections.len();
        self.disconnected_publishers += scope.disconnected_publishers.len();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TopologyStats {
    pub interthread: LayerStats,
    pub interprocess: LayerStats,
    pub intervehicle: LayerStats,
}

impl TopologyStats {
    pub fn total_connections(&self) -> usize {
        self.interthread.connections + self.interprocess.connections + self.intervehicle.connections
    }

    pub fn total_disconnected(&self) -> usize {
        [self.interthread, self.interprocess, self.intervehicle]
            .iter()
            .map(|l| l.disconnected_publishers + l.disconnected_subscribers)
            .sum()
    }
}

impl Topology {
    pub fn stats(&self) -> TopologyStats {
        let mut stats = TopologyStats::default();
        for platform in &self.platforms {
            for application in &platform.applications {
                for thread in &application.threads {
                    stats.interthread.add_scope(&thread.interthread);
                }
                stats.interthread.disconnected_subscribers +=
                    application.disconnected_thread_subscribers.len();
                stats.interprocess.add_scope(&application.interprocess);
                stats.intervehicle.add_scope(&application.intervehicle);
            }
            stats.interprocess.disconnected_subscribers +=
                platform.disconnected_process_subscribers.len();
        }
        stats.intervehicle.disconnected_subscribers = self.disconnected_vehicle_subscribers.len();
        stats
    }

    /// Every disconnected endpoint, in emission order.
    pub fn disconnected(&self) -> Vec<DisconnectedEndpoint> {
        let publisher = |endpoint: &Endpoint| DisconnectedEndpoint {
            role: EndpointRole::Publisher,
            endpoint: endpoint.clone(),
        };
        let subscriber = |endpoint: &Endpoint| DisconnectedEndpoint {
            role: EndpointRole::Subscriber,
            endpoint: endpoint.clone(),
        };

        let mut out = Vec::new();
        for platform in &self.platforms {
            for application in &platform.applications {
                for thread in &application.threads {
                    out.extend(thread.interthread.disconnected_publishers.iter().map(publisher));
                }
                out.extend(application.disconnected_thread_subscribers.iter().map(subscriber));
                out.extend(application.interprocess.disconnected_publishers.iter().map(publisher));
            }
            out.extend(platform.disconnected_process_subscribers.iter().map(subscriber));
            for application in &platform.applications {
                out.extend(application.intervehicle.disconnected_publishers.iter().map(publisher));
            }
        }
        out.extend(self.disconnected_vehicle_subscribers.iter().map(subscriber));
        out
    }

    /// Every connection of the deployment, across all layers.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.platforms.iter().flat_map(|p| {
            p.applications.iter().flat_map(|a| {
                a.threads
                    .iter()
                    .flat_map(|t| t.interthread.connections.iter())
                    .chain(a.interprocess.connections.iter())
                    .chain(a.intervehicle.connections.iter())
            })
        })
    }
}

/// Run the matcher at all three layers with correctly scoped accumulators.
pub fn resolve_topology(deployment: &Deployment) -> Topology {
    let mut vehicle_subs = DisconnectedSubscribers::for_vehicles(deployment);
    let mut platforms = Vec::with_capacity(deployment.platforms.len());

    for platform in deployment.platforms.values() {
        let mut process_subs = DisconnectedSubscribers::for_processes(platform);
        let mut applications = Vec::with_capacity(platform.applications.len());

        for application in platform.applications.values() {
            let mut thread_subs = DisconnectedSubscribers::for_threads(platform, application);
            let mut folded: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            for thread in application.threads.values() {
                folded
                    .entry(application.most_derived_name(&thread.name))
                    .or_default()
                    .push(thread.name.clone());
            }
            let threads = folded
                .into_iter()
                .map(|(display_name, raw_names)| ThreadTopology {
                    display_name: display_name.to_string(),
                    folded: raw_names,
                    interthread: match_thread(
                        platform,
                        application,
                        display_name,
                        &mut thread_subs,
                    ),
                })
                .collect();
            let interprocess = match_process(platform, application, &mut process_subs);
            applications.push(ApplicationTopology {
                name: application.name.clone(),
                threads,
                disconnected_thread_subscribers: thread_subs.endpoints(),
                interprocess,
                intervehicle: ScopeMatch::default(),
            });
        }

        // Intervehicle edges are matched after the platform's own layers, as emitted.
        for (topology, application) in applications.iter_mut().zip(platform.applications.values()) {
            topology.intervehicle =
                match_vehicle(deployment, platform, application, &mut vehicle_subs);
        }

        platforms.push(PlatformTopology {
            name: platform.name.clone(),
            applications,
            disconnected_process_subscribers: process_subs.endpoints(),
        });
    }

    let topology = Topology {
        deployment: deployment.name.clone(),
        platforms,
        disconnected_vehicle_subscribers: vehicle_subs.endpoints(),
    };
    let stats = topology.stats();
    debug!(
        deployment = %deployment.name,
        connections = stats.total_connections(),
        disconnected = stats.total_disconnected(),
        "resolved topology"
    );
    topology
}
