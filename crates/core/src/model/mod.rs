//! Core data model for publish/subscribe topologies.
//!
//! The hierarchy is strictly owned top-down:
//! - `Deployment` owns `Platform`s (vehicles)
//! - `Platform` owns `Application`s (processes)
//! - `Application` owns `Thread`s
//!
//! Thread embedding (`parent`/`child`) is expressed as thread names keyed into the
//! owning application's thread map, never as owning references.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

mod entry;

pub use entry::{Layer, PubSubEntry, WILDCARD_SCHEME};

/// One thread class instance inside an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Raw class name as reported by the interface description.
    pub name: String,
    /// Immediate superclass names.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub bases: BTreeSet<String>,
    #[serde(default)]
    pub publishes: BTreeSet<PubSubEntry>,
    #[serde(default)]
    pub subscribes: BTreeSet<PubSubEntry>,
    /// Thread that embeds this one (non-owning, by name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Inverse of `parent` (non-owning, by name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
}

impl Thread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: BTreeSet::new(),
            publishes: BTreeSet::new(),
            subscribes: BTreeSet::new(),
            parent: None,
            child: None,
        }
    }

    pub fn with_bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases = bases.into_iter().map(Into::into).collect();
        self
    }
}

/// One process running on a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    /// Arena of threads keyed by raw thread name.
    pub threads: BTreeMap<String, Thread>,
    pub interprocess_publishes: BTreeSet<PubSubEntry>,
    pub interprocess_subscribes: BTreeSet<PubSubEntry>,
    pub intervehicle_publishes: BTreeSet<PubSubEntry>,
    pub intervehicle_subscribes: BTreeSet<PubSubEntry>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Walk `parent` links from `thread` to the root ancestor and return its name.
    ///
    /// Unknown thread names resolve to themselves. The walk is bounded by the
    /// number of threads so a corrupted (cyclic) arena cannot loop forever.
    pub fn most_derived_name<'a>(&'a self, thread: &'a str) -> &'a str {
        let mut current = thread;
        for _ in 0..self.threads.len() {
            match self.threads.get(current).and_then(|t| t.parent.as_deref()) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Insert a placeholder thread if `name` is not declared yet.
    ///
    /// Returns true when a thread was synthesized.
    pub fn ensure_thread(&mut self, name: &str) -> bool {
        if self.threads.contains_key(name) {
            return false;
        }
        self.threads.insert(name.to_string(), Thread::new(name));
        true
    }

    /// Distinct most-derived thread names, in ascending order.
    pub fn display_threads(&self) -> BTreeSet<&str> {
        self.threads.keys().map(|name| self.most_derived_name(name)).collect()
    }
}

/// One physical or logical vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub applications: BTreeMap<String, Application>,
}

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), applications: BTreeMap::new() }
    }

    /// Insert an application; a duplicate name replaces the earlier one (last write wins).
    pub fn insert_application(&mut self, application: Application) -> Option<Application> {
        let replaced = self.applications.insert(application.name.clone(), application);
        if let Some(old) = &replaced {
            warn!(
                platform = %self.name,
                application = %old.name,
                "duplicate application name; keeping the last one"
            );
        }
        replaced
    }
}

/// The whole system under analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub platforms: BTreeMap<String, Platform>,
}

impl Deployment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), platforms: BTreeMap::new() }
    }

    /// Insert a platform; a duplicate name replaces the earlier one (last write wins).
    pub fn insert_platform(&mut self, platform: Platform) -> Option<Platform> {
        let replaced = self.platforms.insert(platform.name.clone(), platform);
        if let Some(old) = &replaced {
            warn!(
                deployment = %self.name,
                platform = %old.name,
                "duplicate platform name; keeping the last one"
            );
        }
        replaced
    }

    pub fn application_count(&self) -> usize {
        self.platforms.values().map(|p| p.applications.len()).sum()
    }
}

fn write_entries(
    f: &mut fmt::Formatter<'_>,
    publishes: &BTreeSet<PubSubEntry>,
    subscribes: &BTreeSet<PubSubEntry>,
) -> fmt::Result {
    if publishes.is_empty() && subscribes.is_empty() {
        return write!(f, "NONE");
    }
    for p in publishes {
        write!(f, "[PUB {p}]")?;
    }
    for s in subscribes {
        write!(f, "[SUB {s}]")?;
    }
    Ok(())
}

impl fmt::Display for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | ", self.name)?;
        write_entries(f, &self.publishes, &self.subscribes)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | intervehicle: ", self.name)?;
        write_entries(f, &self.intervehicle_publishes, &self.intervehicle_subscribes)?;
        write!(f, " | interprocess: ")?;
        write_entries(f, &self.interprocess_publishes, &self.interprocess_subscribes)?;
        if !self.threads.is_empty() {
            write!(f, " | interthread: ")?;
            for thread in self.threads.values() {
                write!(f, "{{{thread}}}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(({}))", self.name)?;
        for application in self.applications.values() {
            writeln!(f, "Application: {application}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----{}-----", self.name)?;
        for platform in self.platforms.values() {
            writeln!(f, "Platform: {platform}")?;
        }
        Ok(())
    }
}
