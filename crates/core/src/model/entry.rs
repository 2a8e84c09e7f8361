use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheme tag meaning "in-memory object, format not fixed". Matches any scheme.
pub const WILDCARD_SCHEME: &str = "CXX_OBJECT";

/// Communication layer. Ordering expresses nesting: interthread traffic is
/// nested inside interprocess, which is nested inside intervehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Unknown,
    InterThread,
    InterProcess,
    InterVehicle,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Unknown => "unknown",
            Layer::InterThread => "interthread",
            Layer::InterProcess => "interprocess",
            Layer::InterVehicle => "intervehicle",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One publish or subscribe declaration.
///
/// Identity is the `(layer, thread, group, scheme, type)` tuple; `is_inner_pub`
/// does not take part in equality or ordering, so duplicates collapse in sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEntry {
    pub layer: Layer,
    pub thread: String,
    pub group: String,
    pub scheme: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Publication propagated outward from an inner layer; never reported as disconnected.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_inner_pub: bool,
}

impl PubSubEntry {
    pub fn new(
        layer: Layer,
        thread: impl Into<String>,
        group: impl Into<String>,
        scheme: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            layer,
            thread: thread.into(),
            group: group.into(),
            scheme: scheme.into(),
            type_name: type_name.into(),
            is_inner_pub: false,
        }
    }

    pub fn inner(mut self, is_inner_pub: bool) -> Self {
        self.is_inner_pub = is_inner_pub;
        self
    }

    /// Whether a publication `self` reaches subscription `sub`.
    ///
    /// Layer, group and type must be equal; schemes must be equal unless either
    /// side carries the wildcard scheme.
    pub fn connects(&self, sub: &PubSubEntry) -> bool {
        self.layer == sub.layer
            && self.group == sub.group
            && self.type_name == sub.type_name
            && (self.scheme == sub.scheme
                || self.scheme == WILDCARD_SCHEME
                || sub.scheme == WILDCARD_SCHEME)
    }

    /// Copy of this entry with the scheme replaced by the wildcard.
    pub fn with_wildcard_scheme(&self) -> Self {
        Self { scheme: WILDCARD_SCHEME.to_string(), ..self.clone() }
    }

    fn key(&self) -> (Layer, &str, &str, &str, &str) {
        (self.layer, &self.thread, &self.group, &self.scheme, &self.type_name)
    }
}

impl PartialEq for PubSubEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PubSubEntry {}

impl PartialOrd for PubSubEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PubSubEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for PubSubEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer: {}, thread: {}, group: {}, scheme: {}, type: {}",
            self.layer, self.thread, self.group, self.scheme, self.type_name
        )
    }
}
