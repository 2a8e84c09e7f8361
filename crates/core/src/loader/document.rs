use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::analysis::hierarchy::resolve_thread_hierarchy;
use crate::loader::{LoadError, LoadResult};
use crate::model::{Application, Layer, PubSubEntry, Thread};

/// One publish/subscribe record as written in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub group: String,
    pub scheme: String,
    pub type_name: String,
    pub thread: Option<String>,
    pub inner: bool,
}

/// Publications and subscriptions of one layer section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerRecord {
    pub publishes: Vec<EntryRecord>,
    pub subscribes: Vec<EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub name: String,
    pub bases: Vec<String>,
    pub entries: LayerRecord,
}

/// Canonical shape of an application document, independent of which
/// interthread layout the input used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub name: String,
    pub threads: Vec<ThreadRecord>,
    pub interprocess: LayerRecord,
    pub intervehicle: LayerRecord,
}

/// Validate and build an `Application` from a parsed document.
pub fn application_from_document(doc: &Value, thread_base_class: &str) -> LoadResult<Application> {
    let record = parse_application_record(doc)?;
    Ok(build_application(record, thread_base_class))
}

/// Validate a document and normalize it to an [`ApplicationRecord`].
///
/// Accepts both interthread layouts: a `threads` sequence (with optional
/// `bases`) or a map from thread name to its `publishes`/`subscribes`.
pub fn parse_application_record(doc: &Value) -> LoadResult<ApplicationRecord> {
    let root = doc
        .as_mapping()
        .ok_or_else(|| LoadError::malformed("top level must be a map"))?;
    let name = required_scalar(root, "application")?;

    let threads = match optional_mapping(root, "interthread")? {
        Some(interthread) => parse_threads(interthread)?,
        None => Vec::new(),
    };
    let interprocess = match optional_mapping(root, "interprocess")? {
        Some(section) => parse_layer(section, "interprocess")?,
        None => LayerRecord::default(),
    };
    let intervehicle = match optional_mapping(root, "intervehicle")? {
        Some(section) => parse_layer(section, "intervehicle")?,
        None => LayerRecord::default(),
    };

    Ok(ApplicationRecord { name, threads, interprocess, intervehicle })
}

/// Build the entity model from a normalized record.
///
/// Threads are created first so the hierarchy can be resolved before any
/// entry is attributed to its most-derived thread.
pub fn build_application(record: ApplicationRecord, thread_base_class: &str) -> Application {
    let mut application = Application::new(&record.name);

    for thread in &record.threads {
        let declared = Thread::new(&thread.name).with_bases(thread.bases.clone());
        application.threads.insert(thread.name.clone(), declared);
    }

    resolve_thread_hierarchy(&mut application, thread_base_class);

    for thread in record.threads {
        let publishes =
            attribute(&application, Layer::InterThread, &thread.entries.publishes, &thread.name);
        let subscribes =
            attribute(&application, Layer::InterThread, &thread.entries.subscribes, &thread.name);
        if let Some(target) = application.threads.get_mut(&thread.name) {
            target.publishes.extend(publishes);
            target.subscribes.extend(subscribes);
        }
    }

    // Entries without an explicit thread key belong to the application's main thread.
    let main_thread = record.name.clone();
    application.interprocess_publishes =
        attribute(&application, Layer::InterProcess, &record.interprocess.publishes, &main_thread);
    application.interprocess_subscribes =
        attribute(&application, Layer::InterProcess, &record.interprocess.subscribes, &main_thread);
    application.intervehicle_publishes =
        attribute(&application, Layer::InterVehicle, &record.intervehicle.publishes, &main_thread);
    application.intervehicle_subscribes =
        attribute(&application, Layer::InterVehicle, &record.intervehicle.subscribes, &main_thread);

    let referenced: Vec<String> = application
        .threads
        .values()
        .flat_map(|t| t.publishes.iter().chain(t.subscribes.iter()))
        .chain(application.interprocess_publishes.iter())
        .chain(application.interprocess_subscribes.iter())
        .chain(application.intervehicle_publishes.iter())
        .chain(application.intervehicle_subscribes.iter())
        .map(|e| e.thread.clone())
        .collect();
    for thread in referenced {
        if application.ensure_thread(&thread) {
            debug!(
                application = %application.name,
                thread = %thread,
                "synthesized placeholder thread"
            );
        }
    }

    application
}

fn attribute(
    application: &Application,
    layer: Layer,
    records: &[EntryRecord],
    default_thread: &str,
) -> BTreeSet<PubSubEntry> {
    records
        .iter()
        .map(|r| {
            let declared = r.thread.as_deref().unwrap_or(default_thread);
            let thread = application.most_derived_name(declared);
            PubSubEntry::new(layer, thread, &r.group, &r.scheme, &r.type_name).inner(r.inner)
        })
        .collect()
}

fn parse_threads(interthread: &Mapping) -> LoadResult<Vec<ThreadRecord>> {
    if let Some(threads) = interthread.get("threads") {
        let items = as_sequence(threads, "interthread.threads")?;
        return items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let context = format!("interthread.threads[{idx}]");
                let map = item
                    .as_mapping()
                    .ok_or_else(|| LoadError::malformed(format!("{context} must be a map")))?;
                let name = required_scalar(map, "name")
                    .map_err(|_| LoadError::malformed(format!("{context} is missing 'name'")))?;
                let bases = match map.get("bases") {
                    Some(value) => as_sequence(value, &format!("{context}.bases"))?
                        .iter()
                        .map(|b| {
                            scalar_string(b).ok_or_else(|| {
                                LoadError::malformed(format!("{context}.bases must hold scalars"))
                            })
                        })
                        .collect::<LoadResult<Vec<_>>>()?,
                    None => Vec::new(),
                };
                let entries = parse_layer(map, &context)?;
                Ok(ThreadRecord { name, bases, entries })
            })
            .collect();
    }

    // Thread-indexed layout: every key is a thread name.
    interthread
        .iter()
        .map(|(key, value)| {
            let name = scalar_string(key)
                .ok_or_else(|| LoadError::malformed("interthread keys must be thread names"))?;
            let context = format!("interthread.{name}");
            let entries = match value {
                Value::Null => LayerRecord::default(),
                Value::Mapping(map) => parse_layer(map, &context)?,
                _ => return Err(LoadError::malformed(format!("{context} must be a map"))),
            };
            Ok(ThreadRecord { name, bases: Vec::new(), entries })
        })
        .collect()
}

fn parse_layer(section: &Mapping, context: &str) -> LoadResult<LayerRecord> {
    Ok(LayerRecord {
        publishes: parse_entries(section, "publishes", context)?,
        subscribes: parse_entries(section, "subscribes", context)?,
    })
}

fn parse_entries(section: &Mapping, key: &str, context: &str) -> LoadResult<Vec<EntryRecord>> {
    let Some(value) = section.get(key) else {
        return Ok(Vec::new());
    };
    let context = format!("{context}.{key}");
    as_sequence(value, &context)?
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_entry(item, &format!("{context}[{idx}]")))
        .collect()
}

fn parse_entry(item: &Value, context: &str) -> LoadResult<EntryRecord> {
    let map =
        item.as_mapping().ok_or_else(|| LoadError::malformed(format!("{context} must be a map")))?;
    let field = |key: &str| {
        required_scalar(map, key)
            .map_err(|_| LoadError::malformed(format!("{context} is missing '{key}'")))
    };
    let group = field("group")?;
    let scheme = field("scheme")?;
    let type_name = field("type")?;
    let thread = map.get("thread").and_then(scalar_string);
    let inner = match map.get("inner") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(LoadError::malformed(format!("{context}.inner must be a boolean"))),
    };
    Ok(EntryRecord { group, scheme, type_name, thread, inner })
}

fn required_scalar(map: &Mapping, key: &str) -> LoadResult<String> {
    map.get(key)
        .and_then(scalar_string)
        .ok_or_else(|| LoadError::malformed(format!("missing required scalar '{key}'")))
}

fn optional_mapping<'a>(map: &'a Mapping, key: &str) -> LoadResult<Option<&'a Mapping>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(inner)) => Ok(Some(inner)),
        Some(_) => Err(LoadError::malformed(format!("'{key}' must be a map"))),
    }
}

fn as_sequence<'a>(value: &'a Value, context: &str) -> LoadResult<&'a [Value]> {
    match value {
        Value::Null => Ok(&[]),
        Value::Sequence(items) => Ok(items.as_slice()),
        _ => Err(LoadError::malformed(format!("{context} must be a sequence"))),
    }
}

pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
