use tracing::{debug, warn};

use crate::model::{Application, Thread};

/// Whether `thread` derives directly from the framework thread base class.
///
/// Base names are matched by prefix so template instantiations such as
/// `goby::middleware::SimpleThread<Config>` count as well.
pub fn is_direct_subclass(thread: &Thread, base_class: &str) -> bool {
    thread.bases.iter().any(|base| base.starts_with(base_class))
}

/// Link threads that extend another declared thread instead of the framework base.
///
/// For every non-direct thread `T` whose bases name another thread `M`, sets
/// `T.child = M` and `M.parent = T`, so `M` is attributed to `T` (or to `T`'s own
/// most-derived ancestor). Iteration is by name, ascending; when several links
/// compete, the last one found wins. Links that would close a cycle are skipped.
///
/// Returns the number of links established.
pub fn resolve_thread_hierarchy(application: &mut Application, base_class: &str) -> usize {
    let names: Vec<String> = application.threads.keys().cloned().collect();
    let mut links = 0;

    for derived in &names {
        let bases = match application.threads.get(derived) {
            Some(thread) if !is_direct_subclass(thread, base_class) => thread.bases.clone(),
            _ => continue,
        };

        for base_thread in &names {
            for base in &bases {
                if base != base_thread {
                    continue;
                }
                if has_ancestor(application, derived, base_thread) {
                    warn!(
                        application = %application.name,
                        thread = %derived,
                        base = %base_thread,
                        "skipping thread link that would form a cycle"
                    );
                    continue;
                }
                link(application, derived, base_thread);
                links += 1;
            }
        }
    }

    if links > 0 {
        debug!(application = %application.name, links, "resolved thread hierarchy");
    }
    links
}

/// True when `target` is `start` or appears on `start`'s parent chain.
fn has_ancestor(application: &Application, start: &str, target: &str) -> bool {
    let mut current = Some(start);
    for _ in 0..=application.threads.len() {
        match current {
            Some(name) if name == target => return true,
            Some(name) => {
                current = application.threads.get(name).and_then(|t| t.parent.as_deref());
            }
            None => return false,
        }
    }
    false
}

fn link(application: &mut Application, derived: &str, base: &str) {
    // Keep parent/child mutually consistent when an earlier link is replaced.
    let previous_child = application.threads.get(derived).and_then(|t| t.child.clone());
    if let Some(previous) = previous_child.filter(|c| c != base) {
        if let Some(thread) = application.threads.get_mut(&previous) {
            thread.parent = None;
        }
    }
    let previous_parent = application.threads.get(base).and_then(|t| t.parent.clone());
    if let Some(previous) = previous_parent.filter(|p| p != derived) {
        if let Some(thread) = application.threads.get_mut(&previous) {
            thread.child = None;
        }
    }

    if let Some(thread) = application.threads.get_mut(derived) {
        thread.child = Some(base.to_string());
    }
    if let Some(thread) = application.threads.get_mut(base) {
        thread.parent = Some(derived.to_string());
    }
}
