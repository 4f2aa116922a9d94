//! Compile-time registry of named worker entry points.
//!
//! Stands in for the dynamically-imported user module of the system this
//! worker is modeled on: instead of resolving a module path at runtime, the
//! dotted function name is looked up in a `static` table built once per
//! process. Adding a payload means adding an entry here and rebuilding.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::demos;

/// A worker entry point: consumes the request bytes, produces the response
/// bytes. Must not block beyond the work itself — the receive loop's
/// 60-second idle timeout only covers waiting for the *next* request, not
/// the time spent inside a registered function.
pub type WorkerFn = fn(&[u8]) -> Vec<u8>;

fn table() -> &'static HashMap<&'static str, WorkerFn> {
    static TABLE: OnceLock<HashMap<&'static str, WorkerFn>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m: HashMap<&'static str, WorkerFn> = HashMap::new();
        m.insert("demos::echo", demos::echo);
        m.insert("demos::matmul_cpu", demos::matmul_cpu);
        m.insert("demos::sleep", demos::sleep);
        m
    })
}

/// Resolve a dotted function name to its entry point. `None` means the
/// worker should fail fatally at startup, mirroring a module-import
/// failure in the dynamic-loading reference.
pub fn resolve(name: &str) -> Option<WorkerFn> {
    table().get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_entry_points() {
        assert!(resolve("demos::echo").is_some());
        assert!(resolve("demos::matmul_cpu").is_some());
        assert!(resolve("demos::sleep").is_some());
    }

    #[test]
    fn test_resolve_unknown_name_is_none() {
        assert!(resolve("demos::nonexistent").is_none());
    }
}
