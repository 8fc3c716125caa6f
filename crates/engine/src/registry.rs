//! Process-wide registry of open databases, so a process that exits without
//! calling [`crate::Database::close`] on every handle still flushes and
//! releases file locks on the way out, matching the "close on process exit"
//! guarantee in the module docs.
//!
//! Every [`Database::open_with`] registers a weak, type-erased handle here.
//! The first registration installs a `libc::atexit` hook; the hook (and the
//! public [`shutdown_all`]) walk the registry and close anything still open.

use std::path::Path;
use std::sync::{Mutex, Once, OnceLock, Weak};

/// Object-safe view of an open database, used so the registry can hold
/// handles across every `Database<T, S>` instantiation without being
/// generic itself.
pub(crate) trait RegisteredDatabase: Send + Sync {
    fn path(&self) -> &Path;
    fn is_closed(&self) -> bool;
    fn close_for_shutdown(&self);
}

type Registry = Mutex<Vec<Weak<dyn RegisteredDatabase>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static ATEXIT_INSTALLED: Once = Once::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

extern "C" fn run_atexit_hook() {
    shutdown_all();
}

pub(crate) fn register(db: std::sync::Arc<dyn RegisteredDatabase>) {
    ATEXIT_INSTALLED.call_once(|| unsafe {
        libc::atexit(run_atexit_hook);
    });
    registry().lock().unwrap().push(std::sync::Arc::downgrade(&db));
}

pub(crate) fn unregister(db: &std::sync::Arc<dyn RegisteredDatabase>) {
    let mut reg = registry().lock().unwrap();
    reg.retain(|weak| match weak.upgrade() {
        Some(strong) => !std::sync::Arc::ptr_eq(&strong, db),
        None => false,
    });
}

/// Closes every database still registered and open.
///
/// Called automatically at process exit; also exposed for environments
/// (embedders, test harnesses) that want to force the same cleanup without
/// actually terminating the process.
pub fn shutdown_all() {
    let handles: Vec<_> = {
        let mut reg = registry().lock().unwrap();
        reg.retain(|weak| weak.strong_count() > 0);
        reg.iter().filter_map(|weak| weak.upgrade()).collect()
    };

    for db in handles {
        if !db.is_closed() {
            tracing::warn!(path = %db.path().display(), "closing database still open at process exit");
            db.close_for_shutdown();
        }
    }
}
