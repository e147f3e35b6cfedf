use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

/// Per-key bookkeeping for one throttling window.
#[derive(Debug)]
struct Window {
    opened_at: Instant,
    suppressed: u64,
}

static WINDOWS: OnceLock<Mutex<HashMap<String, Window>>> = OnceLock::new();

fn windows() -> MutexGuard<'static, HashMap<String, Window>> {
    WINDOWS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Rate-limits a repetitive log line identified by `key`.
///
/// Returns `Some(n)` when the line should be written now, `n` being how many
/// occurrences were swallowed since the last one written; `None` means the
/// caller should stay quiet and the occurrence is counted.
pub fn should_emit(key: &str, interval: Duration) -> Option<u64> {
    let mut windows = windows();
    let now = Instant::now();

    let Some(window) = windows.get_mut(key) else {
        windows.insert(
            key.to_string(),
            Window {
                opened_at: now,
                suppressed: 0,
            },
        );
        return Some(0);
    };

    if now.duration_since(window.opened_at) < interval {
        window.suppressed += 1;
        return None;
    }

    let suppressed = std::mem::take(&mut window.suppressed);
    window.opened_at = now;
    Some(suppressed)
}
