use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const MAX_WORKERS: usize = 6;

// Parse a WORKER_COUNT value, clamped to 1-6. None if unset or not a number.
fn parse_worker_count(value: Option<&str>) -> Option<usize> {
    value?
        .trim()
        .parse::<usize>()
        .ok()
        .map(|count| count.clamp(1, MAX_WORKERS))
}

// Workers for image decoding and resizing: WORKER_COUNT or detected CPUs, clamped to 1-6
pub fn get_worker_count() -> usize {
    parse_worker_count(env::var("WORKER_COUNT").ok().as_deref())
        .unwrap_or_else(|| num_cpus::get().clamp(1, MAX_WORKERS))
}

// Initialize the Rayon global pool used by the image step (once per Lambda container)
pub fn init_thread_pool(workers: usize) {
    INIT.call_once(|| {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("image-worker-{}", i))
            .build_global();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(parse_worker_count(Some("0")), Some(1));
        assert_eq!(parse_worker_count(Some("3")), Some(3));
        assert_eq!(parse_worker_count(Some("64")), Some(MAX_WORKERS));
        assert_eq!(parse_worker_count(Some(" 2 ")), Some(2));
    }

    #[test]
    fn worker_count_ignores_garbage() {
        assert_eq!(parse_worker_count(None), None);
        assert_eq!(parse_worker_count(Some("")), None);
        assert_eq!(parse_worker_count(Some("many")), None);
        assert_eq!(parse_worker_count(Some("-2")), None);
    }

    #[test]
    fn detected_worker_count_is_in_range() {
        let workers = get_worker_count();
        assert!((1..=MAX_WORKERS).contains(&workers));
    }
}
