//! DOM Observers
//!
//! MutationObserver, ResizeObserver, IntersectionObserver.
//!
//! Each observer keeps its own set of observed nodes and queues records
//! until the owner drains them with `take_records` / `take_entries`.

mod intersection;
mod mutation;
mod resize;

pub use intersection::{
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverOptions,
};
pub use mutation::{MutationObserver, MutationObserverInit};
pub use resize::{ResizeObserver, ResizeObserverBoxOptions, ResizeObserverEntry, ResizeObserverSize};

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

fn next_observer_id() -> u64 {
    NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_ids_are_unique() {
        let mutation = MutationObserver::new();
        let resize = ResizeObserver::new();
        let intersection = IntersectionObserver::new(IntersectionObserverOptions::default());

        assert_ne!(mutation.id(), resize.id());
        assert_ne!(resize.id(), intersection.id());
        assert!(MutationObserver::new().id() > mutation.id());
    }
}
