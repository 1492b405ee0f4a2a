//! Observer Adapters
//!
//! Translate native observer records into event details. The mutation
//! adapter is stateless; the resize and intersection adapters remember the
//! last rect / visibility per target, committed after each dispatch.

mod intersection;
mod mutation;
mod resize;

pub use intersection::IntersectionAdapter;
pub use mutation::normalize_mutation;
pub use resize::ResizeAdapter;
