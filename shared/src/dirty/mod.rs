mod dirty_mask;
mod dirty_tracker;

pub use dirty_mask::{DirtyMask, Ordinals};
pub use dirty_tracker::DirtyTracker;
