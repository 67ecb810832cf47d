use std::sync::atomic::{AtomicUsize, Ordering};

// Separate counters so overlay churn never affects image ids used as texture keys
static NEXT_OVERLAY_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_IMAGE_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_overlay_id() -> usize {
    NEXT_OVERLAY_ID.fetch_add(1, Ordering::SeqCst)
}

pub fn generate_image_id() -> usize {
    NEXT_IMAGE_ID.fetch_add(1, Ordering::SeqCst)
}
