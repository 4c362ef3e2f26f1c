use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide "blocking overlay visible" flag. Last writer wins.
#[derive(Clone, Debug, Default)]
pub struct OverlayCoordinator {
    visible: Arc<AtomicBool>,
}

impl OverlayCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    pub fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
