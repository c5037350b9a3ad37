use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };

type Wake = Box<dyn Fn() + Send + Sync>;

/// "New frame available" flag raised by a decoder thread and consumed by the render thread.
#[derive(Clone)]
pub struct FrameSignal {
    dirty: Arc<AtomicBool>,
    wake: Option<Arc<Wake>>,
}

impl Default for FrameSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSignal {
    pub fn new() -> Self {
        Self { dirty: Arc::new(AtomicBool::new(false)), wake: None }
    }

    /// Calls `wake` after every `notify`, typically to request a redraw.
    pub fn with_wake(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self { dirty: Arc::new(AtomicBool::new(false)), wake: Some(Arc::new(Box::new(wake))) }
    }

    pub fn notify(&self) {
        self.dirty.store(true, Ordering::Release);
        if let Some(wake) = &self.wake {
            wake();
        }
    }

    /// True once per raised signal.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}
