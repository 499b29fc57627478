use std::thread::{self, ThreadId};

/// Owns a backend together with the thread it is current on.
///
/// Graphics APIs bind their context to one thread at a time; every call that
/// touches GPU resources goes through [`GraphicsContext::backend_mut`], which
/// panics when used from a thread that does not own the context.
pub struct GraphicsContext<B> {
    backend: B,
    owner: Option<ThreadId>,
}

impl<B> GraphicsContext<B> {
    /// Wraps `backend`, current on the calling thread.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            owner: Some(thread::current().id()),
        }
    }

    /// Claims the context for the calling thread.
    pub fn make_current(&mut self) {
        self.owner = Some(thread::current().id());
    }

    /// Detaches the context from every thread.
    pub fn release_current(&mut self) {
        self.owner = None;
    }

    pub fn is_current(&self) -> bool {
        self.owner == Some(thread::current().id())
    }

    pub fn assert_current(&self) {
        assert!(
            self.is_current(),
            "graphics context used on thread {:?} while owned by {:?}",
            thread::current().id(),
            self.owner
        );
    }

    pub fn backend(&self) -> &B {
        self.assert_current();
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.assert_current();
        &mut self.backend
    }
}
