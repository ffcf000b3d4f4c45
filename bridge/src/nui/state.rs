use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::error::SharedError;

/// Observable status of a wrapper's in-flight call.
///
/// `loading` implies no error; once settled, `error` is set only on failure.
#[derive(Clone, Debug, Default)]
pub struct RequestCallState {
    pub loading: bool,
    pub error: Option<SharedError>,
}

impl RequestCallState {
    pub fn is_idle(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// State slot owned by one wrapper instance.
///
/// Once disposed, settling calls no longer write to it.
pub(crate) struct CallScope {
    state: watch::Sender<RequestCallState>,
    disposed: AtomicBool,
}

impl CallScope {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(RequestCallState::default());
        Self {
            state,
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn snapshot(&self) -> RequestCallState {
        self.state.borrow().clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<RequestCallState> {
        self.state.subscribe()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn set(&self, next: RequestCallState) {
        if self.is_disposed() {
            return;
        }
        self.state.send_replace(next);
    }

    pub(crate) fn begin(&self) {
        self.set(RequestCallState {
            loading: true,
            error: None,
        });
    }

    pub(crate) fn succeed(&self) {
        self.set(RequestCallState::default());
    }

    pub(crate) fn fail(&self, error: SharedError) {
        self.set(RequestCallState {
            loading: false,
            error: Some(error),
        });
    }
}
