use std::sync::{Arc, RwLock};

type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Owned cell holding the current handler.
///
/// Deliveries read the cell at call time, so swapping the handler never
/// requires re-registering whatever feeds it.
pub struct HandlerCell<T> {
    current: Arc<RwLock<Handler<T>>>,
}

impl<T> Clone for HandlerCell<T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
        }
    }
}

impl<T> HandlerCell<T> {
    pub fn new(handler: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(handler))),
        }
    }

    pub fn set(&self, handler: impl Fn(T) + Send + Sync + 'static) {
        if let Ok(mut current) = self.current.write() {
            *current = Arc::new(handler);
        }
    }

    /// Invoke the current handler. The lock is released before the call.
    pub fn call(&self, value: T) {
        let handler = match self.current.read() {
            Ok(current) => current.clone(),
            Err(e) => {
                log::error!("Handler cell poisoned: {}", e);
                return;
            }
        };
        handler(value);
    }
}
