//! Stateful Request Wrapper
//!
//! Wraps [`Transport::request`] with `{ loading, error }` tracking and a
//! success callback. The callable returned by [`StatefulRequest::invoker`]
//! keeps its identity until the event name or mock config change, so UI
//! code can use it as an effect dependency.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{BridgeError, SharedError};
use crate::nui::state::CallScope;
use crate::nui::{HandlerCell, MockConfig, RequestCallState, Transport};
use crate::runtime;

struct Shared<T> {
    transport: Arc<Transport>,
    scope: CallScope,
    callback: HandlerCell<Option<T>>,
}

struct Target<T> {
    event_name: String,
    mock: MockConfig<T>,
}

/// Callable handle issuing requests for one `(event, mock)` configuration.
pub struct Invoker<T, D> {
    shared: Arc<Shared<T>>,
    target: Arc<Target<T>>,
    _payload: PhantomData<fn(D)>,
}

impl<T, D> Clone for Invoker<T, D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            target: self.target.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T, D> Invoker<T, D>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    /// Whether both handles are the same callable.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    pub fn event_name(&self) -> &str {
        &self.target.event_name
    }

    /// Start a call. The state flips to loading before this returns.
    ///
    /// The request is issued on the runtime right away, so the call settles
    /// even if the returned future is dropped without being awaited.
    /// On success the current callback runs first, then the state settles.
    /// On failure the state records the error and the same error is returned.
    pub fn invoke(
        &self,
        data: Option<D>,
    ) -> impl Future<Output = Result<Option<T>, SharedError>> + Send + use<T, D> {
        let shared = self.shared.clone();
        let target = self.target.clone();
        shared.scope.begin();

        let task = runtime::spawn(run(shared.clone(), target, data));

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    let error: SharedError = Arc::new(BridgeError::from(e));
                    shared.scope.fail(error.clone());
                    Err(error)
                }
            }
        }
    }
}

async fn run<T, D>(
    shared: Arc<Shared<T>>,
    target: Arc<Target<T>>,
    data: Option<D>,
) -> Result<Option<T>, SharedError>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    let result = shared
        .transport
        .request(&target.event_name, data.as_ref(), &target.mock)
        .await;

    match result {
        Ok(value) => {
            if shared.scope.is_disposed() {
                log::debug!("Ignoring late result for '{}'", target.event_name);
            } else {
                shared.callback.call(value.clone());
                shared.scope.succeed();
            }
            Ok(value)
        }
        Err(e) => {
            let error: SharedError = Arc::new(e);
            shared.scope.fail(error.clone());
            Err(error)
        }
    }
}

/// A request call site with observable state.
///
/// Dropping it tears the scope down: calls still in flight settle for their
/// callers but no longer touch the state or invoke the callback.
pub struct StatefulRequest<T, D> {
    shared: Arc<Shared<T>>,
    invoker: Invoker<T, D>,
}

impl<T, D> StatefulRequest<T, D>
where
    T: DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    pub(crate) fn new(
        transport: Arc<Transport>,
        event_name: String,
        callback: HandlerCell<Option<T>>,
        mock: MockConfig<T>,
    ) -> Self {
        let shared = Arc::new(Shared {
            transport,
            scope: CallScope::new(),
            callback,
        });
        let invoker = Invoker {
            shared: shared.clone(),
            target: Arc::new(Target { event_name, mock }),
            _payload: PhantomData,
        };
        Self { shared, invoker }
    }

    pub fn invoker(&self) -> Invoker<T, D> {
        self.invoker.clone()
    }

    pub fn invoke(
        &self,
        data: Option<D>,
    ) -> impl Future<Output = Result<Option<T>, SharedError>> + Send + use<T, D> {
        self.invoker.invoke(data)
    }

    pub fn state(&self) -> RequestCallState {
        self.shared.scope.snapshot()
    }

    pub fn watch_state(&self) -> watch::Receiver<RequestCallState> {
        self.shared.scope.watch()
    }

    /// Swap the success callback. Existing invokers pick it up.
    pub fn set_callback(&self, callback: impl Fn(Option<T>) + Send + Sync + 'static) {
        self.shared.callback.set(callback);
    }

    /// Point the call site at a new configuration.
    ///
    /// A fresh invoker is created only when the event name or mock config
    /// changed; returns whether that happened.
    pub fn reconfigure(&mut self, event_name: impl Into<String>, mock: MockConfig<T>) -> bool {
        let event_name = event_name.into();
        if event_name == self.invoker.target.event_name && mock == self.invoker.target.mock {
            return false;
        }
        self.invoker = Invoker {
            shared: self.shared.clone(),
            target: Arc::new(Target { event_name, mock }),
            _payload: PhantomData,
        };
        true
    }
}

impl<T, D> Drop for StatefulRequest<T, D> {
    fn drop(&mut self) {
        self.shared.scope.dispose();
    }
}
