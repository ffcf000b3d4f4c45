//! Fire-and-Forget Wrapper
//!
//! For calls where only completion matters: the response body is never read.

use serde::Serialize;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{BridgeError, SharedError};
use crate::nui::state::CallScope;
use crate::nui::{DelayConfig, RequestCallState, Transport};
use crate::runtime;

struct Shared {
    transport: Arc<Transport>,
    scope: CallScope,
}

struct Target {
    event_name: String,
    options: DelayConfig,
}

/// Callable handle for one `(event, options)` configuration.
pub struct FireInvoker<D> {
    shared: Arc<Shared>,
    target: Arc<Target>,
    _payload: PhantomData<fn(D)>,
}

impl<D> Clone for FireInvoker<D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            target: self.target.clone(),
            _payload: PhantomData,
        }
    }
}

impl<D> FireInvoker<D>
where
    D: Serialize + Send + Sync + 'static,
{
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    pub fn event_name(&self) -> &str {
        &self.target.event_name
    }

    /// Start a call. The state flips to loading before this returns.
    ///
    /// The request goes out immediately; awaiting the returned future is
    /// only needed to observe the outcome.
    pub fn invoke(
        &self,
        data: Option<D>,
    ) -> impl Future<Output = Result<(), SharedError>> + Send + use<D> {
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

async fn run<D>(
    shared: Arc<Shared>,
    target: Arc<Target>,
    data: Option<D>,
) -> Result<(), SharedError>
where
    D: Serialize + Send + Sync + 'static,
{
    match shared
        .transport
        .send(&target.event_name, data.as_ref(), &target.options)
        .await
    {
        Ok(()) => {
            shared.scope.succeed();
            Ok(())
        }
        Err(e) => {
            let error: SharedError = Arc::new(e);
            shared.scope.fail(error.clone());
            Err(error)
        }
    }
}

/// A completion-only call site with observable state.
///
/// Dropping it stops in-flight calls from writing to the state.
pub struct FireAndForget<D> {
    shared: Arc<Shared>,
    invoker: FireInvoker<D>,
}

impl<D> FireAndForget<D>
where
    D: Serialize + Send + Sync + 'static,
{
    pub(crate) fn new(transport: Arc<Transport>, event_name: String, options: DelayConfig) -> Self {
        let shared = Arc::new(Shared {
            transport,
            scope: CallScope::new(),
        });
        let invoker = FireInvoker {
            shared: shared.clone(),
            target: Arc::new(Target { event_name, options }),
            _payload: PhantomData,
        };
        Self { shared, invoker }
    }

    pub fn invoker(&self) -> FireInvoker<D> {
        self.invoker.clone()
    }

    pub fn invoke(
        &self,
        data: Option<D>,
    ) -> impl Future<Output = Result<(), SharedError>> + Send + use<D> {
        self.invoker.invoke(data)
    }

    pub fn state(&self) -> RequestCallState {
        self.shared.scope.snapshot()
    }

    pub fn watch_state(&self) -> watch::Receiver<RequestCallState> {
        self.shared.scope.watch()
    }

    /// Returns whether a fresh invoker was created.
    pub fn reconfigure(&mut self, event_name: impl Into<String>, options: DelayConfig) -> bool {
        let event_name = event_name.into();
        if event_name == self.invoker.target.event_name && options == self.invoker.target.options {
            return false;
        }
        self.invoker = FireInvoker {
            shared: self.shared.clone(),
            target: Arc::new(Target { event_name, options }),
            _payload: PhantomData,
        };
        true
    }
}

impl<D> Drop for FireAndForget<D> {
    fn drop(&mut self) {
        self.shared.scope.dispose();
    }
}
