//! Host Environment Detection
//!
//! The host announces itself by installing a native invoker into
//! [`HostGlobals`]. Everything in the bridge branches on [`Environment`]
//! to pick the real host path or the standalone mock path.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Native invocation capability installed by the host runtime.
///
/// The bridge only checks for its presence; calling natives is left to the
/// host's own bindings.
pub trait NativeInvoker: Send + Sync {}

type ResourceNameFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Process-wide capabilities the host installs before the UI starts.
#[derive(Default)]
pub struct HostGlobals {
    native: RwLock<Option<Arc<dyn NativeInvoker>>>,
    resource_name: RwLock<Option<ResourceNameFn>>,
}

impl HostGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_native(&self, invoker: Arc<dyn NativeInvoker>) {
        if let Ok(mut slot) = self.native.write() {
            *slot = Some(invoker);
            log::info!("Host native invoker installed");
        }
    }

    pub fn remove_native(&self) {
        if let Ok(mut slot) = self.native.write() {
            *slot = None;
        }
    }

    pub fn has_native(&self) -> bool {
        self.native.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Install the function the host uses to report its resource name.
    pub fn set_resource_name_provider(
        &self,
        provider: impl Fn() -> String + Send + Sync + 'static,
    ) {
        if let Ok(mut slot) = self.resource_name.write() {
            *slot = Some(Arc::new(provider));
        }
    }

    /// Ask the host for its resource name, if it provides one.
    pub fn resource_name(&self) -> Option<String> {
        let provider = self.resource_name.read().ok().and_then(|slot| slot.clone())?;
        Some(provider())
    }
}

/// Detects whether the host runtime is present.
///
/// The probe is evaluated on every call; nothing is cached.
#[derive(Clone)]
pub struct Environment {
    probe: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl Environment {
    /// Build from a probe returning true when the host is present.
    pub fn new(probe: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// Detect the host through the native invoker in `globals`.
    pub fn from_globals(globals: Arc<HostGlobals>) -> Self {
        Self::new(move || globals.has_native())
    }

    /// Always reports the host as present.
    pub fn host() -> Self {
        Self::new(|| true)
    }

    /// Always reports standalone (browser) mode.
    pub fn standalone() -> Self {
        Self::new(|| false)
    }

    pub fn is_standalone(&self) -> bool {
        !(self.probe)()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("standalone", &self.is_standalone())
            .finish()
    }
}
