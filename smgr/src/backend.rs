//! The out-of-process backend module is an external collaborator (§1):
//! the core only needs a start/stop boundary to drive it from
//! `SessionAccessor`'s `startModule`/`stopModule`.

/// A handle the core can start and stop; the concrete module
/// (Xorg/Wayland compositor, RemoteFX backend, etc.) lives outside this
/// crate.
pub trait BackendModule: Send + Sync {
    fn start(&self, session_id: u32, module_config_name: &str) -> bool;
    fn stop(&self, session_id: u32);
}

/// No-op stand-in for tests and default `Context` construction.
#[derive(Default)]
pub struct NullBackendModule;

impl BackendModule for NullBackendModule {
    fn start(&self, _session_id: u32, _module_config_name: &str) -> bool {
        true
    }

    fn stop(&self, _session_id: u32) {}
}
