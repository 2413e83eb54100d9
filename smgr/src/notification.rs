//! DBus session-notification emitter (§6), grounded on `zbus` the way
//! `other_examples/manifests/lamco-admin-wayland-rdp` uses it for
//! desktop-RDP session signalling — the closest DBus analogue in the
//! retrieved corpus.

use zbus::{dbus_interface, Connection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NotificationType {
    ConsoleConnect = 1,
    ConsoleDisconnect = 2,
    RemoteConnect = 3,
    RemoteDisconnect = 4,
    SessionLogon = 5,
    SessionLogoff = 6,
    SessionLock = 7,
    SessionUnlock = 8,
    SessionRemoteControl = 9,
    SessionCreate = 10,
    SessionTerminate = 11,
}

struct NotificationIface;

#[dbus_interface(name = "ogon.SessionManager.session.notification")]
impl NotificationIface {
    #[dbus_interface(signal)]
    async fn session_notification(
        signal_ctxt: &zbus::SignalContext<'_>,
        notification_type: u32,
        session_id: u32,
    ) -> zbus::Result<()>;
}

/// Emits `SessionNotification(uu)` signals on the session bus. The tasks
/// in `smgr::task` call [`NotificationEmitter::emit`] at every scripted
/// lifecycle point (§6).
pub struct NotificationEmitter {
    connection: Connection,
}

impl NotificationEmitter {
    pub async fn connect() -> zbus::Result<Self> {
        let connection = Connection::session().await?;
        Ok(Self { connection })
    }

    pub async fn emit(&self, kind: NotificationType, session_id: u32) -> zbus::Result<()> {
        let ctxt = zbus::SignalContext::new(&self.connection, "/ogon/SessionManager")?;
        NotificationIface::session_notification(&ctxt, kind as u32, session_id).await
    }
}

/// Synchronous emission boundary used by `smgr::task`: tasks run on
/// blocking executor threads, not an async runtime, so notification
/// emission is always a blocking call from their point of view.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, kind: NotificationType, session_id: u32);
}

/// Test/offline stand-in that records emitted notifications instead of
/// touching a real bus, used by the scenario tests in §8.
#[derive(Default)]
pub struct RecordingEmitter {
    pub events: std::sync::Mutex<Vec<(NotificationType, u32)>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saw(&self, kind: NotificationType, session_id: u32) -> bool {
        self.events.lock().unwrap().iter().any(|(k, s)| *k == kind && *s == session_id)
    }
}

impl NotificationSink for RecordingEmitter {
    fn emit(&self, kind: NotificationType, session_id: u32) {
        self.events.lock().unwrap().push((kind, session_id));
    }
}

/// Bridges the async [`NotificationEmitter`] onto the synchronous
/// [`NotificationSink`] boundary tasks call into, via a handle to the
/// Tokio runtime the Administrative API and ICP I/O already run on.
pub struct DbusNotificationSink {
    emitter: NotificationEmitter,
    runtime: tokio::runtime::Handle,
}

impl DbusNotificationSink {
    pub fn new(emitter: NotificationEmitter, runtime: tokio::runtime::Handle) -> Self {
        Self { emitter, runtime }
    }
}

impl NotificationSink for DbusNotificationSink {
    fn emit(&self, kind: NotificationType, session_id: u32) {
        if let Err(err) = self.runtime.block_on(self.emitter.emit(kind, session_id)) {
            tracing::warn!(%err, "failed to emit DBus session notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_emitter_tracks_events_in_order() {
        let emitter = RecordingEmitter::new();
        NotificationSink::emit(&emitter, NotificationType::SessionLogoff, 7);
        NotificationSink::emit(&emitter, NotificationType::SessionTerminate, 7);
        assert!(emitter.saw(NotificationType::SessionLogoff, 7));
        assert!(emitter.saw(NotificationType::SessionTerminate, 7));
        assert!(!emitter.saw(NotificationType::SessionLogon, 7));
    }
}
