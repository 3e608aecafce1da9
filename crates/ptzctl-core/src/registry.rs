// ── Camera registry ──
//
// Owns one `CameraRecord` per configured camera and one background task per
// record that performs the device handshake exactly once. `initialize`
// returns before any handshake finishes; a camera that never answers only
// ever affects its own record.

use std::sync::Arc;
use std::time::Duration;

use ptzctl_api::{DeviceDriver, DriverConnector};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{CameraConfig, RegistrySettings};
use crate::model::{CameraId, CameraSnapshot, ConnectionState};

// ── Link ────────────────────────────────────────────────────────────

/// Connection state and its payload in one value, so a driver exists only
/// while connected and a reason only once failed.
enum Link<D> {
    Connecting,
    Connected(Arc<D>),
    Failed(String),
}

impl<D> Link<D> {
    fn state(&self) -> ConnectionState {
        match self {
            Self::Connecting => ConnectionState::Connecting,
            Self::Connected(_) => ConnectionState::Connected,
            Self::Failed(_) => ConnectionState::Failed,
        }
    }
}

// ── CameraRecord ────────────────────────────────────────────────────

/// One configured camera and the outcome of its connection attempt.
pub struct CameraRecord<D> {
    id: CameraId,
    config: CameraConfig,
    link: watch::Sender<Link<D>>,
}

impl<D> CameraRecord<D> {
    fn new(id: CameraId, config: CameraConfig) -> Self {
        let (link, _) = watch::channel(Link::Connecting);
        Self { id, config, link }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.link.borrow().state()
    }

    /// Handshake failure reason; `None` unless the state is `Failed`.
    pub fn last_error(&self) -> Option<String> {
        match &*self.link.borrow() {
            Link::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// The driver handle; `None` unless the state is `Connected`.
    pub fn driver(&self) -> Option<Arc<D>> {
        match &*self.link.borrow() {
            Link::Connected(driver) => Some(Arc::clone(driver)),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        self.snapshot_of(&self.link.borrow())
    }

    /// The driver if connected, otherwise a snapshot of the state that
    /// prevented it. Both come from a single read of the link.
    pub fn connected(&self) -> Result<Arc<D>, CameraSnapshot> {
        let link = self.link.borrow();
        match &*link {
            Link::Connected(driver) => Ok(Arc::clone(driver)),
            other => Err(self.snapshot_of(other)),
        }
    }

    fn snapshot_of(&self, link: &Link<D>) -> CameraSnapshot {
        CameraSnapshot {
            id: self.id,
            name: self.config.name.clone(),
            host: self.config.host.clone(),
            port: self.config.port,
            state: link.state(),
            last_error: match link {
                Link::Failed(reason) => Some(reason.clone()),
                _ => None,
            },
        }
    }

    /// Wait until the connection attempt has finished either way.
    pub async fn settled(&self) -> ConnectionState {
        let mut rx = self.link.subscribe();
        match rx.wait_for(|link| !matches!(link, Link::Connecting)).await {
            Ok(link) => link.state(),
            // unreachable while `self` holds the sender
            Err(_) => self.state(),
        }
    }

    /// Leave `Connecting` for good. Later publishes are ignored.
    fn publish(&self, outcome: Link<D>) -> bool {
        self.link.send_if_modified(|link| {
            if matches!(link, Link::Connecting) {
                *link = outcome;
                true
            } else {
                false
            }
        })
    }
}

impl<D> std::fmt::Debug for CameraRecord<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraRecord")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ── CameraRegistry ──────────────────────────────────────────────────

/// The fixed set of configured cameras.
///
/// The record list never changes after `initialize`, so lookups take no
/// lock. Share it behind an `Arc`.
pub struct CameraRegistry<D> {
    records: Vec<Arc<CameraRecord<D>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<D: DeviceDriver> CameraRegistry<D> {
    /// Create a record per config (ids 1..=N in order) and start connecting
    /// all of them in the background. Returns without waiting.
    ///
    /// Must be called within a tokio runtime.
    pub fn initialize<C>(configs: Vec<CameraConfig>, connector: C, settings: RegistrySettings) -> Self
    where
        C: DriverConnector<Driver = D>,
    {
        let connector = Arc::new(connector);
        let cancel = CancellationToken::new();

        let records: Vec<_> = (1..)
            .zip(configs)
            .map(|(raw, config)| Arc::new(CameraRecord::new(CameraId::new(raw), config)))
            .collect();

        let handles = records
            .iter()
            .map(|record| {
                tokio::spawn(establish(
                    Arc::clone(record),
                    Arc::clone(&connector),
                    settings.connect_timeout,
                    cancel.clone(),
                ))
            })
            .collect();

        info!(cameras = records.len(), "camera registry initialized");

        Self {
            records,
            cancel,
            task_handles: Mutex::new(handles),
        }
    }
}

impl<D> CameraRegistry<D> {
    /// The record with this id, if one was configured.
    pub fn lookup(&self, id: CameraId) -> Option<Arc<CameraRecord<D>>> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.records.get(index).cloned()
    }

    pub fn cameras(&self) -> &[Arc<CameraRecord<D>>] {
        &self.records
    }

    pub fn snapshots(&self) -> Vec<CameraSnapshot> {
        self.records.iter().map(|r| r.snapshot()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids whose handshake is still in flight.
    pub fn connecting(&self) -> Vec<CameraId> {
        self.records
            .iter()
            .filter(|r| r.state() == ConnectionState::Connecting)
            .map(|r| r.id())
            .collect()
    }

    /// Wait until no camera is still connecting.
    pub async fn wait_settled(&self) {
        for record in &self.records {
            record.settled().await;
        }
    }

    /// Cancel pending handshakes and join every connection task.
    ///
    /// Cameras still connecting end up `Failed`.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let mut handles = self.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "connection task ended abnormally");
            }
        }
        debug!("camera registry shut down");
    }
}

impl<D> Drop for CameraRegistry<D> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Connection task ─────────────────────────────────────────────────

async fn establish<C: DriverConnector>(
    record: Arc<CameraRecord<C::Driver>>,
    connector: Arc<C>,
    timeout: Duration,
    cancel: CancellationToken,
) {
    let endpoint = match record.config.endpoint() {
        Ok(endpoint) => endpoint,
        Err(reason) => {
            warn!(
                camera = %record.id,
                name = %record.config.name,
                error = %reason,
                "camera has no usable credentials"
            );
            record.publish(Link::Failed(reason));
            return;
        }
    };
    debug!(camera = %record.id, host = %endpoint.address(), "connecting");

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => Err("connection cancelled by shutdown".to_owned()),
        result = tokio::time::timeout(timeout, connector.connect(&endpoint)) => match result {
            Ok(Ok(driver)) => Ok(driver),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("connection timed out after {}s", timeout.as_secs())),
        },
    };

    match outcome {
        Ok(driver) => {
            record.publish(Link::Connected(Arc::new(driver)));
            info!(camera = %record.id, name = %record.config.name, "camera connected");
        }
        Err(reason) => {
            warn!(
                camera = %record.id,
                name = %record.config.name,
                host = %endpoint.address(),
                error = %reason,
                "camera connection failed"
            );
            record.publish(Link::Failed(reason));
        }
    }
}
