//! The network lifecycle service.
//!
//! One background task owns all mutable state (the table, the known index,
//! the failure ledger, the attempt controller). Everything reaches it
//! through a single message channel: caller commands, backend signals,
//! activation results, and verification timer firings. Long-running backend
//! calls (scans, activations, profile deletion) run in spawned tasks that
//! report back through the same channel, so command handling never waits
//! on them.
//!
//! Callers observe the service through an atomically published state
//! snapshot (a watch channel) and a broadcast event stream.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{broadcast, mpsc, watch};

use crate::Result;
use crate::attempt::{
    self, AttemptPhase, BeginDecision, ConnectionAttemptController, VerifyStage,
};
use crate::backend::{ActivationHandle, BackendSignal, ProfileSpec, WifiBackend};
use crate::constants::timeouts;
use crate::known::KnownNetworkIndex;
use crate::ledger::FailureLedger;
use crate::models::{DeviceState, NetworkEvent, NetworkState, SecurityShape, ServiceError};
use crate::table::AccessPointTable;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Caller commands, forwarded verbatim into the service loop.
#[derive(Debug)]
enum Command {
    Rescan,
    SetWifiEnabled(bool),
    ToggleWifi,
    Connect { identity: String, password: String },
    Disconnect,
    Forget(String),
}

/// Everything the service loop can receive.
enum LoopMsg {
    Command(Command),
    Signal(BackendSignal),
    /// A spawned activation call finished.
    ActivationDone {
        identity: String,
        seq: u64,
        result: Result<ActivationHandle>,
    },
    /// A verification timer fired.
    Verify {
        identity: String,
        seq: u64,
        stage: VerifyStage,
    },
    /// The spawned scan request returned.
    ScanDone,
    /// The post-scan settle delay elapsed.
    ScanSettled,
}

/// Handle to a running network service.
///
/// Cheap to clone. Commands are fire-and-forget; outcomes arrive through
/// [`NetworkService::events`] and the state snapshot.
#[derive(Clone)]
pub struct NetworkService {
    tx: mpsc::UnboundedSender<LoopMsg>,
    state_rx: watch::Receiver<NetworkState>,
    events_tx: broadcast::Sender<NetworkEvent>,
}

impl NetworkService {
    /// Starts the service loop on the given backend.
    ///
    /// A missing Wi-Fi device is not an error: the service starts degraded
    /// and recovers when the backend reports a device appearing.
    pub async fn start(backend: Arc<dyn WifiBackend>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(NetworkState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        if !backend.wifi_available().await {
            warn!("No Wi-Fi device available, starting degraded");
        }

        match backend.signals().await {
            Ok(mut signals) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    while let Some(signal) = signals.recv().await {
                        if tx.send(LoopMsg::Signal(signal)).is_err() {
                            break;
                        }
                    }
                    debug!("Backend signal forwarder stopped");
                });
            }
            Err(e) => warn!("Backend signals unavailable: {e}"),
        }

        let actor = Actor {
            backend,
            table: AccessPointTable::default(),
            known: KnownNetworkIndex::default(),
            ledger: FailureLedger::default(),
            controller: ConnectionAttemptController::default(),
            active: None,
            last_link: None,
            wifi_enabled: false,
            ethernet_present: false,
            scanning: false,
            connecting_to: None,
            tx: tx.clone(),
            state_tx,
            events_tx: events_tx.clone(),
        };
        tokio::spawn(actor.run(rx));

        Ok(Self {
            tx,
            state_rx,
            events_tx,
        })
    }

    /// Requests a fresh scan. Ignored if one is already running.
    pub fn rescan(&self) -> Result<()> {
        self.send(Command::Rescan)
    }

    /// Enables or disables the Wi-Fi radio.
    pub fn set_wifi_enabled(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetWifiEnabled(enabled))
    }

    /// Flips the Wi-Fi radio. The flip happens inside the service loop
    /// against its current view, so callers need no read-then-set dance.
    pub fn toggle_wifi(&self) -> Result<()> {
        self.send(Command::ToggleWifi)
    }

    /// Starts a connection attempt. An empty password means "use whatever
    /// is saved"; the outcome arrives as a [`NetworkEvent`].
    pub fn connect_network(&self, identity: &str, password: &str) -> Result<()> {
        self.send(Command::Connect {
            identity: identity.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Disconnects from the current network.
    pub fn disconnect(&self) -> Result<()> {
        self.send(Command::Disconnect)
    }

    /// Deletes all stored profiles for a network.
    pub fn forget(&self, identity: &str) -> Result<()> {
        self.send(Command::Forget(identity.to_owned()))
    }

    /// Current state snapshot.
    pub fn state(&self) -> NetworkState {
        self.state_rx.borrow().clone()
    }

    /// Watch channel carrying every published state snapshot.
    pub fn watch(&self) -> watch::Receiver<NetworkState> {
        self.state_rx.clone()
    }

    /// Subscribes to service events.
    pub fn events(&self) -> broadcast::Receiver<NetworkEvent> {
        self.events_tx.subscribe()
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(LoopMsg::Command(cmd))
            .map_err(|_| ServiceError::ServiceStopped)
    }
}

/// The state-owning loop task.
struct Actor {
    backend: Arc<dyn WifiBackend>,
    table: AccessPointTable,
    known: KnownNetworkIndex,
    ledger: FailureLedger,
    controller: ConnectionAttemptController,
    /// Identity currently surfaced as active (post-ledger).
    active: Option<String>,
    /// Last identity known to have had an established link, for
    /// attributing disconnects that happen outside an attempt.
    last_link: Option<String>,
    wifi_enabled: bool,
    ethernet_present: bool,
    scanning: bool,
    connecting_to: Option<String>,
    tx: mpsc::UnboundedSender<LoopMsg>,
    state_tx: watch::Sender<NetworkState>,
    events_tx: broadcast::Sender<NetworkEvent>,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<LoopMsg>) {
        self.wifi_enabled = self.backend.wifi_enabled().await.unwrap_or(false);
        self.ethernet_present = self.backend.ethernet_present().await.unwrap_or(false);
        self.refresh_known().await;
        self.reconcile().await;

        while let Some(msg) = rx.recv().await {
            match msg {
                LoopMsg::Command(cmd) => self.handle_command(cmd).await,
                LoopMsg::Signal(signal) => self.handle_signal(signal).await,
                LoopMsg::ActivationDone {
                    identity,
                    seq,
                    result,
                } => self.handle_activation_done(identity, seq, result).await,
                LoopMsg::Verify {
                    identity,
                    seq,
                    stage,
                } => self.handle_verify(identity, seq, stage).await,
                LoopMsg::ScanDone => self.handle_scan_done().await,
                LoopMsg::ScanSettled => self.handle_scan_settled().await,
            }
        }
        debug!("Service loop stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Rescan => {
                if self.scanning {
                    debug!("Scan already in progress, ignoring rescan");
                    return;
                }
                self.scanning = true;
                self.publish_state();

                let backend = self.backend.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = backend.request_scan().await {
                        warn!("Scan request failed: {e}");
                    }
                    let _ = tx.send(LoopMsg::ScanDone);
                });
            }
            Command::SetWifiEnabled(enabled) => self.spawn_set_wifi(enabled),
            Command::ToggleWifi => self.spawn_set_wifi(!self.wifi_enabled),
            Command::Connect { identity, password } => {
                self.begin_connect(identity, password);
            }
            Command::Disconnect => {
                let backend = self.backend.clone();
                tokio::spawn(async move {
                    if let Err(e) = backend.deactivate_active().await {
                        warn!("Disconnect failed: {e}");
                    }
                });
            }
            Command::Forget(identity) => {
                self.ledger.clear(&identity);
                let backend = self.backend.clone();
                tokio::spawn(async move {
                    match backend.delete_profile(&identity).await {
                        Ok(()) => info!("Forgot network '{identity}'"),
                        Err(e) => warn!("Forget of '{identity}' failed: {e}"),
                    }
                });
                // The known index refreshes when the backend reports the
                // profile removal.
            }
        }
    }

    fn begin_connect(&mut self, identity: String, password: String) {
        let saved_shape = self.known.shape(&identity);

        // A network can be targeted before it ever appeared in the table
        // (a hidden or just-departed one). Fall back to what we can infer.
        let (secure, known) = match self.table.get(&identity) {
            Some(rec) => (rec.secure, rec.known),
            None => (
                saved_shape
                    .map(|s| s.secured())
                    .unwrap_or(!password.is_empty()),
                self.known.contains(&identity),
            ),
        };

        match attempt::decide(secure, known, saved_shape, &password) {
            BeginDecision::Reject => {
                warn!("Refusing to connect to secured network '{identity}' without credentials");
            }
            BeginDecision::PasswordRequired { delete_existing } => {
                if delete_existing {
                    self.spawn_delete_profile(identity.clone());
                }
                self.emit(NetworkEvent::PasswordRequired(identity));
            }
            BeginDecision::ActivateSaved => {
                let seq = self.start_attempt(&identity);
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = backend.activate_profile(&identity).await;
                    let _ = tx.send(LoopMsg::ActivationDone {
                        identity,
                        seq,
                        result,
                    });
                });
            }
            BeginDecision::RebuildFresh { delete_existing } => {
                let seq = self.start_attempt(&identity);
                let shape = SecurityShape::for_secure(secure);
                let spec = ProfileSpec {
                    identity: identity.clone(),
                    shape,
                    psk: (shape == SecurityShape::WpaPsk && !password.is_empty())
                        .then_some(password),
                };
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    if delete_existing
                        && let Err(e) = backend.delete_profile(&identity).await
                    {
                        warn!("Could not delete stale profile for '{identity}': {e}");
                    }
                    let result = backend.add_and_activate(spec).await;
                    let _ = tx.send(LoopMsg::ActivationDone {
                        identity,
                        seq,
                        result,
                    });
                });
            }
        }
    }

    /// Registers a new attempt and publishes the connecting state.
    fn start_attempt(&mut self, identity: &str) -> u64 {
        let seq = self.controller.begin(identity);
        self.ledger.clear(identity);
        self.connecting_to = Some(identity.to_owned());
        info!("Connection attempt #{seq} to '{identity}'");
        self.publish_state();
        seq
    }

    /// Whether (identity, seq) belongs to an attempt that was replaced by
    /// one targeting a *different* network. Such attempts keep running to
    /// completion, scoped to their own identity; only same-identity
    /// supersession discards.
    fn is_displaced(&self, identity: &str) -> bool {
        self.controller
            .current()
            .is_none_or(|a| a.identity != identity)
    }

    async fn handle_activation_done(
        &mut self,
        identity: String,
        seq: u64,
        result: Result<ActivationHandle>,
    ) {
        if self.controller.is_current(&identity, seq) {
            match result {
                Ok(handle) => {
                    debug!("Activation accepted for '{identity}': {}", handle.0);
                    if self.connecting_to.as_deref() == Some(identity.as_str()) {
                        self.connecting_to = None;
                        self.publish_state();
                    }
                    self.controller
                        .advance(seq, AttemptPhase::AwaitingEarlyVerification);
                    self.schedule_verify(&identity, seq, VerifyStage::Early);
                }
                Err(e) => {
                    self.fail_attempt(&identity, seq, &format!("activation failed: {e}"))
                        .await;
                }
            }
        } else if self.is_displaced(&identity) {
            match result {
                Ok(handle) => {
                    debug!(
                        "Activation accepted for displaced attempt to '{identity}': {}",
                        handle.0
                    );
                    self.schedule_verify(&identity, seq, VerifyStage::Early);
                }
                Err(e) => {
                    self.fail_displaced(&identity, &format!("activation failed: {e}"))
                        .await;
                }
            }
        } else {
            debug!("Discarding superseded activation result for '{identity}' #{seq}");
        }
    }

    fn schedule_verify(&self, identity: &str, seq: u64, stage: VerifyStage) {
        let identity = identity.to_owned();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(stage.delay()).await;
            let _ = tx.send(LoopMsg::Verify {
                identity,
                seq,
                stage,
            });
        });
    }

    async fn handle_verify(&mut self, identity: String, seq: u64, stage: VerifyStage) {
        if !self.controller.is_current(&identity, seq) {
            if self.is_displaced(&identity) {
                self.verify_displaced(identity, seq, stage).await;
            } else {
                debug!("Discarding superseded verify timer for '{identity}' #{seq}");
            }
            return;
        }

        match stage {
            VerifyStage::Early => {
                match self.backend.device_status().await {
                    Ok(status) => {
                        if attempt::early_failure(status.state, status.reason) {
                            self.fail_attempt(&identity, seq, attempt::EARLY_FAILURE_REASON)
                                .await;
                            return;
                        }
                        debug!(
                            "Early check for '{identity}': {} ({}), continuing",
                            status.state, status.reason
                        );
                    }
                    // An unreadable status this early is not conclusive
                    // either way; the late check settles it.
                    Err(e) => warn!("Early verification read failed: {e}"),
                }
                self.controller
                    .advance(seq, AttemptPhase::AwaitingLateVerification);
                self.schedule_verify(&identity, seq, VerifyStage::Late);
            }
            VerifyStage::Late => match self.link_established(&identity).await {
                Ok(true) => {
                    info!("Connected to '{identity}'");
                    self.ledger.clear(&identity);
                    self.connecting_to = None;
                    self.last_link = Some(identity.clone());
                    self.emit(NetworkEvent::ConnectionSucceeded(identity.clone()));
                    self.controller
                        .advance(seq, AttemptPhase::AwaitingDelayedVerification);
                    self.schedule_verify(&identity, seq, VerifyStage::Delayed);
                    self.reconcile().await;
                }
                Ok(false) => {
                    let reason = match self.backend.device_status().await {
                        Ok(status) => attempt::classify_failure(status.state, status.reason),
                        Err(_) => "authentication failed or timed out",
                    };
                    self.fail_attempt(&identity, seq, reason).await;
                }
                Err(e) => {
                    self.fail_attempt(&identity, seq, &format!("verification failed: {e}"))
                        .await;
                }
            },
            VerifyStage::Delayed => {
                match self.link_established(&identity).await {
                    Ok(true) | Err(_) => {
                        // Success stands; an unreadable status after a
                        // verified link is not evidence of a drop.
                        self.controller.resolve(seq);
                        debug!("Delayed re-check for '{identity}' passed");
                    }
                    Ok(false) => {
                        warn!("Link to '{identity}' dropped shortly after connecting");
                        self.ledger.mark(&identity);
                        self.controller.resolve(seq);
                        self.last_link = None;
                        self.emit(NetworkEvent::ConnectionFailed {
                            identity,
                            reason: attempt::DELAYED_DROP_REASON.to_owned(),
                        });
                        self.reconcile().await;
                    }
                }
            }
        }
    }

    /// Runs a verification stage for a displaced attempt. Mirrors the live
    /// stages but never touches the controller, the connecting flag, or the
    /// last-link marker, which all belong to the newer attempt.
    async fn verify_displaced(&mut self, identity: String, seq: u64, stage: VerifyStage) {
        match stage {
            VerifyStage::Early => {
                if let Ok(status) = self.backend.device_status().await
                    && attempt::early_failure(status.state, status.reason)
                {
                    self.fail_displaced(&identity, attempt::EARLY_FAILURE_REASON)
                        .await;
                    return;
                }
                self.schedule_verify(&identity, seq, VerifyStage::Late);
            }
            VerifyStage::Late => match self.link_established(&identity).await {
                Ok(true) => {
                    info!("Connected to '{identity}' (displaced attempt)");
                    self.ledger.clear(&identity);
                    self.emit(NetworkEvent::ConnectionSucceeded(identity.clone()));
                    self.schedule_verify(&identity, seq, VerifyStage::Delayed);
                    self.reconcile().await;
                }
                Ok(false) => {
                    let reason = match self.backend.device_status().await {
                        Ok(status) => attempt::classify_failure(status.state, status.reason),
                        Err(_) => "authentication failed or timed out",
                    };
                    self.fail_displaced(&identity, reason).await;
                }
                Err(e) => {
                    self.fail_displaced(&identity, &format!("verification failed: {e}"))
                        .await;
                }
            },
            VerifyStage::Delayed => {
                if let Ok(false) = self.link_established(&identity).await {
                    warn!("Link to '{identity}' dropped shortly after connecting");
                    self.ledger.mark(&identity);
                    self.emit(NetworkEvent::ConnectionFailed {
                        identity,
                        reason: attempt::DELAYED_DROP_REASON.to_owned(),
                    });
                    self.reconcile().await;
                }
            }
        }
    }

    async fn fail_displaced(&mut self, identity: &str, reason: &str) {
        warn!("Displaced connection attempt to '{identity}' failed: {reason}");
        self.ledger.mark(identity);
        self.emit(NetworkEvent::ConnectionFailed {
            identity: identity.to_owned(),
            reason: reason.to_owned(),
        });
        self.reconcile().await;
    }

    /// Whether the device reports an established link to `identity`.
    ///
    /// The device state is authoritative; the active connection list only
    /// corroborates, and a disagreement is logged but does not change the
    /// verdict.
    async fn link_established(&self, identity: &str) -> Result<bool> {
        let status = self.backend.device_status().await?;
        let active = self.backend.active_identity().await?;
        let connected =
            status.state == DeviceState::Activated && active.as_deref() == Some(identity);

        if connected
            && let Ok(connections) = self.backend.active_connections().await
        {
            let corroborated = connections.iter().any(|(id, state)| {
                id == identity && *state == crate::models::ActiveConnectionState::Activated
            });
            if !corroborated {
                warn!(
                    "Device reports link to '{identity}' but no activated connection matches"
                );
            }
        }

        Ok(connected)
    }

    async fn fail_attempt(&mut self, identity: &str, seq: u64, reason: &str) {
        warn!("Connection attempt to '{identity}' failed: {reason}");
        self.ledger.mark(identity);
        self.controller.resolve(seq);
        if self.connecting_to.as_deref() == Some(identity) {
            self.connecting_to = None;
        }
        self.emit(NetworkEvent::ConnectionFailed {
            identity: identity.to_owned(),
            reason: reason.to_owned(),
        });
        self.reconcile().await;
    }

    async fn handle_signal(&mut self, signal: BackendSignal) {
        match signal {
            BackendSignal::AccessPointsChanged => self.reconcile().await,
            BackendSignal::DeviceAdded | BackendSignal::DeviceRemoved => {
                self.ethernet_present = self.backend.ethernet_present().await.unwrap_or(false);
                self.reconcile().await;
            }
            BackendSignal::WirelessEnabledChanged(enabled) => {
                info!("Wi-Fi radio {}", if enabled { "enabled" } else { "disabled" });
                self.wifi_enabled = enabled;
                self.reconcile().await;
            }
            BackendSignal::ActiveConnectionsChanged => self.update_active().await,
            BackendSignal::ProfilesChanged => {
                self.refresh_known().await;
                if self.table.derive_known(&self.known) {
                    self.emit(NetworkEvent::NetworksChanged);
                }
                self.publish_state();
            }
            BackendSignal::DeviceStateChanged(status) => match status.state {
                DeviceState::Activated => {
                    // During an attempt the verification checks own the
                    // interpretation of device state.
                    if !self.controller.busy() {
                        self.update_active().await;
                    }
                }
                DeviceState::Failed | DeviceState::Disconnected | DeviceState::NeedAuth => {
                    if let Some(lost) = self.last_link.clone()
                        && !self.controller.tracking(&lost)
                        && attempt::auth_related(status.reason)
                    {
                        warn!("Unexpected disconnect from '{lost}': {}", status.reason);
                        self.last_link = None;
                        self.ledger.mark(&lost);
                        self.emit(NetworkEvent::ConnectionFailed {
                            identity: lost,
                            reason: attempt::classify_failure(status.state, status.reason)
                                .to_owned(),
                        });
                    }
                    if !self.controller.busy() {
                        self.update_active().await;
                    }
                }
                _ => {}
            },
        }
    }

    async fn handle_scan_done(&mut self) {
        // First pass now, second after the results settle.
        self.reconcile().await;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeouts::scan_settle_delay()).await;
            let _ = tx.send(LoopMsg::ScanSettled);
        });
    }

    async fn handle_scan_settled(&mut self) {
        self.reconcile().await;
        self.scanning = false;
        self.publish_state();
    }

    /// Rebuilds the known index from a fresh profile enumeration.
    async fn refresh_known(&mut self) {
        match self.backend.list_profiles().await {
            Ok(profiles) => {
                self.known.rebuild(profiles);
                debug!("Known index rebuilt, {} profiles", self.known.len());
            }
            Err(e) => warn!("Profile enumeration failed, keeping known index: {e}"),
        }
    }

    /// Re-derives the active flags from the backend's current view, without
    /// touching observation data.
    async fn update_active(&mut self) {
        let backend_active = match self.backend.active_identity().await {
            Ok(active) => active,
            Err(e) => {
                warn!("Active identity read failed: {e}");
                return;
            }
        };

        let changed = self
            .table
            .derive_active(backend_active.as_deref(), &self.ledger);
        self.apply_active(self.table.active_identity());
        if changed {
            self.emit(NetworkEvent::NetworksChanged);
        }
        self.publish_state();
    }

    /// Full reconcile pass: re-enumerate, rebuild the table, re-derive
    /// flags, surface invalidations, publish.
    async fn reconcile(&mut self) {
        let observations = match self.backend.list_access_points().await {
            Ok(obs) => obs,
            Err(e) => {
                // Keep the last good table rather than flickering to empty.
                warn!("Access point enumeration failed: {e}");
                self.publish_state();
                return;
            }
        };

        let backend_active = match self.backend.active_identity().await {
            Ok(active) => active,
            Err(e) => {
                warn!("Active identity read failed, keeping previous: {e}");
                self.active.clone()
            }
        };

        let report = self.table.reconcile(
            &observations,
            backend_active.as_deref(),
            &self.known,
            &self.ledger,
        );
        if report.any_field_changed {
            debug!("Reconciled, {} networks visible", self.table.len());
        } else {
            debug!("Reconciled, no field changes");
        }

        for identity in report.invalidated {
            info!("Stored credentials for '{identity}' no longer match, discarding");
            self.spawn_delete_profile(identity.clone());
            self.emit(NetworkEvent::PasswordRequired(identity));
        }

        self.apply_active(self.table.active_identity());
        // One notification per reconcile pass, changed fields or not, so
        // consumers re-evaluate derived flags they cannot cheaply track.
        self.emit(NetworkEvent::NetworksChanged);
        self.publish_state();
    }

    /// Records a change of the surfaced active identity.
    fn apply_active(&mut self, derived: Option<String>) {
        if derived != self.active {
            self.active = derived.clone();
            if derived.is_some() {
                self.last_link = derived.clone();
            }
            self.emit(NetworkEvent::ActiveChanged(derived));
        }
    }

    fn spawn_set_wifi(&self, enabled: bool) {
        // The flag itself follows the WirelessEnabledChanged signal.
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.set_wifi_enabled(enabled).await {
                warn!("Failed to set Wi-Fi enabled={enabled}: {e}");
            }
        });
    }

    fn spawn_delete_profile(&self, identity: String) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.delete_profile(&identity).await {
                warn!("Could not delete profile for '{identity}': {e}");
            }
        });
    }

    fn emit(&self, event: NetworkEvent) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.events_tx.send(event);
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(NetworkState {
            networks: self.table.to_snapshot(),
            active: self.active.clone(),
            wifi_enabled: self.wifi_enabled,
            ethernet_present: self.ethernet_present,
            scanning: self.scanning,
            connecting_to: self.connecting_to.clone(),
        });
    }
}
