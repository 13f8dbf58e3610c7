//! End-to-end tests of the service loop against an in-memory backend.
//!
//! All tests run with paused tokio time, so the verification timers fire
//! deterministically and the whole staged-verification sequence completes
//! in a few milliseconds of wall clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use wifistate::{
    ActivationHandle, ActiveConnectionState, ApObservation, BackendSignal, DeviceState,
    DeviceStatus, NetworkEvent, NetworkService, NetworkState, ProfileInfo, ProfileSpec, Result,
    SecurityFlags, SecurityShape, ServiceError, StateReason, WifiBackend,
};

/// Every mutating backend call the mock records, in order.
#[derive(Debug, Clone, PartialEq)]
enum MockCall {
    RequestScan,
    ActivateProfile(String),
    AddAndActivate(ProfileSpec),
    DeleteProfile(String),
    Deactivate,
    SetWifiEnabled(bool),
}

#[derive(Default)]
struct MockInner {
    aps: Vec<ApObservation>,
    profiles: Vec<ProfileInfo>,
    status: Option<DeviceStatus>,
    active: Option<String>,
    active_connections: Vec<(String, ActiveConnectionState)>,
    wifi_enabled: bool,
    ethernet: bool,
    fail_activation: bool,
    calls: Vec<MockCall>,
    signal_tx: Option<mpsc::UnboundedSender<BackendSignal>>,
}

struct MockBackend {
    inner: Mutex<MockInner>,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(MockInner {
                wifi_enabled: true,
                ..MockInner::default()
            }),
        })
    }

    fn set_aps(&self, aps: Vec<ApObservation>) {
        self.inner.lock().unwrap().aps = aps;
    }

    fn set_profiles(&self, profiles: Vec<ProfileInfo>) {
        self.inner.lock().unwrap().profiles = profiles;
    }

    fn set_status(&self, state: DeviceState, reason: StateReason) {
        self.inner.lock().unwrap().status = Some(DeviceStatus { state, reason });
    }

    fn set_link(&self, identity: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner.active = identity.map(str::to_owned);
        inner.active_connections = identity
            .map(|id| vec![(id.to_owned(), ActiveConnectionState::Activated)])
            .into_iter()
            .flatten()
            .collect();
        for ap in &mut inner.aps {
            ap.active = Some(ap.identity.as_str()) == identity;
        }
    }

    fn set_fail_activation(&self, fail: bool) {
        self.inner.lock().unwrap().fail_activation = fail;
    }

    fn emit(&self, signal: BackendSignal) {
        let tx = self.inner.lock().unwrap().signal_tx.clone();
        tx.expect("signals() not subscribed").send(signal).unwrap();
    }

    fn calls(&self) -> Vec<MockCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl WifiBackend for MockBackend {
    async fn wifi_available(&self) -> bool {
        true
    }

    async fn list_access_points(&self) -> Result<Vec<ApObservation>> {
        Ok(self.inner.lock().unwrap().aps.clone())
    }

    async fn request_scan(&self) -> Result<()> {
        self.inner.lock().unwrap().calls.push(MockCall::RequestScan);
        Ok(())
    }

    async fn active_identity(&self) -> Result<Option<String>> {
        Ok(self.inner.lock().unwrap().active.clone())
    }

    async fn active_connections(&self) -> Result<Vec<(String, ActiveConnectionState)>> {
        Ok(self.inner.lock().unwrap().active_connections.clone())
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileInfo>> {
        Ok(self.inner.lock().unwrap().profiles.clone())
    }

    async fn activate_profile(&self, identity: &str) -> Result<ActivationHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(MockCall::ActivateProfile(identity.to_owned()));
        if inner.fail_activation {
            return Err(ServiceError::Activation("mock rejection".into()));
        }
        Ok(ActivationHandle(format!("/mock/active/{identity}")))
    }

    async fn add_and_activate(&self, spec: ProfileSpec) -> Result<ActivationHandle> {
        let mut inner = self.inner.lock().unwrap();
        let identity = spec.identity.clone();
        inner.calls.push(MockCall::AddAndActivate(spec));
        if inner.fail_activation {
            return Err(ServiceError::Activation("mock rejection".into()));
        }
        Ok(ActivationHandle(format!("/mock/active/{identity}")))
    }

    async fn deactivate_active(&self) -> Result<()> {
        self.inner.lock().unwrap().calls.push(MockCall::Deactivate);
        Ok(())
    }

    async fn delete_profile(&self, identity: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(MockCall::DeleteProfile(identity.to_owned()));
        inner.profiles.retain(|p| p.identity != identity);
        Ok(())
    }

    async fn device_status(&self) -> Result<DeviceStatus> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .status
            .unwrap_or(DeviceStatus {
                state: DeviceState::Disconnected,
                reason: StateReason::None,
            }))
    }

    async fn wifi_enabled(&self) -> Result<bool> {
        Ok(self.inner.lock().unwrap().wifi_enabled)
    }

    async fn set_wifi_enabled(&self, enabled: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(MockCall::SetWifiEnabled(enabled));
        inner.wifi_enabled = enabled;
        Ok(())
    }

    async fn ethernet_present(&self) -> Result<bool> {
        Ok(self.inner.lock().unwrap().ethernet)
    }

    async fn signals(&self) -> Result<mpsc::UnboundedReceiver<BackendSignal>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().signal_tx = Some(tx);
        Ok(rx)
    }
}

fn ap(identity: &str, hw: &str, strength: u8, secure: bool) -> ApObservation {
    ApObservation {
        identity: identity.into(),
        hw_address: hw.into(),
        strength,
        frequency: 2437,
        security: if secure {
            SecurityFlags::PSK
        } else {
            SecurityFlags::empty()
        },
        active: false,
    }
}

fn profile(identity: &str, shape: SecurityShape) -> ProfileInfo {
    ProfileInfo {
        identity: identity.into(),
        shape,
    }
}

/// Waits until the published state satisfies the predicate. Paused time
/// makes the timeout effectively "until nothing more can happen".
async fn wait_state<F>(service: &NetworkService, predicate: F) -> NetworkState
where
    F: Fn(&NetworkState) -> bool,
{
    let mut rx = service.watch();
    loop {
        {
            let state = rx.borrow();
            if predicate(&state) {
                return state.clone();
            }
        }
        tokio::time::timeout(Duration::from_secs(60), rx.changed())
            .await
            .expect("state never satisfied predicate")
            .expect("service stopped");
    }
}

/// Waits for the next event matching the predicate, skipping others.
async fn wait_event<F>(rx: &mut broadcast::Receiver<NetworkEvent>, predicate: F) -> NetworkEvent
where
    F: Fn(&NetworkEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_secs(60), rx.recv())
            .await
            .expect("event never arrived")
            .expect("event channel closed");
        if predicate(&event) {
            return event;
        }
    }
}

fn is_outcome(event: &NetworkEvent) -> bool {
    matches!(
        event,
        NetworkEvent::ConnectionSucceeded(_)
            | NetworkEvent::ConnectionFailed { .. }
            | NetworkEvent::PasswordRequired(_)
    )
}

#[tokio::test(start_paused = true)]
async fn deduplicates_to_strongest_broadcaster() {
    let backend = MockBackend::new();
    backend.set_aps(vec![
        ap("mesh", "aa:00", 40, true),
        ap("mesh", "aa:01", 90, true),
        ap("other", "bb:00", 30, false),
    ]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    let state = wait_state(&service, |s| s.networks.len() == 2).await;

    let mesh = state.networks.iter().find(|n| n.identity == "mesh").unwrap();
    assert_eq!(mesh.strength, 90);
    assert_eq!(mesh.hw_address, "aa:01");
    assert!(mesh.secure);
}

#[tokio::test(start_paused = true)]
async fn active_broadcaster_wins_over_stronger_idle_one() {
    let backend = MockBackend::new();
    let mut hooked = ap("net", "hooked", 20, true);
    hooked.active = true;
    backend.set_aps(vec![ap("net", "idle", 90, true), hooked]);
    backend.inner.lock().unwrap().active = Some("net".into());

    let service = NetworkService::start(backend.clone()).await.unwrap();
    let state = wait_state(&service, |s| !s.networks.is_empty()).await;

    assert_eq!(state.networks.len(), 1);
    assert_eq!(state.networks[0].hw_address, "hooked");
    assert_eq!(state.networks[0].strength, 20);
    assert!(state.networks[0].active);
    assert_eq!(state.active.as_deref(), Some("net"));
}

#[tokio::test(start_paused = true)]
async fn secured_unknown_network_without_password_is_not_attempted() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("fortress", "aa:00", 80, true)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;

    service.connect_network("fortress", "").unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(backend.calls().is_empty(), "no backend call expected");
    assert_eq!(service.state().connecting_to, None);
}

#[tokio::test(start_paused = true)]
async fn password_over_stale_open_profile_deletes_then_rebuilds() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("cafe", "aa:00", 70, true)]);
    // The saved profile predates the network getting a password.
    backend.set_profiles(vec![profile("cafe", SecurityShape::Open)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    backend.set_status(DeviceState::Activated, StateReason::None);
    backend.set_link(Some("cafe"));
    service.connect_network("cafe", "newpass").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(event, NetworkEvent::ConnectionSucceeded("cafe".into()));

    let calls = backend.calls();
    let delete_pos = calls
        .iter()
        .position(|c| *c == MockCall::DeleteProfile("cafe".into()))
        .expect("stale profile should be deleted");
    let add_pos = calls
        .iter()
        .position(|c| matches!(c, MockCall::AddAndActivate(_)))
        .expect("fresh profile should be activated");
    assert!(delete_pos < add_pos, "delete must precede activation");

    let MockCall::AddAndActivate(spec) = &calls[add_pos] else {
        unreachable!()
    };
    assert_eq!(spec.shape, SecurityShape::WpaPsk);
    assert_eq!(spec.psk.as_deref(), Some("newpass"));
}

#[tokio::test(start_paused = true)]
async fn saved_profile_with_matching_shape_is_reactivated() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("home", "aa:00", 70, true)]);
    backend.set_profiles(vec![profile("home", SecurityShape::WpaPsk)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    let state = wait_state(&service, |s| !s.networks.is_empty()).await;
    assert!(state.networks[0].known);

    let mut events = service.events();
    backend.set_status(DeviceState::Activated, StateReason::None);
    backend.set_link(Some("home"));
    service.connect_network("home", "").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(event, NetworkEvent::ConnectionSucceeded("home".into()));
    assert!(
        backend
            .calls()
            .contains(&MockCall::ActivateProfile("home".into()))
    );
    assert!(
        !backend
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::AddAndActivate(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn need_auth_at_early_check_fails_with_credentials_reason() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("strict", "aa:00", 70, true)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    backend.set_status(DeviceState::NeedAuth, StateReason::None);
    service.connect_network("strict", "wrongpass").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(
        event,
        NetworkEvent::ConnectionFailed {
            identity: "strict".into(),
            reason: "incorrect credentials".into(),
        }
    );

    // No success may follow a hard failure.
    tokio::time::sleep(Duration::from_secs(30)).await;
    while let Ok(event) = events.try_recv() {
        assert!(!matches!(event, NetworkEvent::ConnectionSucceeded(_)));
    }
    assert_eq!(service.state().connecting_to, None);
}

#[tokio::test(start_paused = true)]
async fn provisional_success_then_delayed_drop_reports_failure() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("flaky", "aa:00", 70, true)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    backend.set_status(DeviceState::Activated, StateReason::None);
    backend.set_link(Some("flaky"));
    service.connect_network("flaky", "almostright").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(event, NetworkEvent::ConnectionSucceeded("flaky".into()));

    // The router kicks us shortly after the handshake.
    backend.set_status(DeviceState::Disconnected, StateReason::SupplicantDisconnected);
    backend.set_link(None);

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(
        event,
        NetworkEvent::ConnectionFailed {
            identity: "flaky".into(),
            reason: "authentication failed: incorrect credentials".into(),
        }
    );

    let state = wait_state(&service, |s| s.active.is_none()).await;
    assert!(!state.networks[0].active);
}

#[tokio::test(start_paused = true)]
async fn failure_ledger_suppresses_phantom_active_flag() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("liar", "aa:00", 70, true)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    // Activation sticks at NeedAuth, but the backend still claims the
    // device's active access point is the target.
    backend.set_status(DeviceState::NeedAuth, StateReason::NoSecrets);
    backend.inner.lock().unwrap().active = Some("liar".into());
    service.connect_network("liar", "badpass").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert!(matches!(event, NetworkEvent::ConnectionFailed { .. }));

    let state = wait_state(&service, |s| !s.networks.is_empty()).await;
    assert!(!state.networks[0].active, "failed network must not show active");
}

#[tokio::test(start_paused = true)]
async fn displaced_attempt_still_resolves_scoped_to_its_identity() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("first", "aa:00", 70, false), ap("second", "bb:00", 60, false)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.networks.len() == 2).await;
    let mut events = service.events();

    backend.set_status(DeviceState::Activated, StateReason::None);
    backend.set_link(Some("second"));

    service.connect_network("first", "").unwrap();
    service.connect_network("second", "").unwrap();

    // The newer attempt wins the device. The older one keeps running its
    // checks and must report an outcome for its own network, without ever
    // claiming success for it.
    let mut second_succeeded = false;
    let mut first_failed = false;
    while !(second_succeeded && first_failed) {
        match wait_event(&mut events, is_outcome).await {
            NetworkEvent::ConnectionSucceeded(id) => {
                assert_eq!(id, "second");
                second_succeeded = true;
            }
            NetworkEvent::ConnectionFailed { identity, .. } => {
                assert_eq!(identity, "first");
                first_failed = true;
            }
            event => panic!("unexpected outcome {event:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn same_identity_reconnect_supersedes_the_older_attempt() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("net", "aa:00", 70, false)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    backend.set_status(DeviceState::Activated, StateReason::None);
    backend.set_link(Some("net"));

    service.connect_network("net", "").unwrap();
    service.connect_network("net", "").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(event, NetworkEvent::ConnectionSucceeded("net".into()));

    // The older same-identity attempt was discarded; exactly one outcome.
    tokio::time::sleep(Duration::from_secs(30)).await;
    while let Ok(event) = events.try_recv() {
        assert!(!is_outcome(&event), "unexpected second outcome {event:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn forget_clears_known_flag_without_rescan() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("old", "aa:00", 70, true)]);
    backend.set_profiles(vec![profile("old", SecurityShape::WpaPsk)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.networks.first().is_some_and(|n| n.known)).await;

    service.forget("old").unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    backend.emit(BackendSignal::ProfilesChanged);

    let state = wait_state(&service, |s| s.networks.first().is_some_and(|n| !n.known)).await;
    assert_eq!(state.networks.len(), 1);
    assert!(backend.calls().contains(&MockCall::DeleteProfile("old".into())));
    assert!(!backend.calls().contains(&MockCall::RequestScan));
}

#[tokio::test(start_paused = true)]
async fn security_change_invalidates_stored_credentials() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("mutable", "aa:00", 70, false)]);
    backend.set_profiles(vec![profile("mutable", SecurityShape::Open)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.networks.first().is_some_and(|n| n.known)).await;
    let mut events = service.events();

    // The network turns up secured on the next beacon.
    backend.set_aps(vec![ap("mutable", "aa:00", 70, true)]);
    backend.emit(BackendSignal::AccessPointsChanged);

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(event, NetworkEvent::PasswordRequired("mutable".into()));

    let state = wait_state(&service, |s| {
        s.networks.first().is_some_and(|n| n.secure && !n.known)
    })
    .await;
    assert_eq!(state.networks.len(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(
        backend
            .calls()
            .contains(&MockCall::DeleteProfile("mutable".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn wifi_toggle_follows_backend_signal() {
    let backend = MockBackend::new();
    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.wifi_enabled).await;

    service.set_wifi_enabled(false).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(backend.calls().contains(&MockCall::SetWifiEnabled(false)));

    backend.set_aps(Vec::new());
    backend.emit(BackendSignal::WirelessEnabledChanged(false));
    let state = wait_state(&service, |s| !s.wifi_enabled).await;
    assert!(state.networks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn toggle_wifi_flips_against_the_loop_view() {
    let backend = MockBackend::new();
    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.wifi_enabled).await;

    service.toggle_wifi().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(backend.calls().contains(&MockCall::SetWifiEnabled(false)));

    backend.emit(BackendSignal::WirelessEnabledChanged(false));
    wait_state(&service, |s| !s.wifi_enabled).await;

    service.toggle_wifi().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(backend.calls().contains(&MockCall::SetWifiEnabled(true)));
}

#[tokio::test(start_paused = true)]
async fn unexpected_disconnect_outside_attempt_reports_failure() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("home", "aa:00", 70, true)]);
    backend.set_link(Some("home"));

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.active.as_deref() == Some("home")).await;
    let mut events = service.events();

    // The router kicks us without any attempt in flight.
    backend.set_link(None);
    backend.set_status(DeviceState::Disconnected, StateReason::SupplicantDisconnected);
    backend.emit(BackendSignal::DeviceStateChanged(DeviceStatus {
        state: DeviceState::Disconnected,
        reason: StateReason::SupplicantDisconnected,
    }));

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(
        event,
        NetworkEvent::ConnectionFailed {
            identity: "home".into(),
            reason: "authentication failed or timed out".into(),
        }
    );
    wait_state(&service, |s| s.active.is_none()).await;
}

#[tokio::test(start_paused = true)]
async fn early_check_failure_reason_is_always_credentials() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("strict", "aa:00", 70, false)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    // A supplicant drop at the first check reads as a credential problem,
    // not as the late check's generic timeout wording.
    backend.set_status(DeviceState::Disconnected, StateReason::SupplicantDisconnected);
    service.connect_network("strict", "").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    assert_eq!(
        event,
        NetworkEvent::ConnectionFailed {
            identity: "strict".into(),
            reason: "incorrect credentials".into(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn vanished_networks_are_dropped_on_scan() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("a", "aa:00", 50, false), ap("b", "bb:00", 50, false)]);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| s.networks.len() == 2).await;

    backend.set_aps(vec![ap("a", "aa:00", 55, false)]);
    service.rescan().unwrap();

    let state = wait_state(&service, |s| s.networks.len() == 1 && !s.scanning).await;
    assert_eq!(state.networks[0].identity, "a");
    assert_eq!(state.networks[0].strength, 55);
    assert!(backend.calls().contains(&MockCall::RequestScan));
}

#[tokio::test(start_paused = true)]
async fn activation_rejection_fails_immediately() {
    let backend = MockBackend::new();
    backend.set_aps(vec![ap("busy", "aa:00", 70, false)]);
    backend.set_fail_activation(true);

    let service = NetworkService::start(backend.clone()).await.unwrap();
    wait_state(&service, |s| !s.networks.is_empty()).await;
    let mut events = service.events();

    service.connect_network("busy", "").unwrap();

    let event = wait_event(&mut events, is_outcome).await;
    let NetworkEvent::ConnectionFailed { identity, reason } = event else {
        panic!("expected failure, got {event:?}");
    };
    assert_eq!(identity, "busy");
    assert!(reason.contains("activation failed"));
}
