// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optimistic toggle behaviour against scripted router and poller doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use peplink_wan::{
    ApiResponse, CommandError, CommandPhase, ConfigClient, DeviceSnapshot, Poller, ProtocolError,
    RefreshScheduler, RefreshSchedulingError, StatePublisher, ToggleContext, WanConnection, WanId,
    WanToggle, WanUpdate,
};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Update(WanUpdate),
    Apply,
    ApplyDone,
}

/// Router double that logs every call and answers from a script.
struct ScriptedRouter {
    calls: Mutex<Vec<Call>>,
    update_reply: ApiResponse,
    apply_reply: ApiResponse,
    apply_delay: Duration,
}

impl ScriptedRouter {
    fn accepting() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            update_reply: ApiResponse::ok(),
            apply_reply: ApiResponse::ok(),
            apply_delay: Duration::ZERO,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

impl ConfigClient for ScriptedRouter {
    async fn update(
        &self,
        _resource: &str,
        payload: &[WanUpdate],
    ) -> Result<ApiResponse, ProtocolError> {
        self.calls
            .lock()
            .extend(payload.iter().copied().map(Call::Update));
        Ok(self.update_reply.clone())
    }

    async fn apply(&self) -> Result<ApiResponse, ProtocolError> {
        self.calls.lock().push(Call::Apply);
        if !self.apply_delay.is_zero() {
            tokio::time::sleep(self.apply_delay).await;
        }
        self.calls.lock().push(Call::ApplyDone);
        Ok(self.apply_reply.clone())
    }
}

#[derive(Default)]
struct CountingPoller {
    refreshes: AtomicUsize,
}

impl Poller for CountingPoller {
    fn snapshot(&self) -> Arc<DeviceSnapshot> {
        Arc::new(DeviceSnapshot::default())
    }

    fn last_update_success(&self) -> bool {
        true
    }

    async fn request_refresh(&self) -> Result<(), RefreshSchedulingError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<(WanId, bool)>>,
    drifts: AtomicUsize,
}

impl StatePublisher for RecordingPublisher {
    fn publish_state(&self, wan_id: &WanId, enabled: bool) {
        self.published.lock().push((wan_id.clone(), enabled));
    }

    fn report_drift(&self, _wan_id: &WanId, _local: bool, _remote: bool) {
        self.drifts.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    toggle: WanToggle<ScriptedRouter, CountingPoller>,
    router: Arc<ScriptedRouter>,
    poller: Arc<CountingPoller>,
    publisher: Arc<RecordingPublisher>,
    scheduler: RefreshScheduler,
}

impl Harness {
    fn new(router: ScriptedRouter, initial: bool) -> Self {
        let router = Arc::new(router);
        let poller = Arc::new(CountingPoller::default());
        let publisher = Arc::new(RecordingPublisher::default());

        let context = ToggleContext::new(
            Arc::clone(&router),
            Arc::clone(&poller),
            Arc::clone(&publisher) as Arc<dyn StatePublisher>,
        );
        let scheduler = context.scheduler().clone();
        let connection = WanConnection::new(3, initial).with_name("Fiber");
        let toggle = WanToggle::from_connection(context, &connection);

        Self {
            toggle,
            router,
            poller,
            publisher,
            scheduler,
        }
    }

    fn pending_refreshes(&self) -> usize {
        self.scheduler.pending()
    }
}

// ============================================================================
// Command outcomes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn successful_command_is_visible_immediately() {
    let h = Harness::new(ScriptedRouter::accepting(), false);

    h.toggle.command(true).await.unwrap();

    assert!(h.toggle.read());
    assert_eq!(
        *h.publisher.published.lock(),
        vec![(WanId::new("3"), true)]
    );
    assert_eq!(
        h.router.calls(),
        vec![
            Call::Update(WanUpdate { id: 3, enable: true }),
            Call::Apply,
            Call::ApplyDone,
        ]
    );

    assert_eq!(h.pending_refreshes(), 1);
    assert_eq!(h.poller.refreshes.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(h.pending_refreshes(), 0);
    assert_eq!(h.poller.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_update_leaves_state_alone() {
    let router = ScriptedRouter {
        update_reply: ApiResponse::error(Some(42), "Invalid parameter"),
        ..ScriptedRouter::accepting()
    };
    let h = Harness::new(router, false);

    let err = h.toggle.command(true).await.unwrap_err();

    assert!(matches!(
        err,
        CommandError::RemoteRejected {
            phase: CommandPhase::Update,
            code: Some(42),
            ..
        }
    ));
    assert!(!h.toggle.read());
    assert_eq!(
        h.router.calls(),
        vec![Call::Update(WanUpdate { id: 3, enable: true })]
    );
    assert!(h.publisher.published.lock().is_empty());
    assert_eq!(h.pending_refreshes(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.poller.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_apply_leaves_state_alone() {
    let router = ScriptedRouter {
        apply_reply: ApiResponse::error(None, "Apply failed"),
        ..ScriptedRouter::accepting()
    };
    let h = Harness::new(router, false);

    let err = h.toggle.command(true).await.unwrap_err();

    match err {
        CommandError::RemoteRejected {
            phase,
            code,
            message,
        } => {
            assert_eq!(phase, CommandPhase::Apply);
            assert_eq!(code, None);
            assert_eq!(message, "Apply failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!h.toggle.read());
    assert!(h.publisher.published.lock().is_empty());
    assert_eq!(h.pending_refreshes(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.poller.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn commands_on_one_toggle_do_not_interleave() {
    let router = ScriptedRouter {
        apply_delay: Duration::from_secs(2),
        ..ScriptedRouter::accepting()
    };
    let h = Harness::new(router, false);

    let (first, second) = tokio::join!(h.toggle.command(true), h.toggle.command(false));
    first.unwrap();
    second.unwrap();

    assert_eq!(
        h.router.calls(),
        vec![
            Call::Update(WanUpdate { id: 3, enable: true }),
            Call::Apply,
            Call::ApplyDone,
            Call::Update(WanUpdate { id: 3, enable: false }),
            Call::Apply,
            Call::ApplyDone,
        ]
    );
    assert!(!h.toggle.read());
    assert_eq!(h.publisher.published.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn read_does_not_wait_for_inflight_command() {
    let router = ScriptedRouter {
        apply_delay: Duration::from_secs(5),
        ..ScriptedRouter::accepting()
    };
    let h = Harness::new(router, false);

    let command = h.toggle.command(true);
    let observer = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        h.toggle.read()
    };

    let (result, seen_mid_flight) = tokio::join!(command, observer);
    result.unwrap();

    assert!(!seen_mid_flight);
    assert!(h.toggle.read());
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn stale_snapshot_does_not_flip_toggle() {
    let h = Harness::new(ScriptedRouter::accepting(), false);
    h.toggle.command(true).await.unwrap();

    let stale = DeviceSnapshot::new(vec![WanConnection::new(3, false)]);
    h.toggle.handle_snapshot(&stale).unwrap();

    let state = h.toggle.state();
    assert!(h.toggle.read());
    assert!(state.local_enabled());
    assert!(!state.last_known_remote());
    assert!(state.is_drifted());
    assert_eq!(h.publisher.drifts.load(Ordering::SeqCst), 1);
    assert_eq!(h.publisher.published.lock().len(), 1);
}

#[test]
fn reconcile_never_changes_visible_state() {
    let h = Harness::new(ScriptedRouter::accepting(), true);

    for remote in [false, false, true, false] {
        h.toggle.reconcile(remote);
        assert!(h.toggle.read());
        assert_eq!(h.toggle.state().last_known_remote(), remote);
    }
    assert_eq!(h.publisher.drifts.load(Ordering::SeqCst), 3);
    assert!(h.publisher.published.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn converges_once_router_catches_up() {
    let h = Harness::new(ScriptedRouter::accepting(), true);
    h.toggle.turn_off().await.unwrap();

    h.toggle.reconcile(true);
    assert!(h.toggle.state().is_drifted());

    h.toggle.reconcile(false);
    assert!(!h.toggle.state().is_drifted());
    assert!(!h.toggle.read());
}
