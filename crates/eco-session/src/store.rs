//! The session state store.
//!
//! One owned context object per session, cloned cheaply into every component
//! that needs it. All mutation goes through setters that replace whole
//! entities, so readers always observe a consistent value.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use eco_core::entities::{KnowledgeSnippet, RecyclerCandidate, ScanResult};
use eco_core::enums::{CaptureKind, Language, OverlapPolicy, SessionPhase};
use eco_core::{Coordinate, Identity, LocationFix};
use eco_gateway::ScanResponse;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::SessionError;
use crate::persist::PersistedState;

/// Default number of completed scans kept in the in-memory history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A committed scan: the result slot's contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    /// Request id of the run that produced this record.
    pub ticket: u64,
    pub kind: CaptureKind,
    pub result: ScanResult,
    pub snippets: Vec<KnowledgeSnippet>,
    pub captured_at: DateTime<Utc>,
}

/// Recyclers fetched for a specific scan record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyRecyclers {
    pub ticket: u64,
    pub material: String,
    pub center: Coordinate,
    pub recyclers: Vec<RecyclerCandidate>,
}

/// What the capture view renders: phase, spinner, banner, notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionUiState {
    pub phase: SessionPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub is_recording: bool,
}

#[derive(Debug, Default)]
struct Slots {
    identity: Option<Identity>,
    language: Language,
    current: Option<Arc<ScanRecord>>,
    nearby: Option<Arc<NearbyRecyclers>>,
    token_balance: Option<u64>,
    history: VecDeque<Arc<ScanRecord>>,
    in_flight: Option<u64>,
    fallback: Option<Coordinate>,
}

#[derive(Debug)]
struct Inner {
    slots: Mutex<Slots>,
    location: watch::Sender<LocationFix>,
    ui: watch::Sender<SessionUiState>,
    last_ticket: AtomicU64,
    history_limit: usize,
}

/// Shared, cheaply clonable session context.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots::default()),
                location: watch::Sender::new(LocationFix::pending()),
                ui: watch::Sender::new(SessionUiState::default()),
                last_ticket: AtomicU64::new(0),
                history_limit,
            }),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        // Slots hold plain values; a panic mid-update cannot leave them torn.
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Identity & language ────────────────────────────────────────

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.slots().identity.clone()
    }

    pub fn set_identity(&self, identity: Identity) {
        tracing::debug!(identity = %identity.id, "identity replaced");
        self.slots().identity = Some(identity);
    }

    /// Forget the identity and its cached balance.
    pub fn clear_identity(&self) {
        let mut slots = self.slots();
        slots.identity = None;
        slots.token_balance = None;
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.slots().language
    }

    pub fn set_language(&self, language: Language) {
        self.slots().language = language;
    }

    // ── Location ───────────────────────────────────────────────────

    #[must_use]
    pub fn location(&self) -> LocationFix {
        self.inner.location.borrow().clone()
    }

    pub fn set_location(&self, fix: LocationFix) {
        tracing::debug!(readiness = ?fix.readiness, diagnostic = ?fix.diagnostic, "location replaced");
        self.inner.location.send_replace(fix);
    }

    #[must_use]
    pub fn subscribe_location(&self) -> watch::Receiver<LocationFix> {
        self.inner.location.subscribe()
    }

    /// Coordinate substituted whenever no real fix is available.
    #[must_use]
    pub fn fallback(&self) -> Coordinate {
        self.slots().fallback.unwrap_or(Coordinate::FALLBACK)
    }

    pub fn set_fallback(&self, coordinate: Coordinate) {
        self.slots().fallback = Some(coordinate);
    }

    /// The current fix resolved against the configured fallback.
    #[must_use]
    pub fn usable_location(&self) -> Option<Coordinate> {
        let fallback = self.fallback();
        self.inner.location.borrow().usable_or(fallback)
    }

    /// Wait until the location is no longer pending and return the usable
    /// coordinate.
    pub async fn wait_for_location(&self) -> Coordinate {
        let fallback = self.fallback();
        let mut rx = self.subscribe_location();
        let usable = match rx.wait_for(|fix| !fix.is_pending()).await {
            Ok(fix) => fix.usable_or(fallback),
            Err(_) => None,
        };
        usable.unwrap_or(fallback)
    }

    /// Wait at most `wait` for a usable coordinate.
    ///
    /// When the fix is still pending after `wait`, the fallback is installed
    /// with reason `timeout` and returned.
    pub async fn location_within(&self, wait: Duration) -> Coordinate {
        if let Some(coordinate) = self.usable_location() {
            return coordinate;
        }
        if let Ok(coordinate) = tokio::time::timeout(wait, self.wait_for_location()).await {
            return coordinate;
        }
        let fallback = self.fallback();
        tracing::warn!(%fallback, "no location fix arrived; using fallback coordinate");
        self.set_location(LocationFix::fallback(fallback, "timeout"));
        fallback
    }

    // ── Tickets & in-flight guard ──────────────────────────────────

    /// Issue a new, strictly increasing request id.
    pub fn next_ticket(&self) -> u64 {
        let _slots = self.slots();
        self.issue_ticket()
    }

    /// Callers hold the slots lock, which orders issuing against commits.
    fn issue_ticket(&self) -> u64 {
        self.inner.last_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn latest_ticket(&self) -> u64 {
        self.inner.last_ticket.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket() == ticket
    }

    /// Claim the single in-flight slot for a new capture.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] under [`OverlapPolicy::Reject`] while
    /// another capture is in flight.
    pub fn begin_capture(&self, policy: OverlapPolicy) -> Result<u64, SessionError> {
        let mut slots = self.slots();
        if let Some(active) = slots.in_flight {
            match policy {
                OverlapPolicy::Reject => {
                    tracing::warn!(active, "capture rejected while another is in flight");
                    return Err(SessionError::Busy);
                }
                OverlapPolicy::Supersede => {
                    tracing::debug!(active, "superseding in-flight capture");
                }
            }
        }
        let ticket = self.issue_ticket();
        slots.in_flight = Some(ticket);
        drop(slots);
        Ok(ticket)
    }

    /// Release the in-flight slot if `ticket` still holds it.
    pub fn finish_capture(&self, ticket: u64) {
        let mut slots = self.slots();
        if slots.in_flight == Some(ticket) {
            slots.in_flight = None;
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<u64> {
        self.slots().in_flight
    }

    // ── Result slot ────────────────────────────────────────────────

    #[must_use]
    pub fn current_scan(&self) -> Option<Arc<ScanRecord>> {
        self.slots().current.clone()
    }

    /// Replace the result slot with the response of run `ticket`.
    ///
    /// Returns `None` without touching the slot when a newer ticket has been
    /// issued since. The replacement is whole: nothing of the previous record
    /// survives, and the nearby list keyed to it is dropped.
    pub fn commit_scan(
        &self,
        ticket: u64,
        kind: CaptureKind,
        response: ScanResponse,
    ) -> Option<Arc<ScanRecord>> {
        let mut slots = self.slots();
        // Tickets are issued under this lock, so the check holds until the write.
        let latest = self.latest_ticket();
        if ticket < latest {
            drop(slots);
            tracing::debug!(ticket, latest, "stale result discarded");
            return None;
        }
        let record = Arc::new(ScanRecord {
            ticket,
            kind,
            result: response.result,
            snippets: response.snippets,
            captured_at: Utc::now(),
        });
        slots.current = Some(Arc::clone(&record));
        slots.nearby = None;
        slots.history.push_front(Arc::clone(&record));
        slots.history.truncate(self.inner.history_limit);
        drop(slots);
        tracing::debug!(ticket, material = %record.result.material, "scan committed");
        Some(record)
    }

    /// Completed scans, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<Arc<ScanRecord>> {
        self.slots().history.iter().cloned().collect()
    }

    #[must_use]
    pub fn nearby(&self) -> Option<Arc<NearbyRecyclers>> {
        self.slots().nearby.clone()
    }

    /// Store recyclers fetched for the record with `nearby.ticket`. Ignored
    /// when that record is no longer current.
    pub fn set_nearby(&self, nearby: NearbyRecyclers) -> bool {
        let mut slots = self.slots();
        let current_ticket = slots.current.as_ref().map_or(0, |record| record.ticket);
        if current_ticket != nearby.ticket {
            return false;
        }
        slots.nearby = Some(Arc::new(nearby));
        true
    }

    // ── Tokens ─────────────────────────────────────────────────────

    #[must_use]
    pub fn token_balance(&self) -> Option<u64> {
        self.slots().token_balance
    }

    pub fn set_token_balance(&self, balance: u64) {
        self.slots().token_balance = Some(balance);
    }

    /// Add awarded tokens to the cached balance, if one is known.
    pub fn credit_tokens(&self, awarded: u64) {
        let mut slots = self.slots();
        if let Some(balance) = slots.token_balance.as_mut() {
            *balance = balance.saturating_add(awarded);
        }
    }

    // ── UI state ───────────────────────────────────────────────────

    #[must_use]
    pub fn ui(&self) -> SessionUiState {
        self.inner.ui.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_ui(&self) -> watch::Receiver<SessionUiState> {
        self.inner.ui.subscribe()
    }

    /// Apply `update` to the UI state unconditionally.
    pub fn update_ui(&self, update: impl FnOnce(&mut SessionUiState)) {
        self.inner.ui.send_modify(update);
    }

    /// Apply `update` only while `ticket` is the newest run, so a superseded
    /// run cannot overwrite the banner of the run that replaced it.
    pub fn update_ui_for(&self, ticket: u64, update: impl FnOnce(&mut SessionUiState)) {
        if self.is_latest(ticket) {
            self.update_ui(update);
        }
    }

    pub fn set_recording(&self, is_recording: bool) {
        self.update_ui(|ui| ui.is_recording = is_recording);
    }

    // ── Persistence ────────────────────────────────────────────────

    /// The persistable subset of the session.
    #[must_use]
    pub fn snapshot(&self) -> PersistedState {
        let slots = self.slots();
        PersistedState {
            identity: slots.identity.clone(),
            language: slots.language,
            token_balance: slots.token_balance,
            saved_at: Some(Utc::now()),
            ..PersistedState::default()
        }
    }

    /// Load identity, language and balance from a persisted snapshot.
    pub fn restore(&self, state: PersistedState) {
        let mut slots = self.slots();
        slots.identity = state.identity.filter(Identity::is_complete);
        slots.language = state.language;
        slots.token_balance = state.token_balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::Readiness;
    use pretty_assertions::assert_eq;

    fn response(material: &str) -> ScanResponse {
        ScanResponse {
            result: ScanResult {
                material: material.into(),
                ..ScanResult::default()
            },
            snippets: Vec::new(),
        }
    }

    #[test]
    fn tickets_increase() {
        let store = SessionStore::default();
        let a = store.next_ticket();
        let b = store.next_ticket();
        assert!(b > a);
        assert_eq!(store.latest_ticket(), b);
    }

    #[test]
    fn stale_ticket_cannot_commit() {
        let store = SessionStore::default();
        let old = store.next_ticket();
        let new = store.next_ticket();
        assert!(store.commit_scan(new, CaptureKind::Image, response("Glass")).is_some());
        assert!(store.commit_scan(old, CaptureKind::Image, response("Metal")).is_none());
        assert_eq!(store.current_scan().unwrap().result.material, "Glass");
    }

    #[test]
    fn commit_racing_a_newer_ticket_never_wins() {
        let store = SessionStore::default();
        for _ in 0..200 {
            let old = store.next_ticket();
            let racer = {
                let store = store.clone();
                std::thread::spawn(move || {
                    let new = store.next_ticket();
                    store.commit_scan(new, CaptureKind::Image, response("Glass"));
                    new
                })
            };
            store.commit_scan(old, CaptureKind::Image, response("Metal"));
            let new = racer.join().unwrap();
            let current = store.current_scan().unwrap();
            assert_eq!(current.ticket, new);
            assert_eq!(current.result.material, "Glass");
        }
    }

    #[test]
    fn configured_fallback_replaces_builtin_point() {
        let store = SessionStore::default();
        assert_eq!(store.fallback(), Coordinate::FALLBACK);
        let home = Coordinate::new(12.9716, 77.5946);
        store.set_fallback(home);
        store.set_location(LocationFix::unavailable("permission denied"));
        assert_eq!(store.usable_location(), Some(home));
    }

    #[tokio::test(start_paused = true)]
    async fn location_within_installs_timeout_fallback() {
        let store = SessionStore::default();
        let home = Coordinate::new(12.9716, 77.5946);
        store.set_fallback(home);
        let center = store.location_within(Duration::from_secs(3)).await;
        assert_eq!(center, home);
        let fix = store.location();
        assert_eq!(fix.readiness, Readiness::Ready);
        assert_eq!(fix.diagnostic.as_deref(), Some("timeout"));
        assert_eq!(fix.coordinate, Some(home));
    }

    #[test]
    fn reject_policy_refuses_overlap() {
        let store = SessionStore::default();
        let first = store.begin_capture(OverlapPolicy::Reject).unwrap();
        assert!(matches!(
            store.begin_capture(OverlapPolicy::Reject),
            Err(SessionError::Busy)
        ));
        store.finish_capture(first);
        assert!(store.begin_capture(OverlapPolicy::Reject).is_ok());
    }

    #[test]
    fn supersede_policy_takes_over_slot() {
        let store = SessionStore::default();
        let first = store.begin_capture(OverlapPolicy::Supersede).unwrap();
        let second = store.begin_capture(OverlapPolicy::Supersede).unwrap();
        store.finish_capture(first);
        assert_eq!(store.in_flight(), Some(second));
    }

    #[test]
    fn history_is_bounded_newest_first() {
        let store = SessionStore::new(2);
        for material in ["Paper", "Glass", "Metal"] {
            let ticket = store.next_ticket();
            store.commit_scan(ticket, CaptureKind::Image, response(material));
        }
        let materials: Vec<String> = store
            .history()
            .iter()
            .map(|record| record.result.material.clone())
            .collect();
        assert_eq!(materials, ["Metal", "Glass"]);
    }

    #[test]
    fn nearby_for_stale_record_is_ignored() {
        let store = SessionStore::default();
        let ticket = store.next_ticket();
        store.commit_scan(ticket, CaptureKind::Image, response("Plastic"));
        let stale = NearbyRecyclers {
            ticket: ticket + 7,
            material: "Plastic".into(),
            center: Coordinate::FALLBACK,
            recyclers: Vec::new(),
        };
        assert!(!store.set_nearby(stale));
        assert!(store.nearby().is_none());
    }

    #[test]
    fn credit_tokens_requires_known_balance() {
        let store = SessionStore::default();
        store.credit_tokens(10);
        assert_eq!(store.token_balance(), None);
        store.set_token_balance(5);
        store.credit_tokens(10);
        assert_eq!(store.token_balance(), Some(15));
    }

    #[test]
    fn snapshot_restore_cycle() {
        let store = SessionStore::default();
        store.set_identity(Identity::new("u1", "Asha", "+91"));
        store.set_language(Language::Hi);
        store.set_token_balance(42);

        let restored = SessionStore::default();
        restored.restore(store.snapshot());
        assert_eq!(restored.identity(), store.identity());
        assert_eq!(restored.language(), Language::Hi);
        assert_eq!(restored.token_balance(), Some(42));
    }

    #[tokio::test]
    async fn wait_for_location_resolves_after_fix() {
        let store = SessionStore::default();
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_for_location().await })
        };
        tokio::task::yield_now().await;
        store.set_location(LocationFix::live(Coordinate::new(19.076, 72.8777)));
        assert_eq!(waiter.await.unwrap(), Coordinate::new(19.076, 72.8777));
        assert_eq!(store.location().readiness, Readiness::Ready);
    }
}
