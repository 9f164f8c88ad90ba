//! Session orchestrator: one capture in, one committed result (or one
//! error) out.
//!
//! ```text
//! idle → awaiting_location → submitting → success | failed
//! ```
//!
//! Text queries skip the location step. Each run calls the gateway at most
//! once and never retries.

use std::sync::Arc;
use std::time::Duration;

use eco_core::entities::{ImpactStats, PickupConfirmation, PickupRequest, Redemption, Wallet};
use eco_core::enums::{CaptureKind, OverlapPolicy, SessionPhase};
use eco_core::identity::Registration;
use eco_core::{CaptureInput, Coordinate, CoreError, Identity};
use eco_gateway::{Gateway, GatewayError, ScanResponse};

use crate::error::SessionError;
use crate::store::{ScanRecord, SessionStore};

/// Notice shown while a run holds for the location fix.
pub const WAITING_FOR_LOCATION: &str = "waiting for location";

/// How one run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The result was committed to the store.
    Success(Arc<ScanRecord>),
    Failed(SessionError),
    /// The gateway answered, but a newer run had started; nothing committed.
    Superseded,
}

/// Phases visited by a run, and how it ended.
#[derive(Debug)]
pub struct RunReport {
    pub ticket: Option<u64>,
    pub kind: CaptureKind,
    pub phases: Vec<SessionPhase>,
    pub outcome: RunOutcome,
}

impl RunReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success(_))
    }

    #[must_use]
    pub const fn record(&self) -> Option<&Arc<ScanRecord>> {
        match &self.outcome {
            RunOutcome::Success(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&SessionError> {
        match &self.outcome {
            RunOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// The final phase reached.
    #[must_use]
    pub fn final_phase(&self) -> SessionPhase {
        self.phases.last().copied().unwrap_or_default()
    }
}

/// Records the phases of one run and rejects illegal transitions.
#[derive(Debug)]
struct PhaseTrail {
    phases: Vec<SessionPhase>,
}

impl PhaseTrail {
    fn new() -> Self {
        Self {
            phases: vec![SessionPhase::Idle],
        }
    }

    fn current(&self) -> SessionPhase {
        self.phases.last().copied().unwrap_or_default()
    }

    fn advance(&mut self, next: SessionPhase) -> Result<(), CoreError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                machine: "session".into(),
                from: current.as_str().into(),
                to: next.as_str().into(),
            });
        }
        tracing::debug!(from = current.as_str(), to = next.as_str(), "session phase");
        self.phases.push(next);
        Ok(())
    }
}

/// Releases the in-flight slot when a run ends, however it ends.
struct InFlight<'a> {
    store: &'a SessionStore,
    ticket: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.finish_capture(self.ticket);
    }
}

/// What a run submits.
enum Submission {
    Image(CaptureInput),
    Voice(CaptureInput),
    Text(String),
}

impl Submission {
    const fn kind(&self) -> CaptureKind {
        match self {
            Self::Image(_) => CaptureKind::Image,
            Self::Voice(_) => CaptureKind::Voice,
            Self::Text(_) => CaptureKind::Text,
        }
    }
}

#[derive(Debug)]
pub struct SessionOrchestrator<G> {
    gateway: Arc<G>,
    store: SessionStore,
    policy: OverlapPolicy,
    location_wait: Duration,
}

impl<G> Clone for SessionOrchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            store: self.store.clone(),
            policy: self.policy,
            location_wait: self.location_wait,
        }
    }
}

impl<G: Gateway> SessionOrchestrator<G> {
    #[must_use]
    pub const fn new(gateway: Arc<G>, store: SessionStore) -> Self {
        Self {
            gateway,
            store,
            policy: OverlapPolicy::Reject,
            location_wait: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upper bound on holding for a location fix that nobody is acquiring.
    /// Past it the run proceeds with the fallback coordinate.
    #[must_use]
    pub const fn with_location_wait(mut self, wait: Duration) -> Self {
        self.location_wait = wait;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Submit a captured image.
    pub async fn run_image(&self, image: CaptureInput) -> RunReport {
        self.run(Submission::Image(image)).await
    }

    /// Submit a recorded voice clip.
    pub async fn run_voice(&self, audio: CaptureInput) -> RunReport {
        self.run(Submission::Voice(audio)).await
    }

    /// Ask a text question. No location is needed.
    pub async fn run_text(&self, query: impl Into<String>) -> RunReport {
        self.run(Submission::Text(query.into())).await
    }

    async fn run(&self, submission: Submission) -> RunReport {
        let kind = submission.kind();
        let mut trail = PhaseTrail::new();

        let ticket = match self.store.begin_capture(self.policy) {
            Ok(ticket) => ticket,
            Err(error) => return Self::abort(kind, trail, error),
        };
        let _in_flight = InFlight {
            store: &self.store,
            ticket,
        };
        self.store.update_ui_for(ticket, |ui| {
            ui.phase = SessionPhase::Idle;
            ui.error = None;
            ui.notice = None;
            ui.loading = false;
        });

        let needs_location = kind != CaptureKind::Text;
        if needs_location {
            self.enter(&mut trail, ticket, SessionPhase::AwaitingLocation);
        }

        let Some(identity) = self.store.identity().filter(Identity::is_complete) else {
            tracing::warn!(ticket, "capture submitted without identity");
            return self.fail(ticket, kind, trail, SessionError::identity_required());
        };

        let coordinate = if needs_location {
            Some(self.await_location(ticket).await)
        } else {
            None
        };

        self.enter(&mut trail, ticket, SessionPhase::Submitting);
        self.store.update_ui_for(ticket, |ui| {
            ui.loading = true;
            ui.notice = None;
        });

        let language = self.store.language();
        let response: Result<ScanResponse, GatewayError> = match submission {
            Submission::Image(image) => {
                self.gateway
                    .submit_image_scan(image, &identity.id, coordinate, language)
                    .await
            }
            Submission::Voice(audio) => {
                self.gateway
                    .submit_voice_query(audio, &identity.id, coordinate, language)
                    .await
            }
            Submission::Text(query) => {
                self.gateway
                    .query_knowledge_base(&identity.id, &query, language)
                    .await
            }
        };

        match response {
            Ok(response) => match self.store.commit_scan(ticket, kind, response) {
                Some(record) => {
                    self.enter(&mut trail, ticket, SessionPhase::Success);
                    self.store.update_ui_for(ticket, |ui| ui.loading = false);
                    RunReport {
                        ticket: Some(ticket),
                        kind,
                        phases: trail.phases,
                        outcome: RunOutcome::Success(record),
                    }
                }
                None => {
                    let _ = trail.advance(SessionPhase::Success);
                    RunReport {
                        ticket: Some(ticket),
                        kind,
                        phases: trail.phases,
                        outcome: RunOutcome::Superseded,
                    }
                }
            },
            Err(error) => {
                let error = SessionError::from(error);
                tracing::warn!(ticket, kind = kind.as_str(), %error, "submission failed");
                self.fail(ticket, kind, trail, error)
            }
        }
    }

    /// Hold until the location is ready, bounded by `location_wait`.
    async fn await_location(&self, ticket: u64) -> Coordinate {
        if let Some(coordinate) = self.store.usable_location() {
            return coordinate;
        }
        self.store
            .update_ui_for(ticket, |ui| ui.notice = Some(WAITING_FOR_LOCATION.into()));
        tracing::debug!(ticket, "holding for location fix");
        self.store.location_within(self.location_wait).await
    }

    fn enter(&self, trail: &mut PhaseTrail, ticket: u64, phase: SessionPhase) {
        if let Err(error) = trail.advance(phase) {
            tracing::error!(%error, "illegal session transition");
            return;
        }
        self.store.update_ui_for(ticket, |ui| ui.phase = phase);
    }

    fn fail(
        &self,
        ticket: u64,
        kind: CaptureKind,
        mut trail: PhaseTrail,
        error: SessionError,
    ) -> RunReport {
        self.enter(&mut trail, ticket, SessionPhase::Failed);
        let message = error.user_message();
        self.store.update_ui_for(ticket, |ui| {
            ui.loading = false;
            ui.notice = None;
            ui.error = Some(message);
        });
        RunReport {
            ticket: Some(ticket),
            kind,
            phases: trail.phases,
            outcome: RunOutcome::Failed(error),
        }
    }

    /// End a run that never obtained a ticket. The UI belongs to the run in
    /// flight and is left alone.
    fn abort(kind: CaptureKind, mut trail: PhaseTrail, error: SessionError) -> RunReport {
        let _ = trail.advance(SessionPhase::Failed);
        RunReport {
            ticket: None,
            kind,
            phases: trail.phases,
            outcome: RunOutcome::Failed(error),
        }
    }

    fn require_identity(&self) -> Result<Identity, SessionError> {
        self.store
            .identity()
            .filter(Identity::is_complete)
            .ok_or_else(SessionError::identity_required)
    }

    // ── Account operations ─────────────────────────────────────────

    /// Redeem a code. On success the cached balance grows by the award; on
    /// failure it is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCode`] for unknown or used codes.
    pub async fn redeem(&self, code: &str) -> Result<Redemption, SessionError> {
        let identity = self.require_identity()?;
        let redemption = self.gateway.redeem_code(&identity.id, code).await?;
        self.store.credit_tokens(redemption.tokens_awarded);
        tracing::debug!(code = %redemption.code, awarded = redemption.tokens_awarded, "code redeemed");
        Ok(redemption)
    }

    /// Fetch impact statistics and refresh the cached balance.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for a missing identity or a failed request.
    pub async fn impact(&self) -> Result<ImpactStats, SessionError> {
        let identity = self.require_identity()?;
        let stats = self.gateway.get_impact_summary(&identity.id).await?;
        self.store.set_token_balance(stats.tokens_balance);
        Ok(stats)
    }

    /// Fetch the wallet and refresh the cached balance.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for a missing identity or a failed request.
    pub async fn wallet(&self) -> Result<Wallet, SessionError> {
        let identity = self.require_identity()?;
        let wallet = self.gateway.get_wallet(&identity.id).await?;
        self.store.set_token_balance(wallet.balance);
        Ok(wallet)
    }

    /// Schedule a pickup for the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for a missing identity or a failed request.
    pub async fn schedule_pickup(
        &self,
        mut request: PickupRequest,
    ) -> Result<PickupConfirmation, SessionError> {
        let identity = self.require_identity()?;
        request.identity_id = identity.id;
        if request.scan_id.is_none()
            && let Some(record) = self.store.current_scan()
        {
            request.scan_id.clone_from(&record.result.scan_id);
            if request.material.is_none() {
                request.material = Some(record.result.material.clone());
            }
        }
        Ok(self.gateway.schedule_pickup(&request).await?)
    }

    /// Register a new user and make them the session identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backend rejects the registration.
    pub async fn register(&self, registration: &Registration) -> Result<Identity, SessionError> {
        let registered = self.gateway.register_user(registration).await?;
        let identity = Identity::new(
            registered.id,
            registration.display_name.trim(),
            registered.contact,
        );
        self.store.set_identity(identity.clone());
        self.store.set_language(registration.language);
        self.store.set_token_balance(0);
        Ok(identity)
    }

    /// Look up a user by id and make them the session identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the profile cannot be fetched.
    pub async fn sign_in(&self, identity_id: &str) -> Result<Identity, SessionError> {
        let identity = self.gateway.get_user_profile(identity_id).await?;
        self.store.set_identity(identity.clone());
        Ok(identity)
    }
}
