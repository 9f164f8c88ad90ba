use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use eco_config::EcoConfig;
use eco_core::enums::Language;
use eco_core::{Coordinate, LocationFix};
use eco_gateway::GatewayClient;
use eco_session::location::{FixedLocation, GeolocationProvider, LocationSource, NoLocation};
use eco_session::persist::{self, PersistedState};
use eco_session::{SessionOrchestrator, SessionStore};
use tokio::task::JoinHandle;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: EcoConfig,
    pub store: SessionStore,
    pub orchestrator: SessionOrchestrator<GatewayClient>,
    /// Set while `ecosort shell` owns stdin; commands must not prompt.
    pub in_shell: bool,
    state_path: Option<PathBuf>,
    saved_language: Language,
    locator: Option<JoinHandle<LocationFix>>,
}

impl AppContext {
    /// Build the gateway and session, restore saved state, and start
    /// acquiring a location in the background.
    pub fn init(config: EcoConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let gateway = GatewayClient::new(
            config.backend.normalized_base_url(),
            Duration::from_secs(config.backend.timeout_secs),
            &config.backend.user_agent,
        )
        .context("failed to build backend client")?;

        let store = SessionStore::new(config.session.history_limit);
        store.set_fallback(config.location.fallback());
        let state_path = if flags.no_persist || !config.session.persist {
            None
        } else {
            config.session.state_path()
        };

        let saved = state_path
            .as_deref()
            .map(load_state)
            .unwrap_or_default();
        let saved_language = if saved.saved_at.is_some() {
            saved.language
        } else {
            config.general.language
        };
        store.restore(saved);
        store.set_language(saved_language);
        if store.identity().is_none()
            && let Some(identity) = config.identity.seed()
        {
            tracing::debug!(id = %identity.id, "identity seeded from config");
            store.set_identity(identity);
        }
        if let Some(language) = flags.lang {
            store.set_language(language);
        }

        let location_timeout = Duration::from_millis(config.location.timeout_ms);
        let fixed = flags.location.or_else(|| config.location.fixed());
        let locator = match fixed {
            Some(coordinate) => spawn_locator(FixedLocation(coordinate), &config, store.clone()),
            None => spawn_locator(NoLocation, &config, store.clone()),
        };

        let orchestrator = SessionOrchestrator::new(Arc::new(gateway), store.clone())
            .with_policy(config.session.overlap)
            .with_location_wait(location_timeout * 2);

        Ok(Self {
            config,
            store,
            orchestrator,
            in_shell: false,
            state_path,
            saved_language,
            locator: Some(locator),
        })
    }

    pub fn gateway(&self) -> &GatewayClient {
        self.orchestrator.gateway()
    }

    /// How long secondary lookups hold for a pending location.
    pub fn location_wait(&self) -> Duration {
        Duration::from_millis(self.config.location.timeout_ms) * 2
    }

    pub const fn saved_language(&self) -> Language {
        self.saved_language
    }

    pub const fn persistence_enabled(&self) -> bool {
        self.state_path.is_some()
    }

    /// Change the language that is saved, and use it for the rest of the run.
    pub fn set_saved_language(&mut self, language: Language) {
        self.saved_language = language;
        self.store.set_language(language);
    }

    /// Write identity, saved language and token balance to disk.
    ///
    /// A `--lang` override is never written.
    pub fn save_state(&self) -> anyhow::Result<()> {
        let Some(path) = &self.state_path else {
            tracing::debug!("persistence disabled; state not saved");
            return Ok(());
        };
        let mut state = self.store.snapshot();
        state.language = self.saved_language;
        persist::save(path, &state)
            .with_context(|| format!("failed to save session state to {}", path.display()))
    }

    /// Remove the saved state file.
    pub fn clear_state(&self) -> anyhow::Result<()> {
        let Some(path) = &self.state_path else {
            return Ok(());
        };
        persist::clear(path)
            .with_context(|| format!("failed to remove session state at {}", path.display()))
    }

    /// Stop the background location task if it is still running.
    pub fn shutdown(&mut self) {
        if let Some(locator) = self.locator.take()
            && !locator.is_finished()
        {
            locator.abort();
        }
    }
}

fn spawn_locator<S>(source: S, config: &EcoConfig, store: SessionStore) -> JoinHandle<LocationFix>
where
    S: LocationSource + 'static,
{
    GeolocationProvider::new(source)
        .with_timeout(Duration::from_millis(config.location.timeout_ms))
        .with_high_accuracy(config.location.high_accuracy)
        .with_fallback(config.location.fallback())
        .spawn(store)
}

/// Saved state that cannot be read is reported and replaced by defaults.
fn load_state(path: &Path) -> PersistedState {
    persist::load(path).unwrap_or_else(|error| {
        tracing::warn!(%error, path = %path.display(), "ignoring unreadable session state");
        PersistedState::default()
    })
}

/// Format a location fix for display, resolving missing coordinates to
/// `fallback`.
pub fn describe_location(fix: &LocationFix, fallback: Coordinate) -> String {
    match (fix.usable_or(fallback), &fix.diagnostic) {
        (None, _) => "pending".to_string(),
        (Some(coordinate), Some(reason)) => format!("{coordinate} (fallback: {reason})"),
        (Some(coordinate), None) if fix.is_fallback() => format!("{coordinate} (fallback)"),
        (Some(coordinate), None) => coordinate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use eco_core::Identity;
    use eco_session::persist;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn flags(no_persist: bool, lang: Option<Language>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            color: ColorMode::Never,
            quiet: true,
            lang,
            location: Some(Coordinate::new(19.076, 72.8777)),
            no_persist,
            env_file: None,
        }
    }

    fn config_with_state(path: &Path) -> EcoConfig {
        let mut config = EcoConfig::default();
        config.session.state_path = path.display().to_string();
        config
    }

    #[tokio::test]
    async fn restores_saved_state_and_keeps_lang_override_unsaved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let saved = PersistedState {
            identity: Some(Identity::new("user-7", "Asha", "+911234567890")),
            language: Language::Hi,
            token_balance: Some(40),
            saved_at: Some(chrono::Utc::now()),
            ..PersistedState::default()
        };
        persist::save(&path, &saved).expect("seed state");

        let mut ctx = AppContext::init(config_with_state(&path), &flags(false, Some(Language::En)))
            .expect("context");
        assert_eq!(ctx.store.identity().map(|i| i.id), Some("user-7".to_string()));
        assert_eq!(ctx.store.language(), Language::En);
        assert_eq!(ctx.saved_language(), Language::Hi);
        assert_eq!(ctx.store.token_balance(), Some(40));

        ctx.store.set_token_balance(55);
        ctx.save_state().expect("save");
        ctx.shutdown();

        let reloaded = persist::load(&path).expect("reload");
        assert_eq!(reloaded.language, Language::Hi);
        assert_eq!(reloaded.token_balance, Some(55));
    }

    #[tokio::test]
    async fn no_persist_never_touches_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let mut ctx = AppContext::init(config_with_state(&path), &flags(true, None)).expect("context");
        assert!(!ctx.persistence_enabled());
        ctx.store
            .set_identity(Identity::new("user-1", "Ravi", "ravi@example.org"));
        ctx.save_state().expect("save is a no-op");
        ctx.shutdown();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn config_identity_seeds_an_empty_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_state(&dir.path().join("state.json"));
        config.identity.id = "cfg-user".into();
        config.identity.display_name = "Config User".into();

        let mut ctx = AppContext::init(config, &flags(false, None)).expect("context");
        assert_eq!(
            ctx.store.identity().map(|i| i.display_name),
            Some("Config User".to_string())
        );
        ctx.shutdown();
    }

    #[tokio::test]
    async fn fixed_location_flag_becomes_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut ctx = AppContext::init(
            config_with_state(&dir.path().join("state.json")),
            &flags(true, None),
        )
        .expect("context");

        let coordinate = ctx.store.wait_for_location().await;
        assert_eq!(coordinate, Coordinate::new(19.076, 72.8777));
        ctx.shutdown();
    }

    #[tokio::test]
    async fn configured_fallback_reaches_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config_with_state(&dir.path().join("state.json"));
        config.location.fallback_latitude = 12.9716;
        config.location.fallback_longitude = 77.5946;

        let mut ctx = AppContext::init(config, &flags(true, None)).expect("context");
        assert_eq!(ctx.store.fallback(), Coordinate::new(12.9716, 77.5946));
        ctx.shutdown();
    }

    #[test]
    fn describes_pending_and_fallback_fixes() {
        let home = Coordinate::new(12.9716, 77.5946);
        assert_eq!(describe_location(&LocationFix::pending(), home), "pending");
        assert_eq!(
            describe_location(&LocationFix::fallback(Coordinate::FALLBACK, "timeout"), home),
            "28.6139,77.2090 (fallback: timeout)"
        );
        assert_eq!(
            describe_location(&LocationFix::unavailable("denied"), home),
            "12.9716,77.5946 (fallback)"
        );
        assert_eq!(
            describe_location(&LocationFix::live(Coordinate::new(19.076, 72.8777)), home),
            "19.0760,72.8777"
        );
    }
}
