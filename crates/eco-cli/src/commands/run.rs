use std::future::Future;
use std::sync::Arc;

use eco_core::enums::{CaptureKind, SessionPhase};
use eco_session::presentation::{self, RecyclerLine, ResultView};
use eco_session::{RunOutcome, RunReport, ScanRecord, SessionUiState};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::{AppContext, describe_location};
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct RunResponse {
    ticket: Option<u64>,
    phases: Vec<SessionPhase>,
    location: String,
    result: ResultView,
    #[serde(skip_serializing_if = "Option::is_none")]
    nearby: Option<NearbySection>,
}

#[derive(Serialize)]
struct NearbySection {
    material: String,
    recyclers: Vec<RecyclerLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Await a session run while a spinner mirrors the session UI state.
pub async fn drive<F>(ctx: &AppContext, label: &str, run: F) -> RunReport
where
    F: Future<Output = RunReport>,
{
    let spinner = Progress::spinner(label);
    let mut ui = ctx.store.subscribe_ui();
    let watcher = {
        let spinner = spinner.clone();
        tokio::spawn(async move {
            while ui.changed().await.is_ok() {
                let state = ui.borrow_and_update().clone();
                if let Some(line) = status_line(&state) {
                    spinner.set_message(&line);
                }
            }
        })
    };

    let report = run.await;
    watcher.abort();

    match &report.outcome {
        RunOutcome::Failed(error) => spinner.finish_err(&error.user_message()),
        RunOutcome::Success(_) | RunOutcome::Superseded => spinner.finish_clear(),
    }
    report
}

fn status_line(state: &SessionUiState) -> Option<String> {
    if let Some(notice) = &state.notice {
        return Some(notice.clone());
    }
    match state.phase {
        SessionPhase::AwaitingLocation => Some("locating".into()),
        SessionPhase::Submitting => Some("analyzing".into()),
        _ => None,
    }
}

/// Print a finished run, optionally followed by the recycler lookup for its
/// material. Failed and superseded runs become errors.
pub async fn finish(
    report: RunReport,
    ctx: &AppContext,
    flags: &GlobalFlags,
    with_nearby: bool,
) -> anyhow::Result<()> {
    let RunReport {
        ticket,
        kind,
        phases,
        outcome,
    } = report;

    let record = match outcome {
        RunOutcome::Success(record) => record,
        RunOutcome::Failed(error) => {
            return Err(anyhow::Error::new(error).context(format!("{} failed", label(kind))));
        }
        RunOutcome::Superseded => {
            anyhow::bail!("{} was replaced by a newer capture", label(kind));
        }
    };

    let nearby = if with_nearby {
        Some(nearby_section(ctx, &record).await)
    } else {
        None
    };

    output(
        &RunResponse {
            ticket,
            phases,
            location: describe_location(&ctx.store.location(), ctx.store.fallback()),
            result: ResultView::from_record(&record),
            nearby,
        },
        flags.format,
    )
}

async fn nearby_section(ctx: &AppContext, record: &Arc<ScanRecord>) -> NearbySection {
    let loaded = presentation::load_nearby(
        ctx.gateway(),
        &ctx.store,
        None,
        Some(ctx.config.general.default_weight_kg),
        ctx.location_wait(),
    )
    .await;

    match loaded {
        Ok(nearby) => NearbySection {
            material: nearby.material.clone(),
            recyclers: nearby
                .recyclers
                .iter()
                .take(presentation::TOP_RECYCLERS)
                .map(RecyclerLine::from)
                .collect(),
            error: None,
        },
        // The primary result stands; only the secondary section reports the failure.
        Err(error) => NearbySection {
            material: record.result.material.clone(),
            recyclers: Vec::new(),
            error: Some(error.user_message()),
        },
    }
}

const fn label(kind: CaptureKind) -> &'static str {
    match kind {
        CaptureKind::Image => "image scan",
        CaptureKind::Voice => "voice query",
        CaptureKind::Text => "question",
    }
}

#[cfg(test)]
mod tests {
    use eco_core::enums::SessionPhase;
    use eco_session::SessionUiState;

    use super::status_line;

    #[test]
    fn notice_wins_over_phase() {
        let state = SessionUiState {
            phase: SessionPhase::AwaitingLocation,
            notice: Some("waiting for location".into()),
            ..SessionUiState::default()
        };
        assert_eq!(status_line(&state).as_deref(), Some("waiting for location"));
    }

    #[test]
    fn submitting_shows_analyzing() {
        let state = SessionUiState {
            phase: SessionPhase::Submitting,
            loading: true,
            ..SessionUiState::default()
        };
        assert_eq!(status_line(&state).as_deref(), Some("analyzing"));
        assert_eq!(status_line(&SessionUiState::default()), None);
    }
}
