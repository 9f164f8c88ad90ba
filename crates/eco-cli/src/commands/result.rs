use eco_core::enums::CaptureKind;
use eco_session::presentation::{ResultView, percent};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ResultResponse {
    current: Option<ResultView>,
    history: Vec<HistoryRow>,
}

#[derive(Serialize)]
struct HistoryRow {
    ticket: u64,
    kind: CaptureKind,
    material: String,
    confidence: String,
    captured_at: String,
}

/// Handle `ecosort result`.
///
/// Results live only as long as the session, so outside `ecosort shell`
/// this reports nothing.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = ctx
        .store
        .history()
        .iter()
        .map(|record| HistoryRow {
            ticket: record.ticket,
            kind: record.kind,
            material: record.result.material.clone(),
            confidence: percent(record.result.confidence),
            captured_at: record
                .captured_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
        .collect();

    output(
        &ResultResponse {
            current: ResultView::from_store(&ctx.store),
            history,
        },
        flags.format,
    )
}
