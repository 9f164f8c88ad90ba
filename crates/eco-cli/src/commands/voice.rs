use std::time::Duration;

use anyhow::Context;
use eco_core::CaptureInput;
use eco_session::capture::{FileMicrophone, Microphone, VoiceRecorder};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::VoiceArgs;
use crate::commands::{prompt, run};
use crate::context::AppContext;
use crate::progress::Progress;
use crate::ui;

const TICK: Duration = Duration::from_millis(100);

/// Handle `ecosort voice`.
pub async fn handle(args: &VoiceArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let max_duration = Duration::from_secs(
        args.max_secs
            .unwrap_or(ctx.config.session.max_recording_secs)
            .max(1),
    );
    let stop_on_enter = !ctx.in_shell && ui::prefs().interactive;

    let mut recorder =
        VoiceRecorder::new(FileMicrophone::new(&args.audio)).with_max_duration(max_duration);
    recorder
        .start()
        .with_context(|| format!("failed to open {}", args.audio.display()))?;
    ctx.store.set_recording(true);

    let message = if stop_on_enter {
        "recording, press Enter to stop"
    } else {
        "recording"
    };
    let spinner = Progress::spinner(message);
    let clip = record(&mut recorder, stop_on_enter).await;
    ctx.store.set_recording(false);
    spinner.finish_clear();
    let clip = clip.context("recording failed")?;

    let report = run::drive(ctx, "analyzing voice query", ctx.orchestrator.run_voice(clip)).await;
    run::finish(report, ctx, flags, args.nearby).await
}

/// Record until Enter is pressed or the recorder reaches its cap.
async fn record<M: Microphone>(
    recorder: &mut VoiceRecorder<M>,
    stop_on_enter: bool,
) -> anyhow::Result<CaptureInput> {
    let enter = async {
        if stop_on_enter {
            prompt::wait_for_enter().await
        } else {
            std::future::pending().await
        }
    };
    tokio::pin!(enter);
    let mut ticker = tokio::time::interval(TICK);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(clip) = recorder.tick()? {
                    return Ok(clip);
                }
            }
            entered = &mut enter => {
                entered?;
                return Ok(recorder.stop()?);
            }
        }
    }
}
