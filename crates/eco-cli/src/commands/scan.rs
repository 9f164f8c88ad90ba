use anyhow::Context;
use eco_session::capture::{CameraCapture, image_from_path};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScanArgs;
use crate::commands::{prompt, run};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ScanDiscardedResponse {
    submitted: bool,
    image: String,
}

/// Handle `ecosort scan`.
pub async fn handle(args: &ScanArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let image = image_from_path(&args.image)
        .with_context(|| format!("failed to read image {}", args.image.display()))?;

    let mut camera = if args.preview {
        if ctx.in_shell {
            anyhow::bail!("--preview needs the terminal; run it outside `ecosort shell`");
        }
        CameraCapture::with_preview()
    } else {
        CameraCapture::direct()
    };

    let image = match camera.complete(image)? {
        Some(image) => image,
        None => {
            let question = format!(
                "Submit {} ({} KiB)?",
                args.image.display(),
                camera.pending().map_or(0, |image| image.len().div_ceil(1024))
            );
            if prompt::confirm(&question, true).await? {
                camera.confirm()?
            } else {
                camera.retake()?;
                return output(
                    &ScanDiscardedResponse {
                        submitted: false,
                        image: args.image.display().to_string(),
                    },
                    flags.format,
                );
            }
        }
    };

    let report = run::drive(ctx, "analyzing image", ctx.orchestrator.run_image(image)).await;
    run::finish(report, ctx, flags, args.nearby).await
}
