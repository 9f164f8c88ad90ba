use eco_core::enums::Language;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LangArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LangResponse {
    language: Language,
    saved: bool,
}

/// Handle `ecosort lang`.
pub fn handle(args: &LangArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(language) = args.language else {
        return output(
            &LangResponse {
                language: ctx.saved_language(),
                saved: ctx.persistence_enabled(),
            },
            flags.format,
        );
    };

    ctx.set_saved_language(language);
    ctx.save_state()?;
    output(
        &LangResponse {
            language,
            saved: ctx.persistence_enabled(),
        },
        flags.format,
    )
}
