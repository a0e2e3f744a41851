use anyhow::{Context, bail};
use lens_core::{AnalysisError, Analyzer, ErrorKind, ImageUnit, InputUnit};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::context::AppContext;
use crate::output::verdict::render_verdict;
use crate::progress::Progress;

/// Handle `lens analyze`.
pub async fn handle(args: &AnalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let unit = build_unit(args)?;
    let context = ctx.initial_context(args.persona.as_deref(), args.sub_option.as_deref());
    let instruction = context.as_ref().map(|context| context.instruction_fragment.as_str());

    tracing::debug!(
        input = %unit.describe(),
        persona = context.as_ref().map(|context| context.persona_id.as_str()),
        "analyzing"
    );

    let progress = Progress::spinner(&format!("Analyzing {}", unit.describe()));
    match ctx.analyzer.analyze(&unit, instruction, &ctx.credential).await {
        Ok(verdict) => {
            progress.finish_clear();
            println!("{}", render_verdict(&verdict, flags.format)?);
            Ok(())
        }
        Err(error) => {
            progress.finish_err("analysis failed");
            Err(explain(error))
        }
    }
}

fn build_unit(args: &AnalyzeArgs) -> anyhow::Result<InputUnit> {
    if let Some(path) = &args.image {
        let image = ImageUnit::from_path(path)
            .with_context(|| format!("failed to read image {}", path.display()))?;
        return Ok(InputUnit::Image(image));
    }
    let text = match (&args.text, &args.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("one of --image, --text or --text-file is required"),
    };
    if text.trim().is_empty() {
        bail!("input text is empty");
    }
    Ok(InputUnit::text(text))
}

/// Attach a next step for failures the user has to fix themselves.
pub(crate) fn explain(error: AnalysisError) -> anyhow::Error {
    let kind = error.kind();
    let hint = if kind.is_fatal_for_session() {
        Some("check LENS_GEMINI__API_KEY or [gemini] api_key")
    } else if kind == ErrorKind::QuotaExceeded {
        Some("wait for the quota window to reset and retry")
    } else {
        None
    };
    let error = anyhow::Error::new(error).context(format!("analysis failed ({kind})"));
    match hint {
        Some(hint) => error.context(hint),
        None => error,
    }
}
