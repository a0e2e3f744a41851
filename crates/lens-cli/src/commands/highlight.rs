use std::io::Read;

use anyhow::Context;
use lens_core::Villain;
use lens_highlight::TermIndex;

use crate::cli::root_commands::HighlightArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::verdict::render_spans;
use crate::ui;

/// Handle `lens highlight`: mark `--term` names in the given text or stdin.
pub fn handle(args: &HighlightArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            buffer
        }
    };

    println!("{}", render(&args.terms, &text, flags.format, ui::prefs().color)?);
    Ok(())
}

fn render(terms: &[String], text: &str, format: OutputFormat, color: bool) -> anyhow::Result<String> {
    let villains = terms
        .iter()
        .map(|term| Villain::new(term.as_str(), ""))
        .collect::<Vec<_>>();
    let index = TermIndex::new(&villains)?;
    let spans = index.spans(text);

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&spans)?,
        OutputFormat::Raw => serde_json::to_string(&spans)?,
        OutputFormat::Table => render_spans(&spans, color),
    })
}
