use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PersonaRow<'a> {
    persona: &'a str,
    label: &'a str,
    sub_option: &'a str,
    sub_label: &'a str,
}

/// Handle `lens personas`: one row per persona and sub-option pair.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows = ctx
        .catalog
        .personas
        .iter()
        .flat_map(|(persona_id, persona)| {
            persona
                .sub_options
                .iter()
                .map(move |(sub_id, sub_option)| PersonaRow {
                    persona: persona_id,
                    label: &persona.label,
                    sub_option: sub_id,
                    sub_label: &sub_option.label,
                })
        })
        .collect::<Vec<_>>();

    output(&rows, flags.format)
}
