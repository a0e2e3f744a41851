use lens_core::AnalysisResult;

use crate::cli::{GlobalFlags, OutputFormat};

/// Handle `lens schema`: the JSON schema a verdict must satisfy.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schemars::schema_for!(AnalysisResult);
    let rendered = match flags.format {
        OutputFormat::Raw => serde_json::to_string(&schema)?,
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(&schema)?,
    };
    println!("{rendered}");
    Ok(())
}
