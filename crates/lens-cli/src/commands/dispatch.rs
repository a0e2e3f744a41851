use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Analyze(args) => commands::analyze::handle(&args, ctx, flags).await,
        Commands::Scan(args) => commands::scan::handle(&args, ctx, flags).await,
        Commands::Personas => commands::personas::handle(ctx, flags),
        Commands::Highlight(_) | Commands::Schema => {
            unreachable!("highlight/schema are pre-dispatched in main")
        }
    }
}
