use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Sessions => commands::sessions::handle(ctx, flags).await,
        Commands::Upload(args) => commands::files::handle_upload(&args, ctx, flags).await,
        Commands::AddFile(args) => commands::files::handle_add(&args, ctx, flags).await,
        Commands::DeleteFile(args) => commands::files::handle_delete(&args, ctx, flags).await,
        Commands::Analyze(args) => commands::analyze::handle(&args, ctx, flags).await,
        Commands::Show(args) => commands::show::handle(&args, ctx, flags).await,
        Commands::Watch(args) => commands::watch::handle(&args, ctx, flags).await,
        Commands::Export(args) => commands::transfer::handle_export(&args, ctx, flags).await,
        Commands::Import(args) => commands::transfer::handle_import(&args, ctx, flags).await,
        Commands::Open(args) => commands::workbench::handle(&args, ctx, flags).await,
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
