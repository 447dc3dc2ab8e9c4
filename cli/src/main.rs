mod commands;
mod terminal;

use commands::{CommandLine, Commands, demo, menu, serve};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    match commands.command {
        Commands::Serve { port } => serve::serve(port).await,
        Commands::Demo => demo::demo().await,
        Commands::Menu => {
            menu::menu();
            Ok(())
        }
    }
}
