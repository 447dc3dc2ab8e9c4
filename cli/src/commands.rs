pub mod demo;
pub mod menu;
pub mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ordr")]
#[command(about = "A gesture-driven ordering kiosk.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the kiosk: pollers, order flow and the sensor API
    #[command(alias = "s")]
    Serve {
        /// Override the sensor API port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Play a scripted ordering session against the in-memory store
    #[command(alias = "d")]
    Demo,
    /// Show the menu catalog and its gesture signs
    #[command(alias = "m")]
    Menu,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
