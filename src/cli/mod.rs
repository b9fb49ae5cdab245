use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod calendar;
pub mod kiosk;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Write the wedding events to an .ics file
    Calendar {
        /// Include the civil ceremony
        #[arg(long, action, default_value = "false")]
        civil: bool,
        /// Include the lunch celebration
        #[arg(long, action, default_value = "false")]
        lunch: bool,
        /// Directory to write the file to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Run the interactive RSVP form against a running server
    Kiosk {
        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:2222")]
        server: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Calendar { civil, lunch, out }) => {
            calendar::run(civil, lunch, out)?;
        }
        Some(Command::Kiosk { server }) => {
            kiosk::run(server).await?;
        }
        None => {}
    }

    Ok(())
}
