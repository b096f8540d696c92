use clap::{Parser, Subcommand};

/// `linkshelf` - personal bookmark manager with page summaries.
#[derive(Parser, Debug)]
#[command(name = "linkshelf")]
#[command(version = "0.1.0")]
#[command(about = "Save links with their metadata and a short readable summary.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bookmark API server
    Serve {
        /// Port to listen on (default: gateway.port from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default: gateway.host from config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage accounts
    User {
        #[command(subcommand)]
        user_command: UserCommands,
    },

    /// Fetch a page through the reader service and print its summary
    Summarize {
        /// Page URL (`https://` is assumed when no scheme is given)
        url: String,

        /// Also print the cleaned full content
        #[arg(long)]
        full: bool,
    },

    /// Fetch a page and print its title, favicon and description as JSON
    Metadata {
        /// Page URL (`https://` is assumed when no scheme is given)
        url: String,
    },

    /// Show the resolved configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account that can sign in to the API
    Add {
        #[arg(long)]
        email: String,

        /// At least 8 characters
        #[arg(long)]
        password: String,
    },
}
