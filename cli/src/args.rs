use blog_core::DEFAULT_BASE_URL;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "blog", version, about = "Browse and author posts on a REST blog store", long_about = None)]
pub struct Cli {
    /// Base address of the blog store
    #[arg(long, env = "BLOG_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every post
    List,
    /// Print one post
    Show { id: String },
    /// Publish a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a post after confirmation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive list/detail session (default)
    Browse,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Browse)
    }
}
