mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, comments, login, posts, preview, register, CheckArgs, CommentsCommand, LoginArgs,
    PostsCommand, PreviewArgs, RegisterArgs,
};

/// Scribe CLI - write, check and publish blog posts
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log requests and session changes
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate post body markup
    Check(CheckArgs),

    /// Print the plain-text preview of a post body
    Preview(PreviewArgs),

    /// Log in and store the session token
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Manage posts
    Posts {
        #[command(subcommand)]
        command: PostsCommand,
    },

    /// Manage comments
    Comments {
        #[command(subcommand)]
        command: CommentsCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli.command).await;

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match command {
        Command::Check(args) => check(args),
        Command::Preview(args) => preview(args),
        Command::Login(args) => login(args, &cwd).await,
        Command::Register(args) => register(args, &cwd).await,
        Command::Posts { command } => posts(command, &cwd).await,
        Command::Comments { command } => comments(command, &cwd).await,
    }
}
