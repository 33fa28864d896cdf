use crate::commands::{prompt_line, ApiContext};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use scribe_sync::{ApiAuthProvider, AuthProvider};

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: String,

    /// Asked on stdin when not set
    #[arg(long, env = "SCRIBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Log in and store the token in the config file
pub async fn login(args: LoginArgs, cwd: &str) -> Result<()> {
    let mut context = ApiContext::load(cwd)?;
    let provider = ApiAuthProvider::new(context.transport.clone());

    let password = match args.password {
        Some(password) => password,
        None => prompt_line("Password:")?,
    };
    let session = provider.login(&args.email, &password).await?;

    context.config.token = Some(session.token.clone());
    let path = context.config.save(cwd)?;

    let name = session
        .display_name
        .or(session.username)
        .unwrap_or_else(|| session.user_id.to_string());
    println!(
        "{} Logged in as {} ({:?})",
        "✓".green(),
        name.bold(),
        session.role
    );
    println!("   Token saved to {}", path.display());
    Ok(())
}
