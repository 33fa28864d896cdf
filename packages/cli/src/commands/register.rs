use crate::commands::{prompt_line, ApiContext};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use scribe_sync::{ApiAuthProvider, AuthProvider, Registration};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Asked on stdin, twice, when not set
    #[arg(long, env = "SCRIBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Create an account, storing the token if the server hands one out
pub async fn register(args: RegisterArgs, cwd: &str) -> Result<()> {
    let mut context = ApiContext::load(cwd)?;
    let provider = ApiAuthProvider::new(context.transport.clone());

    let password = match args.password {
        Some(password) => password,
        None => {
            let password = prompt_line("Password:")?;
            if prompt_line("Confirm password:")? != password {
                bail!("Passwords do not match");
            }
            password
        }
    };
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let registration = Registration {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password,
    };
    let session = provider.register(&registration).await?;

    println!("{} Registered {}", "✓".green(), registration.email.bold());
    match session {
        Some(session) => {
            context.config.token = Some(session.token);
            let path = context.config.save(cwd)?;
            println!("   Token saved to {}", path.display());
        }
        None => println!(
            "   Run `scribe login --email {}` to start writing",
            registration.email
        ),
    }
    Ok(())
}
