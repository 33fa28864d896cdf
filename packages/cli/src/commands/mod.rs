pub mod check;
pub mod comments;
pub mod login;
pub mod posts;
pub mod preview;
pub mod register;

pub use check::{check, CheckArgs};
pub use comments::{comments, CommentsCommand};
pub use login::{login, LoginArgs};
pub use posts::{posts, PostsCommand};
pub use preview::{preview, PreviewArgs};
pub use register::{register, RegisterArgs};

use crate::config::Config;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use scribe_sync::{AssumeYes, Confirm, HttpTransport, StaticAuthProvider, SyncError};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// What every API command needs: config, transport and the stored session
pub struct ApiContext {
    pub config: Config,
    pub transport: Arc<HttpTransport>,
    pub auth: Arc<StaticAuthProvider>,
}

impl ApiContext {
    pub fn load(cwd: &str) -> Result<Self> {
        let config = Config::load(cwd)?;
        let transport = Arc::new(HttpTransport::with_timeout(
            &config.api_url,
            config.timeout(),
        )?);

        let auth = match &config.token {
            Some(token) => StaticAuthProvider::from_token(token).map_err(|err| {
                anyhow::anyhow!("Stored token is unusable ({}), run `scribe login`", err)
            })?,
            None => StaticAuthProvider::anonymous(),
        };
        debug!(
            api_url = %config.api_url,
            authenticated = config.token.is_some(),
            "Loaded config"
        );

        Ok(Self {
            config,
            transport,
            auth: Arc::new(auth),
        })
    }
}

/// Asks on stdin; anything but `y`/`yes` declines
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} {} ", prompt.yellow(), "[y/N]".dimmed());
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Read one line from stdin after printing `label`
pub fn prompt_line(label: &str) -> Result<String> {
    print!("{} ", label.bold());
    std::io::stdout().flush().context("Cannot write prompt")?;

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Cannot read from stdin")?;
    if read == 0 {
        bail!("No input for {}", label.trim_end_matches(':').to_lowercase());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConfirm)
    }
}

/// Turn a sync failure into a message that says what to do next
pub fn explain(err: SyncError) -> anyhow::Error {
    if err.needs_login() {
        anyhow::anyhow!("{} (run `scribe login` first)", err)
    } else {
        err.into()
    }
}
