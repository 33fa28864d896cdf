use crate::commands::{confirmer, explain, ApiContext};
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use scribe_sync::{can_modify, AuthProvider, CommentClient, CommentId, DeleteOutcome, PostId};

#[derive(Subcommand, Debug)]
pub enum CommentsCommand {
    /// List comments on a post
    List { post: String },

    /// Comment on a post
    Add { post: String, text: String },

    /// Delete a comment
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn comments(command: CommentsCommand, cwd: &str) -> Result<()> {
    let context = ApiContext::load(cwd)?;
    let client = CommentClient::new(context.transport.clone(), context.auth.clone());

    match command {
        CommentsCommand::List { post } => {
            let comments = client.list(&PostId::new(post)).await.map_err(explain)?;
            if comments.is_empty() {
                println!("{}", "No comments yet".yellow());
            }

            let session = context.auth.current_session();
            for comment in &comments {
                let author = comment
                    .author_name
                    .clone()
                    .or_else(|| comment.author_id.as_ref().map(|id| format!("user {}", id)))
                    .unwrap_or_else(|| "anonymous".to_string());
                let marker = if can_modify(comment, session.as_ref()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{}{:>6}  {}  {}",
                    marker,
                    comment.id.to_string().dimmed(),
                    author.bold(),
                    comment.text
                );
            }
            Ok(())
        }

        CommentsCommand::Add { post, text } => {
            let comment = client
                .create(&PostId::new(post), &text)
                .await
                .map_err(explain)?;
            println!("{} Added comment {}", "✓".green(), comment.id);
            Ok(())
        }

        CommentsCommand::Delete { id, yes } => {
            let id = CommentId::new(id);
            let outcome = client
                .delete(&id, confirmer(yes).as_ref())
                .await
                .map_err(explain)?;

            match outcome {
                DeleteOutcome::Deleted => println!("{} Deleted comment {}", "✓".green(), id),
                DeleteOutcome::Cancelled => println!("{}", "Cancelled".dimmed()),
            }
            Ok(())
        }
    }
}
