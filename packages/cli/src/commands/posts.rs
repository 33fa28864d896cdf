use crate::commands::{confirmer, explain, ApiContext};
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use scribe_editor::{EditSession, ImageFile};
use scribe_parser::parse;
use scribe_sync::{
    can_modify_post, AuthProvider, DeleteOutcome, Post, PostClient, PostId, Publisher, UserId,
};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Subcommand, Debug)]
pub enum PostsCommand {
    /// List posts, optionally by one author
    List {
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show a single post
    Show {
        id: String,

        /// Print the stored markup instead of plain text
        #[arg(long)]
        raw: bool,
    },

    /// Publish a new post
    Publish {
        #[arg(short, long)]
        title: String,

        /// File holding the post body markup
        #[arg(short, long)]
        body: PathBuf,

        /// Cover image file
        #[arg(short, long)]
        cover: Option<PathBuf>,
    },

    /// Change the title or body of a post
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<PathBuf>,
    },

    /// Delete a post. There is no undo.
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn posts(command: PostsCommand, cwd: &str) -> Result<()> {
    let context = ApiContext::load(cwd)?;
    let client = PostClient::new(context.transport.clone(), context.auth.clone());

    match command {
        PostsCommand::List { author } => {
            let posts = match author {
                Some(author) => client.list_by_author(&UserId::new(author)).await,
                None => client.list_all().await,
            }
            .map_err(explain)?;

            if posts.is_empty() {
                println!("{}", "No posts yet".yellow());
            }
            for post in &posts {
                print_listing(post);
            }
            Ok(())
        }

        PostsCommand::Show { id, raw } => {
            let post = client.fetch_one(&PostId::new(id)).await.map_err(explain)?;
            print_post(&post, raw);

            let session = context.auth.current_session();
            if can_modify_post(&post, session.as_ref()) {
                println!("{}", "You can edit this post".dimmed());
            }
            Ok(())
        }

        PostsCommand::Publish { title, body, cover } => {
            let mut session = EditSession::new();
            session.set_title(title);
            session.replace_body(&read_body(&body)?)?;
            if let Some(cover) = cover {
                let file = ImageFile::from_path(&cover)
                    .with_context(|| format!("Cannot read {}", cover.display()))?;
                session.set_cover_image(Some(file))?;
            }

            let post = submit(client, session).await?;
            println!("{} Published post {}", "✓".green(), post.id.to_string().bold());
            Ok(())
        }

        PostsCommand::Edit { id, title, body } => {
            if title.is_none() && body.is_none() {
                return Err(anyhow!("Nothing to change, pass --title or --body"));
            }

            let existing = client.fetch_one(&PostId::new(id)).await.map_err(explain)?;
            let mut session =
                EditSession::for_post(existing.id.to_string(), existing.title, &existing.body)?;
            if let Some(title) = title {
                session.set_title(title);
            }
            if let Some(body) = body {
                session.replace_body(&read_body(&body)?)?;
            }

            if !session.is_dirty() {
                println!("{}", "Post already up to date".dimmed());
                return Ok(());
            }

            let post = submit(client, session).await?;
            println!("{} Updated post {}", "✓".green(), post.id.to_string().bold());
            Ok(())
        }

        PostsCommand::Delete { id, yes } => {
            let id = PostId::new(id);
            let outcome = client
                .delete(&id, confirmer(yes).as_ref())
                .await
                .map_err(explain)?;

            match outcome {
                DeleteOutcome::Deleted => println!("{} Deleted post {}", "✓".green(), id),
                DeleteOutcome::Cancelled => println!("{}", "Cancelled".dimmed()),
            }
            Ok(())
        }
    }
}

async fn submit(client: PostClient, session: EditSession) -> Result<Post> {
    let session = Mutex::new(session);
    Publisher::new(client)
        .submit(&session)
        .await
        .map_err(explain)
}

fn read_body(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn print_listing(post: &Post) {
    println!("{:>6}  {}", post.id.to_string().dimmed(), post.title.bold());
    if !post.summary.is_empty() {
        println!("        {}", post.summary.dimmed());
    }
}

fn print_post(post: &Post, raw: bool) {
    println!("{}", post.title.bold());

    let mut byline = Vec::new();
    if let Some(author) = &post.author_name {
        byline.push(format!("by {}", author));
    }
    if let Some(created_at) = &post.created_at {
        byline.push(created_at.format("%Y-%m-%d").to_string());
    }
    if !byline.is_empty() {
        println!("{}", byline.join(", ").dimmed());
    }
    if let Some(cover) = &post.cover_image {
        println!("{} {}", "Cover:".dimmed(), cover);
    }
    println!();

    if raw {
        println!("{}", post.body);
        return;
    }
    match parse(&post.body) {
        Ok(document) => println!("{}", document.plain_text()),
        Err(_) => println!("{}", post.body),
    }
}
