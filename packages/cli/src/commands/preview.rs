use anyhow::Result;
use clap::Args;
use scribe_parser::{strip_markup, strip_to_plain_text};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Post body file
    pub input: PathBuf,

    /// Print all of the text instead of the card preview
    #[arg(long)]
    pub full: bool,
}

/// Plain-text preview as shown on post cards. Never fails on bad markup.
pub fn preview(args: PreviewArgs) -> Result<()> {
    let source = fs::read_to_string(&args.input)?;

    let text = if args.full {
        strip_markup(&source)
    } else {
        strip_to_plain_text(&source)
    };
    println!("{}", text);
    Ok(())
}
