use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use scribe_parser::{format_error, parse, Document};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Post body file, or a directory of `.html` bodies
    pub input: PathBuf,

    /// Print the parsed document tree as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn check(args: CheckArgs) -> Result<()> {
    if args.input.is_file() {
        let document = check_file(&args.input)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&document)?);
        } else {
            print_summary(&args.input, &document);
        }
        return Ok(());
    }

    if !args.input.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    }

    let files = find_body_files(&args.input);
    if files.is_empty() {
        println!("{}", "No .html files found".yellow());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        match check_file(file) {
            Ok(document) => print_summary(file, &document),
            Err(err) => {
                failed += 1;
                eprintln!("  {} {}{}", "✗".red(), file.display(), err);
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} Checked {} files", "✓".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} files failed to parse", failed, files.len()))
    }
}

fn check_file(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)?;

    parse(&source).map_err(|err| {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown");
        anyhow!("\n{}", format_error(&source, file_name, &err))
    })
}

fn print_summary(path: &Path, document: &Document) {
    let words = document.plain_text().split_whitespace().count();
    println!(
        "  {} {} {}",
        "✓".green(),
        path.display(),
        format!(
            "({} blocks, {} images, {} words)",
            document.blocks.len(),
            document.image_count(),
            words
        )
        .dimmed()
    );
}

fn find_body_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("html"))
        .collect();
    files.sort();
    files
}
