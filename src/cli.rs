use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

pub use crate::cli_ops::*;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "snip")]
#[command(bin_name = "snip")]
#[command(version)]
#[command(about = "A local snippet store with normalized tags")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        global = true,
        env = "SNIP_DB_PATH",
        help = "Path to the SQLite database (defaults to the config file, then .snip/snip.sqlite)."
    )]
    pub db: Option<String>,

    #[arg(
        long,
        global = true,
        env = "SNIP_CONFIG",
        help = "Config file path (defaults to ~/.config/snip/config.toml)."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)."
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create a new snippet.")]
    New(NewArgs),
    #[command(about = "Show one snippet with its tags.")]
    Show(ShowArgs),
    #[command(about = "List snippets, optionally filtered by tag.")]
    Ls(ListArgs),
    #[command(about = "Replace a snippet's title and/or content.")]
    Update(UpdateArgs),
    #[command(about = "Delete a snippet and its tag associations.")]
    Rm(RemoveArgs),
    #[command(about = "Manage tags.")]
    Tag(TagArgs),
    #[command(about = "Attach a tag to a snippet.")]
    Attach(LinkArgs),
    #[command(about = "Detach a tag from a snippet.")]
    Detach(LinkArgs),
    #[command(about = "List the tags on a snippet.")]
    Tags(SnippetTagsArgs),
    #[command(about = "Print shell completions to stdout.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
#[command(about = "Print shell completions to stdout.")]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish, elvish, powershell).")]
    pub shell: String,
}

#[derive(Debug, Args)]
#[group(id = "content_source", multiple = false)]
pub struct ContentArgs {
    #[arg(short = 'c', long, help = "Snippet content text.")]
    pub content: Option<String>,

    #[arg(
        short = 'f',
        long,
        help = "Read snippet content from a file ('-' reads stdin)."
    )]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(about = "Create a new snippet.")]
pub struct NewArgs {
    #[arg(help = "Snippet title.")]
    pub title: String,

    #[command(flatten)]
    pub body: ContentArgs,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Show one snippet.")]
pub struct ShowArgs {
    #[arg(help = "Snippet id (an optional '#' prefix is accepted).")]
    pub id: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "List snippets.")]
pub struct ListArgs {
    #[arg(
        short = 't',
        long,
        help = "Only list snippets carrying this tag (matched after normalization)."
    )]
    pub tag: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Update a snippet.")]
pub struct UpdateArgs {
    #[arg(help = "Snippet id.")]
    pub id: String,

    #[arg(short = 't', long, help = "New title.")]
    pub title: Option<String>,

    #[command(flatten)]
    pub body: ContentArgs,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Delete a snippet.")]
pub struct RemoveArgs {
    #[arg(help = "Snippet id.")]
    pub id: String,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
