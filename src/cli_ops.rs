use clap::{Args, Subcommand};

#[derive(Debug, Args)]
#[command(
    about = "Tag commands.",
    long_about = "Create, list, show, rename, or delete tags. Names are trimmed, lowercased, and have inner whitespace collapsed."
)]
pub struct TagArgs {
    #[command(subcommand)]
    pub command: TagSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum TagSubcommands {
    #[command(about = "Create a tag, or return the existing one with the same name.")]
    New(TagNewArgs),
    #[command(about = "List all tags by name.")]
    Ls(TagListArgs),
    #[command(about = "Show one tag.")]
    Show(TagShowArgs),
    #[command(about = "Rename a tag.")]
    Rename(TagRenameArgs),
    #[command(about = "Delete a tag and detach it from every snippet.")]
    Rm(TagRemoveArgs),
}

#[derive(Debug, Args)]
pub struct TagNewArgs {
    #[arg(help = "Tag name.")]
    pub name: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TagListArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TagShowArgs {
    #[arg(help = "Tag id.")]
    pub id: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TagRenameArgs {
    #[arg(help = "Tag id.")]
    pub id: String,

    #[arg(help = "New tag name.")]
    pub name: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TagRemoveArgs {
    #[arg(help = "Tag id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct LinkArgs {
    #[arg(help = "Snippet id.")]
    pub snippet: String,

    #[arg(help = "Tag id.")]
    pub tag: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SnippetTagsArgs {
    #[arg(help = "Snippet id.")]
    pub snippet: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}
