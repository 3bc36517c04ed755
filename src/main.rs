mod app;
mod association;
mod cli;
mod cli_ops;
mod clock;
mod completions;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod snippets;
mod store;
mod tags;
mod ui;

use std::io::Read;
use std::str::FromStr;

use app::AppError;
use cli::ContentArgs;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

fn run() -> Result<(), AppError> {
    use clap::Parser;
    use cli::{Commands, TagSubcommands};

    let cli = cli::Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(&args.shell);
    }

    let file_config = config::load(cli.config.as_deref())?;
    let settings = config::Settings::resolve(cli.db.as_deref(), &file_config);
    logging::init(cli.verbose, settings.log_filter.as_deref());
    tracing::debug!(db = %settings.db_path, "opening snippet store");

    let app = app::App::open(&settings.db_path, settings.busy_timeout_ms)?;
    let palette = ui::Palette::auto();

    match cli.command {
        Commands::New(args) => {
            let content = read_content(&args.body)?.unwrap_or_default();
            let snippet = app.create_snippet(&args.title, &content)?;
            if args.json {
                print_json(&snippet);
            } else {
                println!("created #{} {}", snippet.id, snippet.title);
            }
        }
        Commands::Show(args) => {
            let snippet = app.show_snippet(parse_id(&args.id)?)?;
            if args.json {
                print_json(&snippet);
            } else {
                ui::print_snippet_show(&snippet);
            }
        }
        Commands::Ls(args) => {
            let snippets = app.list_snippets(args.tag.as_deref())?;
            if args.json {
                print_json(&snippets);
            } else {
                ui::print_snippet_list(&snippets, args.tag.as_deref());
            }
        }
        Commands::Update(args) => {
            let content = read_content(&args.body)?;
            let snippet = app.update_snippet(
                parse_id(&args.id)?,
                args.title.as_deref(),
                content.as_deref(),
            )?;
            if args.json {
                print_json(&snippet);
            } else {
                println!("updated #{} {}", snippet.id, snippet.title);
            }
        }
        Commands::Rm(args) => {
            let id = parse_id(&args.id)?;
            app.remove_snippet(id)?;
            println!("removed snippet #{id}");
        }
        Commands::Tag(args) => match args.command {
            TagSubcommands::New(new_args) => {
                let tag = app.create_tag(&new_args.name)?;
                if new_args.json {
                    print_json(&tag);
                } else {
                    println!("tag {}", ui::format_tag_row(&tag, &palette));
                }
            }
            TagSubcommands::Ls(ls_args) => {
                let tags = app.list_tags()?;
                if ls_args.json {
                    print_json(&tags);
                } else {
                    ui::print_tag_list(&tags);
                }
            }
            TagSubcommands::Show(show_args) => {
                let tag = app.show_tag(parse_id(&show_args.id)?)?;
                if show_args.json {
                    print_json(&tag);
                } else {
                    println!("{}", ui::format_tag_row(&tag, &palette));
                }
            }
            TagSubcommands::Rename(rename_args) => {
                let tag = app.rename_tag(parse_id(&rename_args.id)?, &rename_args.name)?;
                if rename_args.json {
                    print_json(&tag);
                } else {
                    println!("renamed {}", ui::format_tag_row(&tag, &palette));
                }
            }
            TagSubcommands::Rm(rm_args) => {
                let id = parse_id(&rm_args.id)?;
                app.remove_tag(id)?;
                println!("removed tag #{id}");
            }
        },
        Commands::Attach(args) => {
            let snippet = app.attach(parse_id(&args.snippet)?, parse_id(&args.tag)?)?;
            print_link_outcome("tagged", &snippet, args.json);
        }
        Commands::Detach(args) => {
            let snippet = app.detach(parse_id(&args.snippet)?, parse_id(&args.tag)?)?;
            print_link_outcome("untagged", &snippet, args.json);
        }
        Commands::Tags(args) => {
            let tags = app.snippet_tags(parse_id(&args.snippet)?)?;
            if args.json {
                print_json(&tags);
            } else {
                ui::print_tag_list(&tags);
            }
        }
        Commands::Completions(_) => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

fn print_link_outcome(verb: &str, snippet: &app::SnippetView, json: bool) {
    if json {
        print_json(snippet);
        return;
    }
    let names = snippet
        .tags
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>();
    if names.is_empty() {
        println!("{verb} #{} (no tags)", snippet.id);
    } else {
        println!("{verb} #{} [{}]", snippet.id, names.join(", "));
    }
}

fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::InvalidArgument(format!("invalid id '{}'", raw.trim())))
}

/// Resolves `-c`/`-f` to text. `-f -` reads stdin.
fn read_content(args: &ContentArgs) -> Result<Option<String>, AppError> {
    if let Some(text) = &args.content {
        return Ok(Some(text.clone()));
    }
    match args.file.as_deref() {
        None => Ok(None),
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(Some(buf))
        }
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
    }
}
