use std::io::{self, IsTerminal};

use crate::app::{SnippetView, TagView};

pub fn print_snippet_list(snippets: &[SnippetView], tag_filter: Option<&str>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Snippets"));
    if let Some(tag) = tag_filter.and_then(non_empty) {
        println!("{}", palette.dim(&format!("filters: tag={tag}")));
    }

    if snippets.is_empty() {
        println!("{}", palette.dim("no snippets matched"));
        return;
    }

    for snippet in snippets {
        println!("{}", format_snippet_row(snippet, &palette));
    }
    println!(
        "{}",
        palette.dim(&format!("{} snippet(s)", snippets.len()))
    );
}

pub fn print_snippet_show(snippet: &SnippetView) {
    let palette = Palette::auto();
    println!("{}", format_snippet_row(snippet, &palette));
    println!(
        "{}",
        palette.dim(&format!(
            "created {}  updated {}",
            snippet.created_at, snippet.updated_at
        ))
    );
    if !snippet.content.is_empty() {
        println!();
        println!("{}", snippet.content);
    }
}

pub fn print_tag_list(tags: &[TagView]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Tags"));
    if tags.is_empty() {
        println!("{}", palette.dim("no tags"));
        return;
    }
    for tag in tags {
        println!("{}", format_tag_row(tag, &palette));
    }
    println!("{}", palette.dim(&format!("{} tag(s)", tags.len())));
}

pub fn format_tag_row(tag: &TagView, palette: &Palette) -> String {
    format!(
        "{} {}",
        palette.id(&format!("#{}", tag.id)),
        palette.tags(&tag_label(tag))
    )
}

fn format_snippet_row(snippet: &SnippetView, palette: &Palette) -> String {
    let mut line = format!("{} {}", palette.id(&format!("#{}", snippet.id)), snippet.title);
    if !snippet.tags.is_empty() {
        line.push(' ');
        line.push_str(&palette.tags(&tag_labels(&snippet.tags)));
    }
    line
}

// Tag names may contain spaces, so a label is bracketed when needed.
fn tag_label(tag: &TagView) -> String {
    if tag.name.contains(' ') {
        format!("#[{}]", tag.name)
    } else {
        format!("#{}", tag.name)
    }
}

fn tag_labels(tags: &[TagView]) -> String {
    tags.iter().map(tag_label).collect::<Vec<_>>().join(" ")
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn tags(&self, text: &str) -> String {
        self.paint("90", text)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_snippet_row, format_tag_row, tag_labels, Palette};
    use crate::app::{SnippetView, TagView};

    fn tag(id: i64, name: &str) -> TagView {
        TagView {
            id,
            name: name.to_string(),
        }
    }

    fn sample_snippet(tags: Vec<TagView>) -> SnippetView {
        SnippetView {
            id: 12,
            title: "Reverse a list".to_string(),
            content: "xs.reverse()".to_string(),
            created_at: "2026-02-25T10:00:00Z".to_string(),
            updated_at: "2026-02-25T10:00:00Z".to_string(),
            tags,
        }
    }

    #[test]
    fn snippet_row_lists_tags_after_title() {
        let row = format_snippet_row(
            &sample_snippet(vec![tag(1, "python"), tag(2, "one liner")]),
            &Palette::plain(),
        );
        assert_eq!(row, "#12 Reverse a list #python #[one liner]");
    }

    #[test]
    fn snippet_row_without_tags_is_just_id_and_title() {
        let row = format_snippet_row(&sample_snippet(Vec::new()), &Palette::plain());
        assert_eq!(row, "#12 Reverse a list");
    }

    #[test]
    fn tag_row_shows_id_and_name() {
        assert_eq!(format_tag_row(&tag(3, "rust"), &Palette::plain()), "#3 #rust");
        assert_eq!(tag_labels(&[]), "");
    }

    #[test]
    fn tag_row_brackets_names_with_spaces() {
        let spaced = tag(4, "shell scripts");
        assert_eq!(
            format_tag_row(&spaced, &Palette::plain()),
            "#4 #[shell scripts]"
        );
        assert_eq!(tag_labels(&[spaced]), "#[shell scripts]");
    }

    #[test]
    fn painted_output_wraps_ansi_codes() {
        let palette = Palette { enabled: true };
        assert_eq!(palette.dim("x"), "\x1b[2mx\x1b[0m");
    }
}
