//! Leaf text formatters: pure string templates consumed by the tree walker
//! as ordinary text content.

pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

pub fn italic(text: &str) -> String {
    format!("*{text}*")
}

pub fn strikethrough(text: &str) -> String {
    format!("~~{text}~~")
}

pub fn inline_code(text: &str) -> String {
    format!("`{text}`")
}

pub fn heading(level: usize, text: &str) -> String {
    format!("{} {text}", "#".repeat(level.clamp(1, 6)))
}

pub fn quote(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn code_block(language: &str, body: &str) -> String {
    format!("```{language}\n{body}\n```")
}

pub fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn numbered_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| format!("{}. {}", index + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_templates() {
        assert_eq!(bold("x"), "**x**");
        assert_eq!(italic("x"), "*x*");
        assert_eq!(strikethrough("x"), "~~x~~");
        assert_eq!(inline_code("x"), "`x`");
    }

    #[test]
    fn test_heading_clamps_level() {
        assert_eq!(heading(2, "Title"), "## Title");
        assert_eq!(heading(0, "Title"), "# Title");
        assert_eq!(heading(9, "Title"), "###### Title");
    }

    #[test]
    fn test_quote_prefixes_every_line() {
        assert_eq!(quote("a\nb"), "> a\n> b");
    }

    #[test]
    fn test_lists() {
        assert_eq!(bullet_list(["a", "b"]), "- a\n- b");
        assert_eq!(numbered_list(["a", "b"]), "1. a\n2. b");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(code_block("rust", "fn main() {}"), "```rust\nfn main() {}\n```");
    }
}
