/// Wrap a rendered buffer in a labeled block. Leading and trailing blank
/// lines are stripped from the buffer, every non-empty line is re-indented,
/// and a trailing newline separates the block from following sibling text.
/// Nested blocks compound indentation because an inner block's full output
/// sits in the outer buffer before the outer indent pass runs.
pub(crate) fn format_block(tag: &str, indent: usize, body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let Some(start) = start else {
        return format!("<{tag}>\n</{tag}>\n");
    };
    // Safe: `start` proves at least one non-blank line exists.
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(start);

    let pad = " ".repeat(indent);
    let indented: Vec<String> = lines[start..=end]
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect();

    format!("<{tag}>\n{}\n</{tag}>\n", indented.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_simple_block() {
        assert_eq!(format_block("x", 2, "V"), "<x>\n  V\n</x>\n");
    }

    #[test]
    fn test_blank_edges_are_stripped() {
        assert_eq!(format_block("x", 2, "\n\nV\n\n"), "<x>\n  V\n</x>\n");
    }

    #[test]
    fn test_interior_blank_lines_survive_unindented() {
        let formatted = format_block("x", 2, "a\n\nb");
        assert_eq!(formatted, "<x>\n  a\n\n  b\n</x>\n");
    }

    #[test]
    fn test_nested_blocks_compound_indentation() {
        let inner = format_block("inner", 2, "W");
        let outer = format_block("outer", 2, &inner);
        let expected = indoc! {"
            <outer>
              <inner>
                W
              </inner>
            </outer>
        "};
        assert_eq!(outer, expected);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(format_block("x", 2, ""), "<x>\n</x>\n");
        assert_eq!(format_block("x", 2, "   \n  "), "<x>\n</x>\n");
    }
}
