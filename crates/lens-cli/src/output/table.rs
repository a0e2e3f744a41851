const MIN_COLUMN: usize = 5;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render an aligned plain-text table. Widths are measured in chars with ANSI
/// escapes ignored, so pre-painted cells line up.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| visible_len(cell))
                .max()
                .unwrap_or(0)
                .max(visible_len(header))
                .max(MIN_COLUMN)
        })
        .collect::<Vec<_>>();

    shrink_to_fit(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line.trim_end().to_string());
    lines.push("-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2));

    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map_or("-", String::as_str);
                let cell = truncate(cell, *width);
                let numeric = looks_numeric(&cell);
                let cell = if options.color {
                    colorize_verdict_word(&cell)
                } else {
                    cell
                };
                pad(&cell, *width, numeric)
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;

    while widths.iter().sum::<usize>() + separators > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > visible_len(headers[*index]).max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
    }
}

/// Cut a cell to `width` visible chars. Cells carrying ANSI escapes are left
/// alone, since cutting could split an escape sequence.
fn truncate(value: &str, width: usize) -> String {
    if value.contains('\u{1b}') || value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out = value.chars().take(width - 1).collect::<String>();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_len(value)));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn visible_len(value: &str) -> usize {
    strip_ansi(value).chars().count()
}

/// Green for good news, yellow for caution, red for bad news.
fn colorize_verdict_word(value: &str) -> String {
    let code = match value.to_ascii_lowercase().as_str() {
        "vegan" | "veg" | "positive" | "published" | "idle" => "32",
        "warning" | "unknown" | "cooldown" | "suspended" | "discarded" => "33",
        "non-veg" | "critical" | "failed" => "31",
        _ => return value.to_string(),
    };
    paint(value, code)
}

#[must_use]
pub fn paint(value: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

#[must_use]
pub fn strip_ansi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn aligns_columns_and_right_aligns_numbers() {
        let rows = vec![
            vec!["healthScore".to_string(), "42".to_string()],
            vec!["summary".to_string(), "Sweet bar".to_string()],
        ];
        let table = render_table(&["key", "value"], &rows, PLAIN);
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "key          value");
        assert_eq!(lines[2], "healthScore         42");
        assert_eq!(lines[3], "summary      Sweet bar");
    }

    #[test]
    fn shrinks_widest_column_to_terminal_width() {
        let rows = vec![vec!["a".to_string(), "x".repeat(80)]];
        let options = TableOptions {
            max_width: Some(40),
            color: false,
        };
        let table = render_table(&["key", "value"], &rows, options);
        for line in table.lines() {
            assert!(line.chars().count() <= 40, "{line:?}");
        }
        assert!(table.contains('…'));
    }

    #[test]
    fn painted_cells_keep_alignment() {
        let rows = vec![
            vec!["diet".to_string(), "vegan".to_string(), "end".to_string()],
            vec!["diet".to_string(), "non-veg".to_string(), "end".to_string()],
        ];
        let options = TableOptions {
            max_width: None,
            color: true,
        };
        let table = render_table(&["key", "value", "tail"], &rows, options);
        let stripped = table.lines().skip(2).map(strip_ansi).collect::<Vec<_>>();
        assert_eq!(stripped[0].find("end"), stripped[1].find("end"));
    }

    #[rstest]
    #[case("vegan", true)]
    #[case("critical", true)]
    #[case("warning", true)]
    #[case("Corn Syrup", false)]
    fn verdict_words_are_colorized(#[case] word: &str, #[case] painted: bool) {
        let out = colorize_verdict_word(word);
        assert_eq!(out.contains('\u{1b}'), painted);
        assert_eq!(strip_ansi(&out), word);
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("crème brûlée", 6), "crème…");
        assert_eq!(truncate("short", 10), "short");
    }
}
