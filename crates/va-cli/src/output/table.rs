#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render a simple aligned table for string rows.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0)
                .max(display_width(header))
                .max(4)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| format_cell(&truncate_text(header, *width), *width))
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(display_width(&strip_ansi(&header_line)));

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).cloned().unwrap_or_else(|| "-".to_string());
                let truncated = truncate_text(&value, *width);
                let cell = format_cell(&truncated, *width);
                if options.color {
                    colorize_status(&truncated, cell)
                } else {
                    cell
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line.trim_end().to_string());
    lines.push(divider.trim_end().to_string());
    lines.extend(row_lines);
    lines.join("\n")
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > display_width(headers[*idx]).max(8))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);

        let Some(idx) = candidate else {
            break;
        };

        widths[idx] -= 1;
        total -= 1;
    }
}

/// Terminal columns taken by `value`; CJK and fullwidth characters take two.
pub fn display_width(value: &str) -> usize {
    value.chars().map(char_width).sum()
}

const fn char_width(ch: char) -> usize {
    match ch as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if display_width(value) <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let w = char_width(ch);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn format_cell(value: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(value));
    format!("{}{}", value, " ".repeat(pad))
}

/// Wrap a padded cell in a status color when its text is a known status label.
fn colorize_status(text: &str, cell: String) -> String {
    let lower = text.trim().to_lowercase();
    let code = match lower.as_str() {
        "completed" | "已完成" => Some("32"),
        "running" | "analyzing" | "in progress" | "分析中" | "进行中" => Some("33"),
        "pending" | "待处理" => Some("2"),
        "failed" | "失败" => Some("31"),
        _ => None,
    };

    match code {
        Some(code) => format!("\u{1b}[{code}m{cell}\u{1b}[0m"),
        None => cell,
    }
}

pub fn strip_ansi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            let _ = chars.next();
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
    use super::*;

    fn plain() -> TableOptions {
        TableOptions {
            max_width: None,
            color: false,
        }
    }

    #[test]
    fn cjk_cells_align_by_display_width() {
        let table = render_entity_table(
            &["title", "status"],
            &[
                vec!["贵州茅台".to_string(), "已完成".to_string()],
                vec!["Acme".to_string(), "pending".to_string()],
            ],
            plain(),
        );
        let lines: Vec<&str> = table.lines().collect();
        let status_col = |line: &str| {
            let idx = line.find(|c: char| c == '已' || c == 'p' || c == 's').unwrap();
            display_width(&line[..idx])
        };
        assert_eq!(status_col(lines[2]), status_col(lines[3]));
    }

    #[test]
    fn narrow_terminal_truncates_wide_columns() {
        let table = render_entity_table(
            &["id", "title"],
            &[vec!["s-1".to_string(), "x".repeat(80)]],
            TableOptions {
                max_width: Some(40),
                color: false,
            },
        );
        assert!(table.lines().all(|line| display_width(line) <= 40));
        assert!(table.contains('…'));
    }

    #[test]
    fn status_cells_are_colored() {
        let table = render_entity_table(
            &["status"],
            &[vec!["failed".to_string()]],
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert!(table.contains("\u{1b}[31mfailed"));
        assert_eq!(strip_ansi(&table).lines().last(), Some("failed"));
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi("\u{1b}[32mok\u{1b}[0m"), "ok");
    }
}
