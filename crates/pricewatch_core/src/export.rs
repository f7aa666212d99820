use crate::table::{TableField, TextTable, GLYPH_DOWN, GLYPH_FLAT, GLYPH_UP};
use crate::{render_grid, ReportGrid};

/// Name of the exported report file.
pub const EXPORT_FILENAME: &str = "price_history.csv";

/// Serializes a rendered table as comma-separated, fully quoted text.
///
/// Every field prefers its raw value over the display text, loses trend
/// glyphs and placeholder dashes, doubles embedded quotes and is wrapped in
/// quotes. Lines are joined with `\n`; there is no trailing newline.
pub fn export_table(table: &TextTable) -> String {
    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|field| quote(&clean(resolve(field))))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn export_grid(grid: &ReportGrid) -> String {
    export_table(&render_grid(grid))
}

fn resolve(field: &TableField) -> &str {
    field.raw.as_deref().unwrap_or(&field.display)
}

fn is_glyph(ch: char) -> bool {
    matches!(ch, GLYPH_UP | GLYPH_DOWN | GLYPH_FLAT)
}

/// Drops trend glyphs together with the whitespace that separated them from
/// the value. Other whitespace is content and stays.
fn clean(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut after_glyph = false;
    for ch in value.chars() {
        if is_glyph(ch) {
            out.truncate(out.trim_end().len());
            after_glyph = true;
        } else if after_glyph && ch.is_whitespace() {
            continue;
        } else {
            after_glyph = false;
            out.push(ch);
        }
    }
    // A lone placeholder is decoration; dashes inside real text are content.
    if !out.is_empty() && out.chars().all(|ch| ch == '-') {
        String::new()
    } else {
        out
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_glyphs_and_placeholder() {
        assert_eq!(clean("$1.00 ▲"), "$1.00");
        assert_eq!(clean("-"), "");
        assert_eq!(clean("Coca-Cola"), "Coca-Cola");
    }

    #[test]
    fn clean_keeps_whitespace_that_is_not_next_to_a_glyph() {
        assert_eq!(clean(" Milk  2L"), " Milk  2L");
        assert_eq!(clean("▲ 1.00"), "1.00");
        assert_eq!(clean("$1.00 ▼ "), "$1.00");
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"12" sub"#), r#""12"" sub""#);
    }
}
