use crate::{Cell, ReportGrid, Trend};

pub const GLYPH_UP: char = '▲';
pub const GLYPH_DOWN: char = '▼';
pub const GLYPH_FLAT: char = '▬';
/// Shown in place of a missing price.
pub const PLACEHOLDER_DASH: &str = "-";

/// Store keys the dashboard knows a friendly name for.
pub const KNOWN_STORES: [&str; 3] = ["nofrills", "foodbasics", "metro"];

pub fn store_display_name(key: &str) -> &str {
    match key {
        "nofrills" => "No Frills",
        "foodbasics" => "Food Basics",
        "metro" => "Metro",
        other => other,
    }
}

/// A rendered field: what the user sees, plus the exact value when the
/// display text is a reformatting of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableField {
    pub display: String,
    pub raw: Option<String>,
}

impl TableField {
    pub fn text(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            raw: None,
        }
    }

    pub fn with_raw(display: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            raw: Some(raw.into()),
        }
    }
}

/// Rows of fields; the first row is the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextTable {
    pub rows: Vec<Vec<TableField>>,
}

impl TextTable {
    pub fn header(&self) -> Option<&[TableField]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<TableField>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

pub fn trend_glyph(trend: Trend) -> Option<char> {
    match trend {
        Trend::Up => Some(GLYPH_UP),
        Trend::Down => Some(GLYPH_DOWN),
        Trend::Flat => Some(GLYPH_FLAT),
        Trend::None => None,
    }
}

pub fn render_grid(grid: &ReportGrid) -> TextTable {
    let mut header = vec![
        TableField::text("Store"),
        TableField::text("Product"),
        TableField::text("Unit"),
    ];
    header.extend(grid.dates.iter().map(|date| {
        TableField::with_raw(
            date.format("%b %d").to_string(),
            date.format("%Y-%m-%d").to_string(),
        )
    }));

    let mut rows = Vec::with_capacity(grid.rows.len() + 1);
    rows.push(header);
    for row in &grid.rows {
        let mut fields = Vec::with_capacity(row.cells.len() + 3);
        fields.push(TableField::text(store_display_name(&row.entity.group_key)));
        fields.push(TableField::text(row.entity.display_name.clone()));
        fields.push(TableField::text(row.entity.unit.clone()));
        fields.extend(row.cells.iter().map(render_cell));
        rows.push(fields);
    }

    TextTable { rows }
}

fn render_cell(cell: &Cell) -> TableField {
    match cell.value {
        Some(value) => {
            let display = match trend_glyph(cell.trend) {
                Some(glyph) => format!("${value:.2} {glyph}"),
                None => format!("${value:.2}"),
            };
            TableField::with_raw(display, format!("{value:.2}"))
        }
        None => TableField::text(PLACEHOLDER_DASH),
    }
}
