use crate::api::models::Row;
use crate::core::panel::PanelState;
use crate::error::DisplayError;
use crate::utils::text::single_line;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;
use serde_json::Value;

/// Column headers for a page: the keys of the first row, in their order.
///
/// Later rows are assumed to share the same keys.
pub fn column_headers(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// String form of a cell value. Strings are shown as-is, everything else as JSON text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cells of `row` lined up under `headers`; keys the row lacks render empty.
pub fn row_cells(row: &Row, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|key| row.get(key).map(cell_text).unwrap_or_default())
        .collect()
}

/// Formatter for the plan block and the results table
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Render a results page. `None` when there are no rows: no table is shown.
    pub fn render_results(&self, rows: &[Row]) -> Option<String> {
        if rows.is_empty() {
            return None;
        }

        let headers = column_headers(rows);

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width.saturating_sub(2).max(20) as u16);
        }

        table.set_header(headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.use_colors {
                cell.fg(Color::Green)
            } else {
                cell
            }
        }));

        for row in rows {
            let cells = headers.iter().zip(row_cells(row, &headers)).map(|(key, text)| {
                let text = single_line(&text);
                let is_null = matches!(row.get(key), Some(Value::Null));
                if self.use_colors && is_null {
                    Cell::new(text)
                        .fg(Color::DarkGrey)
                        .add_attribute(Attribute::Italic)
                } else {
                    Cell::new(text)
                }
            });
            table.add_row(cells);
        }

        Some(table.to_string())
    }

    /// Plan as indented JSON.
    pub fn render_plan(&self, plan: &Value) -> Result<String, DisplayError> {
        serde_json::to_string_pretty(plan).map_err(|e| DisplayError::TableFormat(e.to_string()))
    }

    /// Everything the panel currently shows, top to bottom:
    /// loading line, error, plan, results table, paging footer.
    pub fn render_panel(&self, panel: &PanelState) -> Result<String, DisplayError> {
        let mut sections = Vec::new();

        if panel.is_loading() {
            sections.push("Loading...".to_string());
        }

        if let Some(error) = panel.error() {
            sections.push(format!("Error: {}", error));
        }

        if let Some(plan) = panel.plan().filter(|plan| !plan.is_null()) {
            sections.push(format!("Plan:\n{}", self.render_plan(plan)?));
        }

        let rows_line = self.render_results(panel.results()).map(|table| {
            sections.push(table);
            self.render_row_range(panel)
        });

        match (rows_line, panel.next_offset()) {
            (Some(rows), Some(next)) => {
                sections.push(format!("{} | Load more: next offset {}", rows, next))
            }
            (Some(rows), None) => sections.push(rows),
            (None, Some(next)) => sections.push(format!("Load more: next offset {}", next)),
            (None, None) => {}
        }

        Ok(sections.join("\n"))
    }

    fn render_row_range(&self, panel: &PanelState) -> String {
        let offset = panel.offset();
        let count = panel.results().len() as u64;
        format!(
            "Rows {}-{} (offset {})",
            offset.saturating_add(1),
            offset.saturating_add(count),
            offset
        )
    }
}
