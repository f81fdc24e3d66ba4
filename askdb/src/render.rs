use common::store::{ResultSet, NO_DATA_NOTICE};

/// widest a column may grow before values are truncated
const MAX_COLUMN_WIDTH: usize = 40;

fn truncate_value(value: &str, max_width: usize) -> String {
    let len = value.chars().count();
    if len <= max_width {
        value.to_string()
    } else if max_width <= 3 {
        value.chars().take(max_width).collect()
    } else {
        format!("{}...", value.chars().take(max_width - 3).collect::<String>())
    }
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line
}

/// render a result set as a boxed text table with a row count footer
pub fn format_table(result: &ResultSet) -> String {
    if result.is_empty() {
        return NO_DATA_NOTICE.to_string();
    }

    let header: Vec<String> = result
        .columns
        .iter()
        .map(|c| truncate_value(c, MAX_COLUMN_WIDTH))
        .collect();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| truncate_value(&v.to_string(), MAX_COLUMN_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let separator = border(&widths);
    let mut out = Vec::with_capacity(rows.len() + 5);
    out.push(separator.clone());
    out.push(row_line(&header, &widths));
    out.push(separator.clone());
    for row in &rows {
        out.push(row_line(row, &widths));
    }
    out.push(separator);

    let count = rows.len();
    out.push(format!("({} row{})", count, if count == 1 { "" } else { "s" }));
    out.join("\n")
}
