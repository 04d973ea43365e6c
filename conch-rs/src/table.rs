//! Plain-text table formatting.

/// Format rows as left-aligned columns.
///
/// The first row is treated as a header. Each column is as wide as its widest
/// cell plus one space, trailing whitespace is trimmed, and a final line
/// reports how many data rows there were.
///
/// ```
/// use conch::table::format_table;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Description".to_string()],
///     vec!["exec".to_string(), "Execute command features.".to_string()],
/// ];
/// assert_eq!(
///     format_table(&rows),
///     "Name Description\nexec Execute command features.\n1 lines.\n"
/// );
/// ```
pub fn format_table<R, C>(rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let widths = column_widths(rows);
    let mut out = String::new();

    for row in rows {
        let mut line = String::new();
        for (index, cell) in row.as_ref().iter().enumerate() {
            let cell = cell.as_ref();
            let padding = widths[index] - cell.chars().count() + 1;
            line.push_str(cell);
            line.push_str(&" ".repeat(padding));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let data_rows = rows.len().saturating_sub(1);
    out.push_str(&format!("{} lines.\n", data_rows));
    out
}

fn column_widths<R, C>(rows: &[R]) -> Vec<usize>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (index, cell) in row.as_ref().iter().enumerate() {
            let width = cell.as_ref().chars().count();
            match widths.get_mut(index) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }
    widths
}
