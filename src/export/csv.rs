//! CSV export in display order.
//!
//! Output is UTF-8 with a byte-order mark so spreadsheet tools pick the right
//! encoding. Every cell is quoted; embedded quotes are doubled.

use crate::model::{ExportError, Group};
use crate::projection::Projection;
use crate::workbook::Workbook;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Byte-order mark written before the header.
pub const BOM: &str = "\u{feff}";

/// Columns preceding the visible fields: overall position, in-group index,
/// parent group, group.
pub const LEADING_HEADERS: [&str; 4] = ["总序号", "序号", "父级分组", "分组"];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn group_label(group: Option<&Group>) -> String {
    group.map(Group::to_string).unwrap_or_default()
}

/// Render the projection as CSV text, BOM included.
pub fn render_csv(projection: &Projection<'_>) -> String {
    let mut out = String::from(BOM);

    let mut header: Vec<String> = LEADING_HEADERS.iter().map(|h| quote(h)).collect();
    header.extend(projection.columns().iter().map(|f| quote(&f.name)));
    out.push_str(&header.join(","));
    out.push('\n');

    for projected in projection.iter() {
        let index = if projected.row.index > 0 {
            projected.row.index.to_string()
        } else {
            String::new()
        };
        let mut cells = vec![
            quote(&projected.position.to_string()),
            quote(&index),
            quote(&group_label(projected.parent)),
            quote(&group_label(projected.group)),
        ];
        cells.extend(
            projection
                .columns()
                .iter()
                .map(|f| quote(projected.row.value_or_empty(&f.name))),
        );
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Write the projection as CSV.
///
/// # Errors
///
/// `NoRows` for an empty sheet, `Io` when writing fails.
pub fn write_csv(projection: &Projection<'_>, writer: &mut impl Write) -> Result<(), ExportError> {
    if projection.is_empty() {
        return Err(ExportError::NoRows);
    }
    writer.write_all(render_csv(projection).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// `数据导出_<date>.csv`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("数据导出_{}.csv", date.format("%Y-%m-%d"))
}

/// Export `workbook` into `dir` under [`default_file_name`] for today.
pub fn export_to_dir(workbook: &Workbook, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(default_file_name(chrono::Local::now().date_naive()));
    export_to_file(workbook, &path)?;
    Ok(path)
}

/// Export `workbook` to `path`, creating parent directories.
pub fn export_to_file(workbook: &Workbook, path: &Path) -> Result<(), ExportError> {
    let projection = workbook.projection();
    if projection.is_empty() {
        return Err(ExportError::NoRows);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_csv(&projection, &mut file)?;
    info!(path = %path.display(), rows = projection.len(), "Exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use crate::workbook::AlwaysAnswer;

    fn workbook_with_single_field() -> Workbook {
        let mut wb = Workbook::new();
        wb.toggle_all_fields(false);
        wb.add_field("X", FieldType::Text, false).unwrap();
        wb
    }

    #[test]
    fn header_and_rows_follow_projection() {
        let mut wb = workbook_with_single_field();
        let a = wb.add_row(None).unwrap();
        let b = wb.add_row(None).unwrap();
        wb.set_value(a, "X", "first").unwrap();
        wb.set_value(b, "X", "second").unwrap();
        wb.set_row_index(b, 1).unwrap();

        let csv = render_csv(&wb.projection());
        let mut lines = csv.strip_prefix(BOM).unwrap().lines();
        assert_eq!(lines.next(), Some(r#""总序号","序号","父级分组","分组","X""#));
        assert_eq!(lines.next(), Some(r#""1","1","","","second""#));
        assert_eq!(lines.next(), Some(r#""2","2","","","first""#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn group_and_parent_cells_use_labels() {
        let mut wb = workbook_with_single_field();
        let a = wb.add_group("电机", "Motor", None).unwrap();
        let b = wb.add_group("转速", "Speed", Some(a)).unwrap();
        wb.add_row(Some(b)).unwrap();
        wb.add_row(Some(a)).unwrap();

        let csv = render_csv(&wb.projection());
        let lines: Vec<_> = csv.lines().skip(1).collect();
        assert_eq!(lines[0], r#""1","1","","电机 (Motor)","""#);
        assert_eq!(lines[1], r#""2","1","电机 (Motor)","转速 (Speed)","""#);
    }

    #[test]
    fn quotes_inside_values_are_doubled() {
        let mut wb = workbook_with_single_field();
        let row = wb.add_row(None).unwrap();
        wb.set_value(row, "X", r#"say "hi", twice"#).unwrap();
        let csv = render_csv(&wb.projection());
        assert!(csv.contains(r#""say ""hi"", twice""#));
    }

    #[test]
    fn output_starts_with_bom() {
        let wb = workbook_with_single_field();
        assert!(render_csv(&wb.projection()).starts_with('\u{feff}'));
    }

    #[test]
    fn empty_sheet_is_not_exported() {
        let wb = Workbook::new();
        let mut sink = Vec::new();
        assert!(matches!(
            write_csv(&wb.projection(), &mut sink),
            Err(ExportError::NoRows)
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn export_after_group_removal_lists_rows_as_ungrouped() {
        let mut wb = workbook_with_single_field();
        let g = wb.add_group("A", "SA", None).unwrap();
        wb.add_row(Some(g)).unwrap();
        wb.remove_group(g, &mut AlwaysAnswer(true)).unwrap();
        let csv = render_csv(&wb.projection());
        assert_eq!(csv.lines().nth(1), Some(r#""1","1","","","""#));
    }

    #[test]
    fn default_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(default_file_name(date), "数据导出_2024-03-09.csv");
    }
}
