//! Plain-text rendering of a workbook for the terminal.

use crate::projection::Projection;
use crate::sheet::{FieldRegistry, GroupTree, RowStore};
use std::fmt::Write;

/// Placeholder for an empty cell.
const EMPTY_CELL: &str = "-";

fn cell(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_CELL
    } else {
        value
    }
}

/// Render the projected sheet: a column header, then every row in display
/// order with a banner line in front of each group's first row.
pub fn render_sheet(projection: &Projection<'_>) -> String {
    let mut out = String::new();

    if projection.is_empty() {
        out.push_str("(no rows)\n");
        return out;
    }

    let mut header = vec!["总序号".to_string(), "id".to_string(), "序号".to_string()];
    header.extend(projection.columns().iter().map(|f| f.name.clone()));
    let _ = writeln!(out, "{}", header.join(" | "));

    for projected in projection.iter() {
        if projected.header {
            let banner = match (projected.group, projected.group_id) {
                (Some(group), _) => match projected.parent {
                    Some(parent) => format!("{group} < {}", parent.name),
                    None => group.to_string(),
                },
                (None, Some(id)) => format!("missing group {id}"),
                (None, None) => "ungrouped".to_string(),
            };
            let _ = writeln!(out, "== {banner} ==");
        }

        let mut line = vec![
            projected.position.to_string(),
            projected.row.id().to_string(),
            projected.row.index.to_string(),
        ];
        line.extend(
            projection
                .columns()
                .iter()
                .map(|f| cell(projected.row.value_or_empty(&f.name)).to_string()),
        );
        let _ = writeln!(out, "{}", line.join(" | "));
    }
    out
}

/// Render the group tree in depth-first order, indented by depth, with the
/// number of rows tagged with each group.
pub fn render_groups(groups: &GroupTree, rows: &RowStore) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("(no groups)\n");
        return out;
    }
    for &id in groups.depth_first_order() {
        let Some(group) = groups.get(id) else {
            continue;
        };
        let count = rows.scope(Some(id)).count();
        let _ = writeln!(
            out,
            "{}[{}] {} ({} rows)",
            "  ".repeat(groups.depth(id)),
            id,
            group,
            count
        );
    }
    out
}

/// Render the field schema with type labels and flags.
pub fn render_fields(fields: &FieldRegistry) -> String {
    let mut out = String::new();
    for field in fields.iter() {
        let _ = writeln!(
            out,
            "{:>3}  {}  [{}]{}{}",
            field.order,
            field.name,
            field.field_type.label(),
            if field.required { " required" } else { "" },
            if field.visible { "" } else { " hidden" },
        );
    }
    out
}
