use std::collections::HashMap;

use crate::domain::Variant;
use crate::engine::{
    CellContext, CellValue, ColumnDef, EngineError, PaginationState, Table, TableOptions,
    TableState,
};
use crate::record::Person;

pub const SELECT_COLUMN: &str = "select";
pub const ID_COLUMN: &str = "id";

const INDENT: &str = "  ";
const EXPANDED_MARKER: &str = "▼";
const COLLAPSED_MARKER: &str = "▶";
const LEAF_MARKER: &str = "●";

fn render_select(ctx: &CellContext<'_, Person>) -> String {
    let mark = if ctx.is_selected {
        "[x]"
    } else if ctx.is_some_selected {
        "[-]"
    } else {
        "[ ]"
    };
    mark.to_string()
}

// Indentation by depth, then the expand control (or a fixed marker for leaf rows).
fn render_tree_id(ctx: &CellContext<'_, Person>) -> String {
    let marker = match (ctx.can_expand, ctx.is_expanded) {
        (true, true) => EXPANDED_MARKER,
        (true, false) => COLLAPSED_MARKER,
        (false, _) => LEAF_MARKER,
    };
    format!("{}{marker} {}", INDENT.repeat(ctx.row.depth), ctx.row.original.id)
}

fn data_columns() -> Vec<ColumnDef<Person>> {
    vec![
        ColumnDef::accessor("firstName", "First Name", |p: &Person| {
            CellValue::Text(p.first_name.clone())
        }),
        ColumnDef::accessor("lastName", "Last Name", |p: &Person| {
            CellValue::Text(p.last_name.clone())
        }),
        ColumnDef::accessor("email", "Email", |p: &Person| {
            CellValue::Text(p.email.clone())
        }),
        ColumnDef::accessor("jobTitle", "Job Title", |p: &Person| {
            CellValue::Text(p.job_title.clone())
        }),
        ColumnDef::accessor("age", "Age", |p: &Person| CellValue::Integer(p.age)),
    ]
}

pub fn columns(variant: Variant) -> Vec<ColumnDef<Person>> {
    match variant {
        Variant::Flat => data_columns(),
        Variant::Nested => {
            let mut columns = vec![
                ColumnDef::display(SELECT_COLUMN, "", render_select).enable_hiding(false),
                // Sorting stays enabled here, the header action skips this column instead.
                ColumnDef::accessor(ID_COLUMN, "ID", |p: &Person| CellValue::Integer(p.id))
                    .cell(render_tree_id),
            ];
            columns.extend(data_columns());
            columns
        }
    }
}

pub fn initial_visibility(variant: Variant) -> HashMap<String, bool> {
    match variant {
        Variant::Flat => [
            ("firstName", false),
            ("lastName", true),
            ("email", true),
            ("jobTitle", true),
            ("age", true),
        ]
        .into_iter()
        .map(|(id, visible)| (id.to_string(), visible))
        .collect(),
        Variant::Nested => HashMap::new(),
    }
}

pub fn options(variant: Variant) -> TableOptions<Person> {
    match variant {
        Variant::Flat => TableOptions::default()
            .enable_filtering(false)
            .enable_pagination(false)
            .enable_expanding(false)
            .enable_row_selection(false),
        Variant::Nested => TableOptions::default().get_sub_rows(Person::sub_rows),
    }
}

pub fn build_table(
    variant: Variant,
    rows: Vec<Person>,
    page_size: usize,
) -> Result<Table<Person>, EngineError> {
    let state = TableState {
        column_visibility: initial_visibility(variant),
        pagination: PaginationState {
            page_index: 0,
            page_size,
        },
        ..TableState::default()
    };
    Table::new(rows, columns(variant), options(variant)).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RowId;
    use crate::record::fixtures::{person, with_children};

    #[test]
    fn flat_variant_hides_first_name_and_only_sorts() {
        let table = build_table(Variant::Flat, vec![person(1, "Ann", 30)], 10).unwrap();
        let headers: Vec<&str> = table.headers().iter().map(|h| h.label).collect();
        assert_eq!(headers, vec!["Last Name", "Email", "Job Title", "Age"]);
        assert!(!table.options().enable_pagination);
        assert!(table.options().get_sub_rows.is_none());
    }

    #[test]
    fn nested_variant_renders_tree_markers() {
        let rows = vec![
            with_children(person(1, "Ann", 30), vec![person(2, "Ben", 5)]),
            person(3, "Cid", 40),
        ];
        let mut table = build_table(Variant::Nested, rows, 10).unwrap();
        let id_column = table.column(ID_COLUMN).unwrap();

        let model = table.row_model();
        assert_eq!(table.render_cell(&model.rows[0], id_column), "▶ 1");
        assert_eq!(table.render_cell(&model.rows[1], id_column), "● 3");
        drop(model);

        table.toggle_row_expanded(&RowId::from("0")).unwrap();
        let model = table.row_model();
        let id_column = table.column(ID_COLUMN).unwrap();
        assert_eq!(table.render_cell(&model.rows[0], id_column), "▼ 1");
        assert_eq!(table.render_cell(&model.rows[1], id_column), "  ● 2");
    }

    #[test]
    fn select_column_shows_partial_selection() {
        let rows = vec![with_children(
            person(1, "Ann", 30),
            vec![person(2, "Ben", 5), person(3, "Cat", 7)],
        )];
        let mut table = build_table(Variant::Nested, rows, 10).unwrap();
        table.toggle_row_selected(&RowId::from("0.1")).unwrap();
        let model = table.row_model();
        let select = table.column(SELECT_COLUMN).unwrap();
        assert_eq!(table.render_cell(&model.rows[0], select), "[-]");
    }

    #[test]
    fn id_column_still_declares_sorting() {
        let table = build_table(Variant::Nested, vec![], 10).unwrap();
        assert!(table.column(ID_COLUMN).unwrap().can_sort());
        assert!(!table.column(SELECT_COLUMN).unwrap().can_sort());
    }
}
