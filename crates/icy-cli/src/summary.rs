use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use icy_scaler::{ColumnSelection, FittedIcyScaler};

use crate::commands::TransformSummary;

pub fn print_columns(selection: &ColumnSelection) {
    println!("{}", columns_table(selection));
}

pub fn print_fit_summary(fitted: &FittedIcyScaler) {
    println!("{}", fit_table(fitted));
    println!("Output features: {}", fitted.n_features_out());
}

pub fn print_transform_summary(summary: &TransformSummary) {
    if let Some(path) = &summary.output {
        println!("Output: {}", path.display());
        println!(
            "Matrix: {} rows x {} columns ({})",
            summary.rows,
            summary.columns,
            if summary.sparse { "sparse" } else { "dense" }
        );
    }
}

pub fn columns_table(selection: &ColumnSelection) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Column"), header_cell("Kind")]);
    apply_table_style(&mut table);
    for name in &selection.categorical {
        table.add_row(vec![Cell::new(name), kind_cell("categorical")]);
    }
    for name in &selection.continuous {
        table.add_row(vec![Cell::new(name), kind_cell("continuous")]);
    }
    table
}

/// One row per fitted column: categories for categorical ones, λ and the
/// Box-Cox output range for continuous ones.
pub fn fit_table(fitted: &FittedIcyScaler) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Categories"),
        header_cell("Lambda"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    if let Some(encoder) = fitted.categorical_encoder() {
        for column in encoder.columns() {
            let count = encoder
                .label_encoder(column)
                .map_or(0, icy_scaler::LabelEncoder::n_classes);
            table.add_row(vec![
                Cell::new(column),
                kind_cell("categorical"),
                Cell::new(count),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]);
        }
    }

    if let Some(min_max) = fitted.min_max() {
        let bounds = min_max.data_min().iter().zip(min_max.data_max());
        for ((column, lambda), (min, max)) in fitted.lambdas().into_iter().zip(bounds) {
            table.add_row(vec![
                Cell::new(column),
                kind_cell("continuous"),
                dim_cell("-"),
                Cell::new(format!("{lambda:.4}")),
                Cell::new(format!("{min:.4}")),
                Cell::new(format!("{max:.4}")),
            ]);
        }
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn kind_cell(kind: &str) -> Cell {
    let color = if kind == "categorical" {
        Color::Magenta
    } else {
        Color::Green
    };
    Cell::new(kind).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
