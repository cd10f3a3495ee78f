//! Plain-text rendering for the terminal

use std::fmt::Write as _;
use stock_dataset::{ContingencyTable, Dataset, Field, InventorySummary};
use stock_query::{format_currency, DisplayResult};

/// KPI block
pub(crate) fn render_summary(summary: &InventorySummary) -> String {
    format!(
        "Total de pares: {}\nEn stock: {}\nVendidos: {}\nGanancia neta: {}\n",
        summary.total_pairs,
        summary.in_stock,
        summary.sold,
        format_currency(summary.net_profit)
    )
}

/// One line per pair, sheet order
pub(crate) fn render_records(dataset: &Dataset) -> String {
    let headers = Field::ALL
        .iter()
        .map(|field| field.column_name().to_string())
        .chain(std::iter::once("Ganancia".to_string()))
        .collect();

    #[allow(clippy::cast_possible_truncation)]
    let rows = dataset
        .records()
        .iter()
        .map(|record| {
            vec![
                record.model.clone(),
                record.size.to_string(),
                record.status.label().to_string(),
                record.seller.clone().unwrap_or_default(),
                record
                    .profit
                    .map(|p| format_currency(p.trunc() as i64))
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let mut out = grid(headers, rows);
    let _ = writeln!(out, "{} par(es)", dataset.len());
    out
}

/// Contingency table with a trailing total column
pub(crate) fn render_table(table: &ContingencyTable) -> String {
    let headers = std::iter::once(table.group_by().field().column_name().to_string())
        .chain(table.columns().iter().cloned())
        .chain(std::iter::once("Total".to_string()))
        .collect();

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            std::iter::once(row.key.to_string())
                .chain(row.counts.iter().map(ToString::to_string))
                .chain(std::iter::once(row.total().to_string()))
                .collect()
        })
        .collect();

    grid(headers, rows)
}

/// Answer: the side table first, then the message line
pub(crate) fn render_answer(result: &DisplayResult) -> String {
    let mut out = String::new();
    if let Some(table) = &result.table {
        if table.is_empty() {
            out.push_str("(sin resultados)\n");
        } else {
            out.push_str(&render_table(table));
        }
    }
    if !result.message.is_empty() {
        out.push_str(&result.message);
        out.push('\n');
    }
    out
}

/// Values available to each quick filter
pub(crate) fn render_options(dataset: &Dataset) -> String {
    let mut out = String::new();
    for field in Field::ALL {
        let values: Vec<String> = dataset
            .distinct(field)
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(out, "{}: (todos), {}", field.column_name(), values.join(", "));
    }
    out
}

fn grid(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_dataset::{AggregateKind, GroupBy, QuickFilter};
    use stock_test_utils::sample_dataset;

    #[test]
    fn summary_block() {
        let text = render_summary(&sample_dataset().summary());
        assert_eq!(
            text,
            "Total de pares: 12\nEn stock: 6\nVendidos: 6\nGanancia neta: $ 58.501\n"
        );
    }

    #[test]
    fn records_are_aligned() {
        let filter = QuickFilter {
            model: Some("Roja".to_string()),
            ..QuickFilter::default()
        };
        let text = render_records(&sample_dataset().filter(&filter.to_predicates()));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Modelo/Zapatilla  Talle  Estado"));
        assert!(lines[3].contains("Vendido") && lines[3].contains("$ 8.000"));
        assert_eq!(lines[4], "2 par(es)");
    }

    #[test]
    fn table_by_size_has_totals() {
        let stock_dataset::Aggregate::Table(table) =
            sample_dataset().aggregate(AggregateKind::TableBy(GroupBy::Size))
        else {
            panic!("expected table");
        };
        let text = render_table(&table);
        let row_41 = text.lines().find(|l| l.starts_with("41")).unwrap();
        let cells: Vec<&str> = row_41.split_whitespace().collect();

        assert!(text.starts_with("Talle"));
        assert_eq!(cells, vec!["41", "2", "3", "5"]);
    }

    #[test]
    fn answer_shows_table_before_message() {
        let text = render_answer(&DisplayResult::text("Resultado: 3 par(es)."));
        assert_eq!(text, "Resultado: 3 par(es).\n");
        assert!(render_answer(&DisplayResult::empty()).is_empty());
    }

    #[test]
    fn options_list_sellers() {
        let text = render_options(&sample_dataset());
        assert!(text.contains("Vendedor: (todos), Enzo, Laura, Tefi"));
        assert!(text.contains("Talle: (todos), 36, 38, 39, 40, 41, 42, 43, 44"));
    }
}
