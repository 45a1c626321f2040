use std::error::Error;
use tabled::{builder::Builder, Table};

use super::columns::{self, RowSet};
use super::Report;

/// Summary as a two-column table, then the schedule or listing with its own
/// header row, then warnings.
pub fn print_table(report: &Report) -> Result<(), Box<dyn Error>> {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in columns::summary(report)? {
        builder.push_record([field, value.as_str()]);
    }
    println!("{}", Table::from(builder));

    if let Some(set) = columns::rows(report)? {
        println!("\n{}:", set.title);
        print_rows(set);
    }

    let warnings = report.warnings();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {}", w);
        }
    }
    if let Some(methodology) = report.methodology() {
        println!("\nMethodology: {}", methodology);
    }
    Ok(())
}

fn print_rows(set: RowSet) {
    if set.rows.is_empty() {
        println!("(empty)");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(set.headers);
    for row in set.rows {
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}
