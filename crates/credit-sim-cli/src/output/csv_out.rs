use std::error::Error;
use std::io;

use super::columns;
use super::Report;

/// Schedules and listings print one CSV row per entry under a fixed header;
/// everything else prints as `field,value` pairs.
pub fn print_csv(report: &Report) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());

    match columns::rows(report)? {
        Some(set) => {
            wtr.write_record(&set.headers)?;
            for row in &set.rows {
                wtr.write_record(row)?;
            }
        }
        None => {
            wtr.write_record(["field", "value"])?;
            for (field, value) in columns::summary(report)? {
                wtr.write_record([field, value.as_str()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
