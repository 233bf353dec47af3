use super::domain::TrendPoint;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct TrendRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Average Price")]
    avg_price: i64,
}

/// Writes the trend as a two-column CSV with a `Year,Average Price` header.
pub fn write_trend_csv<W: Write>(writer: W, trend: &[TrendPoint]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in trend {
        csv_writer.serialize(TrendRow {
            year: point.year,
            avg_price: point.avg_price,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::engine::compute_valuation;
    use crate::valuation::domain::PropertyDetails;

    #[test]
    fn writes_header_and_one_row_per_year() {
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let result = compute_valuation(&details, 2024).expect("valuation");

        let mut buffer = Vec::new();
        write_trend_csv(&mut buffer, &result.year_by_year_trend).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");

        assert_eq!(
            text,
            "Year,Average Price\n2021,600000\n2022,617143\n2023,582857\n2024,567857\n"
        );
    }
}
