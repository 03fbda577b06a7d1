//! Shipment header metadata
//!
//! The header is collected once per invocation, validated, and then only read.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

/// Header fields printed at the top of the receipt.
///
/// All fields are free text except the date/time; the UTC offset is resolved
/// once at startup (see [`crate::date::parse_utc_offset`]) and carried here so
/// every formatted timestamp agrees with the filename.
#[derive(Debug, Clone)]
pub struct ShipmentHeader {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub warehouse: String,
    pub courier: String,
    pub driver: String,
    pub police: String,
    pub offset: FixedOffset,
}

impl ShipmentHeader {
    /// The shipment date/time as an offset-aware datetime.
    pub fn datetime(&self) -> DateTime<FixedOffset> {
        let naive = self.date.and_time(self.time);
        match self.offset.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => dt,
            // A fixed offset has no DST gaps or folds; this arm is unreachable
            // but keeps the conversion total.
            _ => self.offset.from_utc_datetime(&(naive - self.offset)),
        }
    }

    /// Datetime string printed in the header block, e.g.
    /// `20/11/2025 14:30:05 +0700`.
    pub fn datetime_label(&self) -> String {
        self.datetime().format("%d/%m/%Y %H:%M:%S %z").to_string()
    }

    /// Download filename combining the header fields and formatted datetime:
    /// `{warehouse}_{courier}_{police}_{YYYYmmdd_HHMMSS}_{offset}.pdf`.
    pub fn output_filename(&self) -> String {
        format!(
            "{}_{}_{}_{}.pdf",
            self.warehouse,
            self.courier,
            self.police,
            self.datetime().format("%Y%m%d_%H%M%S_%z"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ShipmentHeader {
        ShipmentHeader {
            date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
            time: NaiveTime::from_hms_opt(14, 30, 5).unwrap(),
            warehouse: "WH-A".to_string(),
            courier: "ABC Express".to_string(),
            driver: "John".to_string(),
            police: "B1234XYZ".to_string(),
            offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        }
    }

    #[test]
    fn test_datetime_label_includes_offset() {
        let header = sample_header();
        assert_eq!(header.datetime_label(), "20/11/2025 14:30:05 +0700");
    }

    #[test]
    fn test_output_filename_pattern() {
        let header = sample_header();
        assert_eq!(
            header.output_filename(),
            "WH-A_ABC Express_B1234XYZ_20251120_143005_+0700.pdf"
        );
    }

    #[test]
    fn test_datetime_keeps_wall_clock() {
        let header = sample_header();
        let dt = header.datetime();
        assert_eq!(dt.naive_local(), header.date.and_time(header.time));
    }
}
