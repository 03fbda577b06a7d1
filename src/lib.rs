//! BAST Generator Library
//!
//! Generates BAST (Berita Acara Serah Terima) delivery-receipt PDFs from
//! shipment header metadata and an uploaded parcel table. The pipeline is:
//! - Read the uploaded table (XLSX first sheet or CSV)
//! - Validate header fields and the mandatory parcel-count column
//! - Sum the parcel counts into the TOTAL KOLI figure
//! - Compose the fixed receipt template and stamp page footers via a
//!   deferred two-pass pagination step
//!
//! # Example
//!
//! ```no_run
//! use bast_gen::header::ShipmentHeader;
//! use bast_gen::pdf::{render_receipt, RenderOptions};
//! use bast_gen::table::ParcelTable;
//! use chrono::{FixedOffset, NaiveDate, NaiveTime};
//! use std::path::Path;
//!
//! let header = ShipmentHeader {
//!     date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
//!     time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
//!     warehouse: "WH-A".to_string(),
//!     courier: "ABC Express".to_string(),
//!     driver: "John".to_string(),
//!     police: "B1234XYZ".to_string(),
//!     offset: FixedOffset::east_opt(7 * 3600).unwrap(),
//! };
//!
//! let table = ParcelTable::from_path(Path::new("manifest.csv")).expect("readable table");
//! let pdf = render_receipt(&header, &table, &RenderOptions::default())
//!     .expect("receipt rendered");
//! std::fs::write(header.output_filename(), pdf).expect("written");
//! ```

pub mod date;
pub mod error;
pub mod header;
pub mod layout;
pub mod pdf;
pub mod table;
pub mod validate;

// Re-export commonly used items
pub use error::{Error, Result};
