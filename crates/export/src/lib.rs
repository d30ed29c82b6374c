#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::ExportError;

mod exporter;
pub use exporter::{ExportSummary, Exporter};

mod ledger;
pub use ledger::{Contribution, ContributionLedger};

mod record;
pub use record::FundTransferRecord;

mod report;
pub use report::{CSV_HEADER, format_timestamp, write_csv};
