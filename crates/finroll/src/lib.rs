//! Finroll CLI tools.
//!
//! This crate provides command-line tools over a JSON balance snapshot:
//!
//! - `finroll-report`: Render a balance sheet, cash-flow statement or
//!   dashboard summary
//! - `finroll-check`: Report data-quality problems in a snapshot
//!
//! # Example Usage
//!
//! ```bash
//! finroll-report snapshot.json balance-sheet
//! finroll-report snapshot.json cash-flow --format csv
//! finroll-report snapshot.json summary expense --limit 3
//! finroll-check snapshot.json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod render;
pub mod snapshot;
