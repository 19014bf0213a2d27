//! groupsheet
//!
//! A grouped parameter sheet: rows of named fields organized under a
//! hierarchical group tree, with per-group sequence numbers, JSON
//! persistence and CSV export.
//!
//! The core ([`sheet`], [`projection`], [`workbook`]) is pure and
//! synchronous; [`storage`], [`export`], [`config`] and [`logging`] are the
//! thin I/O shell around it.

pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod projection;
pub mod render;
pub mod sheet;
pub mod storage;
pub mod workbook;
