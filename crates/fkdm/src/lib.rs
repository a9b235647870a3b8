//! `fkdm` - community-watch (FKDM) activity reporting
//!
//! This library provides the session store, report repository, report form,
//! presenter and navigation guard behind the `fkdm` command-line tool.
//! Everything persists through a [`storage::SlotStore`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod navigation;
pub mod presenter;
pub mod report;
pub mod repository;
pub mod session;
pub mod storage;

pub use app::{App, Denied};
pub use config::Config;
pub use error::{Error, Result};
pub use form::ReportForm;
pub use logging::init_logging;
pub use navigation::{guard, Navigation, Route};
pub use report::{Report, ReportField, ReportFields};
pub use repository::{ReportRepository, SlotReportRepository};
pub use session::{ProfileUpdate, SessionStore, User};
pub use storage::{MemoryStore, SlotStore, SqliteStore};
