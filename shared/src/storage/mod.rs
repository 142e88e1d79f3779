//! Storage traits and implementations.
//!
//! This module provides the persistence collaborator for computed reports.
//! The `ReportStore` trait defines the interface, allowing different
//! implementations (filesystem, in-memory).

pub mod report_store;

pub use report_store::{
    sanitize_identifier, FileReportStore, InMemoryReportStore, ReportStore, StorageFormat,
    StoreError, StoredReport,
};
