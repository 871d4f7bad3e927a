pub mod aggregate;
pub mod classify;
pub mod dates;
pub mod models;
pub mod otp;
pub mod report;
pub mod schema;
pub mod taxonomy;
pub mod workbook;
