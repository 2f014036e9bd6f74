pub mod report;

pub use report::format_inspection;
