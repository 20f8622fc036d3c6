pub mod allocation;
pub mod assignment;
pub mod catalog;
pub mod import;
pub mod load;
pub mod upload;

pub use import::ImportKind;
pub use load::{LoadReport, LoadStatus};
pub use upload::{RecordHandler, RecordOutcome, UploadQueue};
