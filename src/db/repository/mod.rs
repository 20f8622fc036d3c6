mod college;
mod course;
mod department;
mod faculty;
mod room;
mod semester;
mod settings;

pub use college::*;
pub use course::*;
pub use department::*;
pub use faculty::*;
pub use room::*;
pub use semester::*;
pub use settings::*;

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
