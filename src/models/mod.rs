pub mod course;
pub mod enrollment;
pub mod timestamp;
pub mod user;

pub use course::*;
pub use enrollment::*;
pub use user::*;
