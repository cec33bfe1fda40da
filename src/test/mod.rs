pub mod utils;
pub use utils::test_utils;

mod admin;
mod courses;
