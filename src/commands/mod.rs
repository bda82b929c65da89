pub mod generate;
pub mod list;
pub mod projects;
pub mod prompt;

pub use generate::*;
pub use list::*;
pub use projects::*;
pub use prompt::*;
