pub mod run_result;
pub mod stage;
pub mod test_case;

pub use run_result::*;
pub use stage::*;
pub use test_case::*;
