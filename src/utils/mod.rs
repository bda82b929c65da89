pub mod csv_export;
pub mod file_operations;
pub mod markup;
pub mod normalize;
pub mod prompt;
pub mod ticket_key;

pub use csv_export::*;
pub use file_operations::*;
pub use markup::*;
pub use normalize::*;
pub use prompt::*;
pub use ticket_key::*;
