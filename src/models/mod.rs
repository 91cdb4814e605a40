pub mod caption;
pub mod classification;
pub mod token;
pub mod transcribe;

pub use caption::*;
pub use classification::*;
pub use token::*;
pub use transcribe::*;
