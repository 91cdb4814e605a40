pub mod alignment;
pub mod labeling;
pub mod roles;
pub mod scoring;

pub use alignment::*;
pub use labeling::*;
pub use roles::*;
pub use scoring::*;
