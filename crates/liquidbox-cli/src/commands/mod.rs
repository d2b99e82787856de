pub mod build;
pub mod ions;
pub mod molecule;
