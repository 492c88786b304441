//! Image references and collections of them.

pub mod identifier;
pub mod list;

pub use identifier::{ImageIdentifier, ImageTag};
pub use list::ContainerImageList;
