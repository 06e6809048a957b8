pub mod catalog;
pub mod generator;
pub mod resolver;
pub mod search;

pub use generator::ImageGenerator;
pub use resolver::{AvatarResolver, AvatarTier};
