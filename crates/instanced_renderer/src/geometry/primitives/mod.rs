pub mod cube;

pub use cube::cube;
