pub mod copy;
pub mod drives;
pub mod flags;
pub mod uf2;
pub mod upload;
pub mod volume;
