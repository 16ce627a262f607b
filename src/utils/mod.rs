pub mod crypto;
pub mod marks;
