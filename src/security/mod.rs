mod aes;
mod ecdsa;
mod hmac;
mod sha;

pub use aes::*;
pub use ecdsa::*;
pub use hmac::*;
pub use sha::*;
