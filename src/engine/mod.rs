//! Engine module: hash primitives, the exclusive token, and the CLI driver

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod token;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{HashPrimitives, Signers, crc32_decimal, md5_hex};
pub use token::{ExclusiveToken, TokenGuard};
