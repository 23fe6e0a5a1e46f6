pub mod attack;
pub mod commands;
pub mod embed;
pub mod error;
pub mod extract;
pub mod io;
pub mod recover;

pub use commands::{Args, CodecArgs, GlobalArgs, Subcommands};
pub use error::{Error, Result};
