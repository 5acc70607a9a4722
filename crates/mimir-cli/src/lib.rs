pub mod commands;
pub mod error;
pub mod output;

pub use commands::{COMMANDS, Command};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_timestamp, print_help, print_memory, print_saved, truncate_string};
