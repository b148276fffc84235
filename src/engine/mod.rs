//! Engine module: the pipeline's leaf components and the CLI handler.

pub mod admission;
pub mod arg_parser;
pub mod cli;
pub mod command;
pub mod progress;
pub mod validate;

pub use admission::{admit, dir_size};
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use command::{CommandError, run_to_file};
pub use validate::{begin_timestamp, is_valid, starts_in_epoch_day};
