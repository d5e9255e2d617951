//! CLI command handlers, one file per subcommand.

mod completions;
mod copy;
mod fetch;
mod pipe;

pub use completions::run_completions;
pub use copy::run_copy;
pub use fetch::{parse_header_args, run_fetch};
pub use pipe::run_pipe;
