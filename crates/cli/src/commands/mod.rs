//! One module per subcommand.

pub mod check;
pub mod discover;
pub mod sections;
