/// Some useful statistics.
pub(crate) mod utils;

/// Checks the pre-conditions of parameters.
pub(crate) mod checker;
