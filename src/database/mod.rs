pub mod oa_table;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use oa_table::*;
