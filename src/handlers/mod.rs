// Handler modules
pub mod check;
pub mod generate;
pub mod print;

// Re-export all handler functions
pub use check::handle_check;
pub use generate::handle_generate;
pub use print::handle_print;
