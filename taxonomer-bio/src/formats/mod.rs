pub mod taxtable;

pub use taxtable::Taxtable;
