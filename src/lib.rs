// Library entry exposing the filter core and its command-line driver.
pub mod core;
pub mod filter;
