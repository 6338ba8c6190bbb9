// Lets `#[derive(StateData)]` refer to this crate by name from inside it.
extern crate self as prefer_node_label;

pub mod config;
pub mod core;
pub mod plugins;
pub mod printer;
pub mod test_util;
