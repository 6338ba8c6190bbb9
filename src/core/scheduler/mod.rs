pub mod context;
pub mod cycle_state;
pub mod framework;
pub mod handle;
pub mod interface;
pub mod kube_scheduler;
pub mod normalize;
pub mod registry;
pub mod status;
