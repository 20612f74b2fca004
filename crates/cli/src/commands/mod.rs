pub mod predict;
pub mod remote;
