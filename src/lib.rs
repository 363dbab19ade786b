pub mod calibration;
pub mod elo;
pub mod features;
pub mod games;
pub mod model;
pub mod predict;
pub mod store;
pub mod synthetic;
pub mod teams;
