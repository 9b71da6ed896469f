//! EPANET-WQ: extended period tank, pump energy and water quality transport for EPANET networks

pub mod input;
pub mod model;
pub mod hydraulics;
pub mod quality;
pub mod constants;
pub mod output;
pub mod error;
