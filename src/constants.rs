#![allow(non_upper_case_globals)]

pub const TINY: f64 = 1e-6;
pub const BIG: f64 = 1e10;
pub const CBIG: f64 = 1e8;

pub const QZERO: f64 = 1e-6; // equivalent to zero flow (cfs)
pub const RQTOL: f64 = 1e-7; // default low flow resistance tolerance
pub const HTOL: f64 = 0.0005; // default head tolerance (ft)

pub const PI: f64 = std::f64::consts::PI;

pub const LperFT3: f64 = 28.317;
pub const MperFT: f64 = 0.3048;
pub const GPMperCFS: f64 = 448.831;
pub const SECperDAY: f64 = 86400.0;
pub const KWperHP: f64 = 0.7457;

pub const EPUMP: f64 = 75.0; // default pump efficiency (%)
pub const SPGRAV: f64 = 1.0; // default specific gravity
pub const CTOL: f64 = 0.01; // default water quality tolerance
pub const DIFFUSIVITY: f64 = 1.3e-8; // diffusivity of chlorine at 20 deg C (ft^2/s)
pub const VISCOSITY: f64 = 1.1e-5; // kinematic viscosity of water at 20 deg C (ft^2/s)

pub const TRACE_QUALITY: f64 = 100.0; // quality held at the trace node (%)
