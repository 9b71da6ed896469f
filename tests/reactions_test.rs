use approx::{assert_abs_diff_eq, assert_relative_eq};

use epanet_wq::constants::*;
use epanet_wq::model::options::{QualityType, SimulationOptions, UnitSystem};
use epanet_wq::quality::reactions::{bulk_rate, mass_transfer_coefficient, Kinetics};

fn kinetics(quality_type: QualityType) -> Kinetics {
  let mut options = SimulationOptions::default();
  options.quality.quality_type = quality_type;
  Kinetics::new(&options, true)
}

#[test]
fn test_bulk_rate_orders() {
  // zero order: constant rate
  assert_relative_eq!(bulk_rate(5.0, 0.1, 0.0, 0.0), 0.1);
  assert_relative_eq!(bulk_rate(50.0, 0.1, 0.0, 0.0), 0.1);

  assert_relative_eq!(bulk_rate(5.0, -0.1, 1.0, 0.0), -0.5);
  assert_relative_eq!(bulk_rate(5.0, 0.1, 2.0, 0.0), 2.5, max_relative = 1e-12);
  assert_relative_eq!(bulk_rate(4.0, 0.1, 1.5, 0.0), 0.8, max_relative = 1e-12);

  // negative concentrations do not react
  assert_eq!(bulk_rate(-1.0, 0.1, 1.0, 0.0), 0.0);
}

#[test]
fn test_michaelis_menten_kinetics() {
  // c / (climit + c)
  assert_relative_eq!(bulk_rate(2.0, 0.5, -1.0, 2.0), 0.25);
  assert_relative_eq!(bulk_rate(6.0, 0.5, -1.0, 2.0), 0.375);

  // saturates at kb for large concentrations
  assert_abs_diff_eq!(bulk_rate(1.0e6, 0.5, -1.0, 2.0), 0.5, epsilon = 1e-5);
}

#[test]
fn test_limiting_concentration() {
  // growth towards climit
  assert_relative_eq!(bulk_rate(2.0, 0.1, 1.0, 5.0), 0.3, max_relative = 1e-12);
  assert_eq!(bulk_rate(6.0, 0.1, 1.0, 5.0), 0.0);

  // decay towards climit
  assert_relative_eq!(bulk_rate(3.0, -0.1, 1.0, 1.0), -0.2, max_relative = 1e-12);
  assert_eq!(bulk_rate(0.5, -0.1, 1.0, 1.0), 0.0);
}

#[test]
fn test_mass_transfer_regimes() {
  let d = 1.0;
  let schmidt = VISCOSITY / DIFFUSIVITY;

  // stagnant flow uses a Sherwood number of 2
  let kf = mass_transfer_coefficient(d, 1000.0, 1e-9, schmidt, DIFFUSIVITY, VISCOSITY);
  assert_relative_eq!(kf, 2.0 * DIFFUSIVITY / d);

  // turbulent flow
  let flow = 1.0;
  let re = flow / (PI / 4.0) * d / VISCOSITY;
  assert!(re > 2300.0);
  let kf = mass_transfer_coefficient(d, 1000.0, flow, schmidt, DIFFUSIVITY, VISCOSITY);
  let sh = 0.0149 * re.powf(0.88) * schmidt.powf(0.333);
  assert_relative_eq!(kf, sh * DIFFUSIVITY / d, max_relative = 1e-12);

  // laminar flow lies between the stagnant and turbulent values
  let laminar = mass_transfer_coefficient(d, 1000.0, 0.01, schmidt, DIFFUSIVITY, VISCOSITY);
  assert!(laminar > 2.0 * DIFFUSIVITY / d);
  assert!(laminar < kf);
}

#[test]
fn test_pipe_rate_without_mass_transfer() {
  let mut options = SimulationOptions::default();
  options.quality.quality_type = QualityType::Chemical;
  options.quality.diffusivity = 0.0;
  let kinetics = Kinetics::new(&options, true);

  assert_eq!(kinetics.schmidt, 0.0);
  assert_relative_eq!(kinetics.pipe_rate(1.0, 1000.0, 1.0, 0.5), 2.0);

  // wall coefficients in metres are converted to feet
  options.unit_system = UnitSystem::SI;
  let kinetics = Kinetics::new(&options, true);
  assert_relative_eq!(kinetics.pipe_rate(1.0, 1000.0, 1.0, 0.5), 2.0 / MperFT, max_relative = 1e-12);
}

#[test]
fn test_first_order_wall_reaction() {
  let kinetics = kinetics(QualityType::Chemical);
  let kf = kinetics.pipe_rate(1.0, 1000.0, 1.0, -0.5);
  assert!(kf < 0.0);

  assert_relative_eq!(kinetics.wall_rate(4.0, 1.0, -0.5, kf), 4.0 * kf);
  // no wall coefficient, no wall reaction
  assert_eq!(kinetics.wall_rate(4.0, 1.0, 0.0, kf), 0.0);

  let r = kinetics.pipe_react(4.0, 0.0, -0.5, kf, 1.0, 60);
  assert_eq!(r.dc_bulk, 0.0);
  assert_relative_eq!(r.dc_wall, 4.0 * kf * 60.0);
  assert_relative_eq!(r.c, 4.0 + r.dc_wall);
}

#[test]
fn test_zero_order_wall_reaction_is_mass_transfer_limited() {
  let mut options = SimulationOptions::default();
  options.quality.quality_type = QualityType::Chemical;
  options.quality.wall_order = 0.0;
  let kinetics = Kinetics::new(&options, true);

  let kf = kinetics.pipe_rate(1.0, 1000.0, 1.0, -1.0);
  // a small concentration cannot sustain the full wall demand
  let limited = kinetics.wall_rate(1e-6, 1.0, -1.0, kf);
  assert_relative_eq!(limited, -1e-6 * kf * 4.0, max_relative = 1e-12);
  // a large one can
  assert_relative_eq!(kinetics.wall_rate(1e12, 1.0, -1.0, kf), -4.0);
}

#[test]
fn test_bulk_decay_of_pipe_segment() {
  let kinetics = kinetics(QualityType::Chemical);
  let r = kinetics.pipe_react(10.0, -0.001, 0.0, 0.0, 1.0, 60);
  assert_relative_eq!(r.dc_bulk, -0.6, max_relative = 1e-12);
  assert_relative_eq!(r.c, 9.4, max_relative = 1e-12);

  // concentrations never go negative
  let r = kinetics.pipe_react(0.1, -0.1, 0.0, 0.0, 1.0, 60);
  assert_eq!(r.c, 0.0);
}

#[test]
fn test_water_age_grows_with_time() {
  let kinetics = kinetics(QualityType::Age);
  let r = kinetics.pipe_react(2.0, -0.1, -0.5, 1.0, 1.0, 1800);
  assert_relative_eq!(r.c, 2.5);
  assert_eq!(r.dc_bulk, 0.0);

  let (c, dc) = kinetics.tank_react(1.0, -0.1, 3600);
  assert_relative_eq!(c, 2.0);
  assert_eq!(dc, 0.0);
}

#[test]
fn test_tank_reactions_can_be_disabled() {
  let mut options = SimulationOptions::default();
  options.quality.quality_type = QualityType::Chemical;

  let inert = Kinetics::new(&options, false);
  assert_eq!(inert.tank_react(5.0, -0.1, 60), (5.0, 0.0));

  let reactive = Kinetics::new(&options, true);
  let (c, dc) = reactive.tank_react(5.0, -0.001, 60);
  assert_relative_eq!(dc, -0.3, max_relative = 1e-12);
  assert_relative_eq!(c, 4.7, max_relative = 1e-12);
}
