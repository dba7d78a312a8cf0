// Domain layer: result model, locations and ports. No I/O here.

pub mod location;
pub mod model;
pub mod ports;
