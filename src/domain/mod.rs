// Domain layer: letter numbering, models and ports (interfaces). No I/O here.

pub mod model;
pub mod numbering;
pub mod ports;
