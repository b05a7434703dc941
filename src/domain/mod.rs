// Domain layer: query/record models and the ports the loader is written against.

pub mod model;
pub mod ports;
