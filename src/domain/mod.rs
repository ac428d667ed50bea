// Domain layer: address/country models, ports, and the pure text and
// response logic. No I/O here.

pub mod extract;
pub mod model;
pub mod normalize;
pub mod ports;
