// Domain layer: the contract record, wizard vocabulary and the ports to the
// outside services. No I/O here.

pub mod model;
pub mod ports;
