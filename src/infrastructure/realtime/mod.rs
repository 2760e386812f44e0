mod hub;
mod socket_layer;

pub use hub::*;
pub use socket_layer::*;
