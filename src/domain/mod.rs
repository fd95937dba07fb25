// Domain layer: core models and the collaborator ports.

pub mod model;
pub mod ports;
