pub mod cliente;
pub mod inmueble;
pub mod usuario;
pub mod vigencia;

pub use cliente::*;
pub use inmueble::*;
pub use usuario::*;
pub use vigencia::*;
