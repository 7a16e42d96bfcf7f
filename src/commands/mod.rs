pub mod clientes;
pub mod config;
pub mod inmuebles;
pub mod sesion;
pub mod usuarios;
