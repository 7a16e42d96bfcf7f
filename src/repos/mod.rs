//! Interfaces hacia los servicios externos (base de documentos, identidad).
//! Los comandos solo dependen de estos traits; `Database` los implementa
//! sobre SQLite.

pub mod clientes;
pub mod identidad;
pub mod inmuebles;
pub mod usuarios;

use crate::error::ErrorApp;
use crate::models::{
    CambiosCliente, CambiosInmueble, CambiosUsuario, Cliente, Inmueble, NuevoCliente,
    NuevoInmueble, NuevoUsuario, Usuario,
};
use chrono::{DateTime, Utc};

pub trait RepositorioUsuarios {
    /// Inserta el perfil con el uid asignado por el proveedor de identidad
    fn insertar_usuario(&self, uid: i64, datos: &NuevoUsuario) -> Result<Usuario, ErrorApp>;
    /// Busca por uid sin filtrar vigencia (la puerta de acceso decide)
    fn obtener_usuario(&self, uid: i64) -> Result<Option<Usuario>, ErrorApp>;
    fn listar_usuarios(&self) -> Result<Vec<Usuario>, ErrorApp>;
    fn listar_usuarios_activos(&self) -> Result<Vec<Usuario>, ErrorApp>;
    fn contar_administradores_activos(&self) -> Result<i64, ErrorApp>;
    fn actualizar_usuario(&self, uid: i64, cambios: &CambiosUsuario) -> Result<Usuario, ErrorApp>;
    fn eliminar_usuario(&self, uid: i64) -> Result<(), ErrorApp>;
}

pub trait RepositorioClientes {
    fn insertar_cliente(&self, datos: &NuevoCliente) -> Result<Cliente, ErrorApp>;
    /// Solo clientes activos
    fn obtener_cliente(&self, uid: i64) -> Result<Option<Cliente>, ErrorApp>;
    fn listar_clientes_activos(&self) -> Result<Vec<Cliente>, ErrorApp>;
    fn actualizar_cliente(&self, uid: i64, cambios: &CambiosCliente) -> Result<Cliente, ErrorApp>;
    fn eliminar_cliente(&self, uid: i64) -> Result<(), ErrorApp>;
}

pub trait RepositorioInmuebles {
    fn existe_codigo_activo(&self, codigo: &str) -> Result<bool, ErrorApp>;
    fn insertar_inmueble(&self, datos: &NuevoInmueble) -> Result<Inmueble, ErrorApp>;
    fn asignar_imagenes(&self, id: i64, urls: &[String]) -> Result<Inmueble, ErrorApp>;
    fn obtener_inmueble(&self, id: i64) -> Result<Option<Inmueble>, ErrorApp>;
    fn buscar_por_codigo(&self, codigo: &str) -> Result<Option<Inmueble>, ErrorApp>;
    fn listar_inmuebles_activos(&self) -> Result<Vec<Inmueble>, ErrorApp>;
    fn actualizar_inmueble(&self, id: i64, cambios: &CambiosInmueble) -> Result<Inmueble, ErrorApp>;
    fn eliminar_inmueble(&self, id: i64) -> Result<(), ErrorApp>;
}

/// Proveedor de identidad: credenciales, sesiones y recuperacion.
pub trait ProveedorIdentidad {
    /// Crea la credencial y retorna su id (que sera el uid del usuario)
    fn registrar_credencial(&self, email: &str, contrasena: &str) -> Result<i64, ErrorApp>;
    fn autenticar(&self, email: &str, contrasena: &str) -> Result<i64, ErrorApp>;
    fn abrir_sesion(&self, credencial_id: i64) -> Result<String, ErrorApp>;
    fn cerrar_sesion(&self, token: &str) -> Result<(), ErrorApp>;
    fn credencial_de_sesion(&self, token: &str) -> Result<Option<i64>, ErrorApp>;
    fn crear_token_restablecimiento(
        &self,
        email: &str,
        ahora: DateTime<Utc>,
    ) -> Result<String, ErrorApp>;
    fn restablecer_contrasena(
        &self,
        token: &str,
        nueva: &str,
        ahora: DateTime<Utc>,
    ) -> Result<(), ErrorApp>;
}

/// Ultimo envio de recuperacion por usuario
pub trait RegistroRestablecimientos {
    fn ultimo_envio(&self, usuario_id: i64) -> Result<Option<DateTime<Utc>>, ErrorApp>;
    fn registrar_envio(&self, usuario_id: i64, instante: DateTime<Utc>) -> Result<(), ErrorApp>;
}
