use crate::acceso::{ruta_de_rol, Ruta};
use crate::error::ErrorApp;
use crate::repos::{ProveedorIdentidad, RepositorioUsuarios};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InicioSesion {
    pub token: String,
    pub redireccion: String,
}

fn iniciar(
    identidad: &impl ProveedorIdentidad,
    usuarios: &impl RepositorioUsuarios,
    email: &str,
    contrasena: &str,
) -> Result<InicioSesion, ErrorApp> {
    let uid = identidad.autenticar(email, contrasena)?;

    let usuario = usuarios
        .obtener_usuario(uid)?
        .ok_or(ErrorApp::PerfilInexistente)?;

    if !usuario.vigencia.es_activo() {
        return Err(ErrorApp::CuentaInactiva);
    }

    let token = identidad.abrir_sesion(uid)?;
    Ok(InicioSesion {
        token,
        redireccion: ruta_de_rol(usuario.rol).path().to_string(),
    })
}

/// Verifica correo y contraseña, abre la sesion y retorna la ruta de
/// destino segun el rol.
pub fn iniciar_sesion(
    identidad: &impl ProveedorIdentidad,
    usuarios: &impl RepositorioUsuarios,
    email: String,
    contrasena: String,
) -> Result<InicioSesion, String> {
    match iniciar(identidad, usuarios, &email, &contrasena) {
        Ok(inicio) => {
            info!(email = %email, destino = %inicio.redireccion, "sesión iniciada");
            Ok(inicio)
        }
        Err(e) => {
            warn!(email = %email, error = %e, "inicio de sesión rechazado");
            Err(e.to_string())
        }
    }
}

/// Cierra la sesion y retorna la ruta de ingreso
pub fn cerrar_sesion(identidad: &impl ProveedorIdentidad, token: String) -> Result<String, String> {
    identidad.cerrar_sesion(&token).map_err(|e| e.to_string())?;
    Ok(Ruta::Inicio.path().to_string())
}
