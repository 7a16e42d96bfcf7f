use crate::error::ErrorApp;
use crate::models::{Rol, Usuario};
use crate::repos::{ProveedorIdentidad, RepositorioUsuarios};

/// Sesion resuelta una vez por solicitud y pasada explicitamente a cada
/// comando. No hay estado de sesion global.
#[derive(Debug, Clone, Default)]
pub struct ContextoSesion {
    usuario: Option<Usuario>,
}

impl ContextoSesion {
    pub fn anonimo() -> Self {
        ContextoSesion { usuario: None }
    }

    pub fn con_usuario(usuario: Usuario) -> Self {
        ContextoSesion {
            usuario: Some(usuario),
        }
    }

    /// Busca el usuario asociado al token. Un token desconocido, o sin
    /// perfil de usuario, da una sesion anonima.
    pub fn resolver<I, U>(
        identidad: &I,
        usuarios: &U,
        token: Option<&str>,
    ) -> Result<Self, ErrorApp>
    where
        I: ProveedorIdentidad + ?Sized,
        U: RepositorioUsuarios + ?Sized,
    {
        let Some(token) = token else {
            return Ok(Self::anonimo());
        };
        let Some(uid) = identidad.credencial_de_sesion(token)? else {
            return Ok(Self::anonimo());
        };
        Ok(ContextoSesion {
            usuario: usuarios.obtener_usuario(uid)?,
        })
    }

    pub fn usuario(&self) -> Option<&Usuario> {
        self.usuario.as_ref()
    }

    /// Usuario de la sesion, debe existir y estar activo
    pub fn requerir_usuario(&self) -> Result<&Usuario, ErrorApp> {
        match &self.usuario {
            Some(u) if u.vigencia.es_activo() => Ok(u),
            Some(_) => Err(ErrorApp::CuentaInactiva),
            None => Err(ErrorApp::SinSesion),
        }
    }

    pub fn requerir_administrador(&self) -> Result<&Usuario, ErrorApp> {
        let usuario = self.requerir_usuario()?;
        if usuario.rol != Rol::Administrador {
            return Err(ErrorApp::SinPermiso);
        }
        Ok(usuario)
    }
}
