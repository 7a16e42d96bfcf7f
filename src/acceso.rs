use crate::models::{Rol, Usuario};
use crate::sesion::ContextoSesion;
use serde::Serialize;

/// Rutas de la aplicacion protegidas por rol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ruta {
    /// Pagina de ingreso
    Inicio,
    Administrador,
    Vendedor,
    Empleado,
    /// Listado y registro de inmuebles
    Inmuebles,
    Clientes,
}

impl Ruta {
    pub fn path(&self) -> &'static str {
        match self {
            Ruta::Inicio => "/",
            Ruta::Administrador => "/administrador",
            Ruta::Vendedor => "/vendedor",
            Ruta::Empleado => "/empleado",
            Ruta::Inmuebles => "/mostrar",
            Ruta::Clientes => "/clientes",
        }
    }
}

/// Respuesta de la puerta de acceso cuando no se permite la ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redireccion(pub Ruta);

impl Redireccion {
    pub fn path(&self) -> &'static str {
        self.0.path()
    }
}

pub fn ruta_de_rol(rol: Rol) -> Ruta {
    match rol {
        Rol::Administrador => Ruta::Administrador,
        Rol::Vendedor => Ruta::Vendedor,
        Rol::Empleado => Ruta::Empleado,
    }
}

/// Decide si el usuario de la sesion puede ver la ruta. Si no, redirige al
/// ingreso. En `Inicio` un usuario ya identificado va a su pagina de rol.
pub fn proteger(ruta: Ruta, ctx: &ContextoSesion) -> Result<Option<&Usuario>, Redireccion> {
    let usuario = ctx.usuario();
    let login = Redireccion(Ruta::Inicio);

    match ruta {
        // Un usuario inactivo se trata como anonimo para no rebotar entre rutas
        Ruta::Inicio => match usuario {
            Some(u) if u.vigencia.es_activo() => Err(Redireccion(ruta_de_rol(u.rol))),
            _ => Ok(None),
        },
        Ruta::Administrador | Ruta::Inmuebles => match usuario {
            Some(u) if u.rol == Rol::Administrador => Ok(Some(u)),
            _ => Err(login),
        },
        Ruta::Vendedor => match usuario {
            Some(u) if u.rol == Rol::Vendedor => Ok(Some(u)),
            _ => Err(login),
        },
        Ruta::Empleado => match usuario {
            Some(u) if u.rol == Rol::Empleado && u.vigencia.es_activo() => Ok(Some(u)),
            _ => Err(login),
        },
        Ruta::Clientes => match usuario {
            Some(u) => Ok(Some(u)),
            None => Err(login),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vigencia;

    fn usuario(rol: Rol, vigencia: Vigencia) -> ContextoSesion {
        ContextoSesion::con_usuario(Usuario {
            uid: 1,
            email: "x@inmo.com".to_string(),
            nombre: "X".to_string(),
            apellidos: String::new(),
            rol,
            telefono: String::new(),
            vigencia,
        })
    }

    #[test]
    fn test_sin_sesion_redirige_al_ingreso() {
        let ctx = ContextoSesion::anonimo();
        for ruta in [
            Ruta::Administrador,
            Ruta::Vendedor,
            Ruta::Empleado,
            Ruta::Inmuebles,
            Ruta::Clientes,
        ] {
            assert_eq!(proteger(ruta, &ctx).unwrap_err().path(), "/");
        }
        assert_eq!(proteger(Ruta::Inicio, &ctx), Ok(None));
    }

    #[test]
    fn test_rol_equivocado_redirige() {
        let ctx = usuario(Rol::Vendedor, Vigencia::Activo);
        assert_eq!(proteger(Ruta::Administrador, &ctx), Err(Redireccion(Ruta::Inicio)));
        assert_eq!(proteger(Ruta::Empleado, &ctx), Err(Redireccion(Ruta::Inicio)));
        assert!(proteger(Ruta::Vendedor, &ctx).is_ok());
        assert!(proteger(Ruta::Clientes, &ctx).is_ok());
    }

    #[test]
    fn test_empleado_inactivo() {
        let activo = usuario(Rol::Empleado, Vigencia::Activo);
        assert!(proteger(Ruta::Empleado, &activo).is_ok());
        let inactivo = usuario(Rol::Empleado, Vigencia::Eliminado);
        assert_eq!(proteger(Ruta::Empleado, &inactivo), Err(Redireccion(Ruta::Inicio)));
        // El ingreso no lo manda de vuelta a /empleado
        assert_eq!(proteger(Ruta::Inicio, &inactivo), Ok(None));
    }

    #[test]
    fn test_inicio_redirige_segun_rol() {
        let casos = [
            (Rol::Administrador, "/administrador"),
            (Rol::Vendedor, "/vendedor"),
            (Rol::Empleado, "/empleado"),
        ];
        for (rol, path) in casos {
            let ctx = usuario(rol, Vigencia::Activo);
            assert_eq!(proteger(Ruta::Inicio, &ctx).unwrap_err().path(), path);
        }
        let admin = usuario(Rol::Administrador, Vigencia::Activo);
        assert!(proteger(Ruta::Inmuebles, &admin).is_ok());
    }
}
