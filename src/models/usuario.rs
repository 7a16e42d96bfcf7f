use super::Vigencia;
use crate::error::ErrorApp;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Administrador,
    Empleado,
    Vendedor,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Administrador => "administrador",
            Rol::Empleado => "empleado",
            Rol::Vendedor => "vendedor",
        }
    }
}

impl FromStr for Rol {
    type Err = ErrorApp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrador" => Ok(Rol::Administrador),
            "empleado" => Ok(Rol::Empleado),
            "vendedor" => Ok(Rol::Vendedor),
            _ => Err(ErrorApp::Validacion("Rol de usuario desconocido.".to_string())),
        }
    }
}

impl ToSql for Rol {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Rol {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Cuenta interna del personal. `uid` es el id de la credencial en el
/// proveedor de identidad.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Usuario {
    pub uid: i64,
    pub email: String,
    pub nombre: String,
    pub apellidos: String,
    pub rol: Rol,
    pub telefono: String,
    pub vigencia: Vigencia,
}

/// Datos para registrar un nuevo usuario (credencial + perfil)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NuevoUsuario {
    pub email: String,
    pub contrasena: String,
    pub nombre: String,
    pub apellidos: String,
    pub rol: Rol,
    pub telefono: String,
}

/// Cambios parciales sobre un usuario. Los campos en `None` no se tocan.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CambiosUsuario {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub rol: Option<Rol>,
    pub telefono: Option<String>,
}
