use crate::error::ErrorApp;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Estado de vida de un registro. Un registro eliminado nunca se borra
/// fisicamente y nunca vuelve a `Activo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vigencia {
    Activo,
    Eliminado,
}

impl Vigencia {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vigencia::Activo => "ACTIVO",
            Vigencia::Eliminado => "ELIMINADO",
        }
    }

    pub fn es_activo(&self) -> bool {
        *self == Vigencia::Activo
    }
}

impl FromStr for Vigencia {
    type Err = ErrorApp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVO" => Ok(Vigencia::Activo),
            "ELIMINADO" => Ok(Vigencia::Eliminado),
            otro => Err(ErrorApp::Validacion(format!("Vigencia desconocida: {}", otro))),
        }
    }
}

impl ToSql for Vigencia {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Vigencia {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
