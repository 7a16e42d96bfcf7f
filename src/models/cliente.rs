use super::Vigencia;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Preferencias {
    pub tipo_inmueble: String,
    pub precio_min: f64,
    pub precio_max: f64,
    pub direccion: String,
    pub zona: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cliente {
    pub uid: i64,
    pub nombre_completo: String,
    pub telefono: String,
    pub preferencias: Preferencias,
    pub fecha_registro: NaiveDate,
    pub vigencia: Vigencia,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NuevoCliente {
    pub nombre_completo: String,
    pub telefono: String,
    pub preferencias: Preferencias,
    /// Si no se indica se usa la fecha del dia
    pub fecha_registro: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CambiosCliente {
    pub nombre_completo: Option<String>,
    pub telefono: Option<String>,
    pub preferencias: Option<Preferencias>,
}
