use super::Vigencia;
use crate::error::ErrorApp;
use chrono::{Months, NaiveDate};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Meses de vigencia de una publicacion desde su registro
pub const MESES_VIGENCIA: u32 = 6;

/// Estado comercial del inmueble (independiente de su `Vigencia`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstadoInmueble {
    #[default]
    Disponible,
    EnTramite,
    Vendido,
    Vencido,
}

impl EstadoInmueble {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoInmueble::Disponible => "disponible",
            EstadoInmueble::EnTramite => "en_tramite",
            EstadoInmueble::Vendido => "vendido",
            EstadoInmueble::Vencido => "vencido",
        }
    }
}

impl FromStr for EstadoInmueble {
    type Err = ErrorApp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disponible" => Ok(EstadoInmueble::Disponible),
            "en_tramite" => Ok(EstadoInmueble::EnTramite),
            "vendido" => Ok(EstadoInmueble::Vendido),
            "vencido" => Ok(EstadoInmueble::Vencido),
            otro => Err(ErrorApp::Validacion(format!("Estado de inmueble desconocido: {}", otro))),
        }
    }
}

impl ToSql for EstadoInmueble {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EstadoInmueble {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Propietario {
    pub nombre_completo: String,
    pub telefono: String,
    pub ci: String,
    pub domicilio: String,
    pub telefono_familiar: String,
    pub nombre_familiar: String,
    pub procedencia: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Servicio {
    pub nombre: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Inmueble {
    pub id: i64,
    pub codigo: String,
    pub tipo: String,
    pub direccion: String,
    pub ubicacion_url: String,
    pub zona: String,
    pub area: String,
    pub precio_venta: f64,
    pub precio_propietario: f64,
    pub precio_m2: f64,
    pub imagenes_urls: Vec<String>,
    pub estado: EstadoInmueble,
    pub numero_pisos: u32,
    pub superficie: f64,
    pub superficie_construida: f64,
    pub frente: f64,
    pub caracteristicas: String,
    pub servicios: Vec<Servicio>,
    pub propietario: Propietario,
    pub fecha_registro: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub vigencia: Vigencia,
}

/// Inmueble validado, listo para insertar. La fecha de vencimiento no se
/// guarda aqui: siempre se deriva de `fecha_registro`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NuevoInmueble {
    pub codigo: String,
    pub tipo: String,
    pub direccion: String,
    pub ubicacion_url: String,
    pub zona: String,
    pub area: String,
    pub precio_venta: f64,
    pub precio_propietario: f64,
    pub precio_m2: f64,
    pub estado: EstadoInmueble,
    pub numero_pisos: u32,
    pub superficie: f64,
    pub superficie_construida: f64,
    pub frente: f64,
    pub caracteristicas: String,
    pub servicios: Vec<Servicio>,
    pub propietario: Propietario,
    pub fecha_registro: NaiveDate,
}

impl NuevoInmueble {
    pub fn fecha_vencimiento(&self) -> Result<NaiveDate, ErrorApp> {
        calcular_vencimiento(self.fecha_registro)
    }
}

/// Cambios parciales sobre un inmueble. `codigo`, fechas y vigencia no son
/// editables.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CambiosInmueble {
    pub tipo: Option<String>,
    pub direccion: Option<String>,
    pub ubicacion_url: Option<String>,
    pub zona: Option<String>,
    pub area: Option<String>,
    pub precio_venta: Option<f64>,
    pub precio_propietario: Option<f64>,
    pub precio_m2: Option<f64>,
    pub estado: Option<EstadoInmueble>,
    pub numero_pisos: Option<u32>,
    pub superficie: Option<f64>,
    pub superficie_construida: Option<f64>,
    pub frente: Option<f64>,
    pub caracteristicas: Option<String>,
    pub servicios: Option<Vec<Servicio>>,
    pub propietario: Option<Propietario>,
}

/// Fecha de registro + 6 meses calendario. Si el dia no existe en el mes
/// destino se usa el ultimo dia de ese mes (31/08 -> 28/02).
pub fn calcular_vencimiento(fecha_registro: NaiveDate) -> Result<NaiveDate, ErrorApp> {
    fecha_registro
        .checked_add_months(Months::new(MESES_VIGENCIA))
        .ok_or_else(|| ErrorApp::Validacion("Fecha de registro fuera de rango".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn fecha(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_vencimiento_seis_meses() {
        assert_eq!(calcular_vencimiento(fecha(2024, 1, 15)).unwrap(), fecha(2024, 7, 15));
        assert_eq!(calcular_vencimiento(fecha(2024, 9, 10)).unwrap(), fecha(2025, 3, 10));
    }

    #[test]
    fn test_vencimiento_fin_de_mes() {
        assert_eq!(calcular_vencimiento(fecha(2024, 8, 31)).unwrap(), fecha(2025, 2, 28));
        assert_eq!(calcular_vencimiento(fecha(2023, 8, 31)).unwrap(), fecha(2024, 2, 29));
        assert_eq!(calcular_vencimiento(fecha(2024, 12, 31)).unwrap(), fecha(2025, 6, 30));
    }

    #[test]
    fn test_vencimiento_todo_un_anio() {
        // Cada dia de un anio bisiesto cae seis meses despues, mismo dia o fin de mes
        let mut dia = fecha(2024, 1, 1);
        while dia < fecha(2025, 1, 1) {
            let venc = calcular_vencimiento(dia).unwrap();
            let meses = (venc.year_ce().1 as i64 * 12 + venc.month0() as i64)
                - (dia.year_ce().1 as i64 * 12 + dia.month0() as i64);
            assert_eq!(meses, 6);
            assert!(venc.day() == dia.day() || venc.day() < dia.day());
            dia = dia.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_estado_texto() {
        assert_eq!("en_tramite".parse::<EstadoInmueble>().unwrap(), EstadoInmueble::EnTramite);
        assert!("otro".parse::<EstadoInmueble>().is_err());
        assert_eq!(EstadoInmueble::default(), EstadoInmueble::Disponible);
    }
}
