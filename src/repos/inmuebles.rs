use super::RepositorioInmuebles;
use crate::db::Database;
use crate::error::ErrorApp;
use crate::models::{CambiosInmueble, Inmueble, NuevoInmueble, Propietario, Vigencia};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row};
use serde::de::DeserializeOwned;

const COLUMNAS: &str = "id, codigo, tipo, direccion, ubicacion_url, zona, area,
    precio_venta, precio_propietario, precio_m2, imagenes_urls, estado, numero_pisos,
    superficie, superficie_construida, frente, caracteristicas, servicios,
    propietario_nombre_completo, propietario_telefono, propietario_ci, propietario_domicilio,
    propietario_telefono_familiar, propietario_nombre_familiar, propietario_procedencia,
    fecha_registro, fecha_vencimiento, vigencia";

/// Columnas guardadas como texto JSON (listas de imagenes y servicios)
fn columna_json<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let texto: String = row.get(idx)?;
    serde_json::from_str(&texto)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn inmueble_desde_fila(row: &Row) -> rusqlite::Result<Inmueble> {
    Ok(Inmueble {
        id: row.get(0)?,
        codigo: row.get(1)?,
        tipo: row.get(2)?,
        direccion: row.get(3)?,
        ubicacion_url: row.get(4)?,
        zona: row.get(5)?,
        area: row.get(6)?,
        precio_venta: row.get(7)?,
        precio_propietario: row.get(8)?,
        precio_m2: row.get(9)?,
        imagenes_urls: columna_json(row, 10)?,
        estado: row.get(11)?,
        numero_pisos: row.get(12)?,
        superficie: row.get(13)?,
        superficie_construida: row.get(14)?,
        frente: row.get(15)?,
        caracteristicas: row.get(16)?,
        servicios: columna_json(row, 17)?,
        propietario: Propietario {
            nombre_completo: row.get(18)?,
            telefono: row.get(19)?,
            ci: row.get(20)?,
            domicilio: row.get(21)?,
            telefono_familiar: row.get(22)?,
            nombre_familiar: row.get(23)?,
            procedencia: row.get(24)?,
        },
        fecha_registro: row.get(25)?,
        fecha_vencimiento: row.get(26)?,
        vigencia: row.get(27)?,
    })
}

fn leer_por_id(conn: &rusqlite::Connection, id: i64) -> Result<Option<Inmueble>, ErrorApp> {
    let inmueble = conn
        .query_row(
            &format!("SELECT {} FROM inmuebles WHERE id = ?1 AND vigencia = ?2", COLUMNAS),
            rusqlite::params![id, Vigencia::Activo],
            inmueble_desde_fila,
        )
        .optional()?;
    Ok(inmueble)
}

impl RepositorioInmuebles for Database {
    fn existe_codigo_activo(&self, codigo: &str) -> Result<bool, ErrorApp> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM inmuebles WHERE codigo = ?1 AND vigencia = ?2",
            rusqlite::params![codigo.trim(), Vigencia::Activo],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insertar_inmueble(&self, datos: &NuevoInmueble) -> Result<Inmueble, ErrorApp> {
        let fecha_vencimiento = datos.fecha_vencimiento()?;
        let servicios = serde_json::to_string(&datos.servicios)?;
        let p = &datos.propietario;

        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO inmuebles (codigo, tipo, direccion, ubicacion_url, zona, area,
                precio_venta, precio_propietario, precio_m2, imagenes_urls, estado, numero_pisos,
                superficie, superficie_construida, frente, caracteristicas, servicios,
                propietario_nombre_completo, propietario_telefono, propietario_ci,
                propietario_domicilio, propietario_telefono_familiar, propietario_nombre_familiar,
                propietario_procedencia, fecha_registro, fecha_vencimiento, vigencia)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]', ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
            rusqlite::params![
                datos.codigo.trim(),
                datos.tipo,
                datos.direccion,
                datos.ubicacion_url,
                datos.zona,
                datos.area,
                datos.precio_venta,
                datos.precio_propietario,
                datos.precio_m2,
                datos.estado,
                datos.numero_pisos,
                datos.superficie,
                datos.superficie_construida,
                datos.frente,
                datos.caracteristicas,
                servicios,
                p.nombre_completo,
                p.telefono,
                p.ci,
                p.domicilio,
                p.telefono_familiar,
                p.nombre_familiar,
                p.procedencia,
                datos.fecha_registro,
                fecha_vencimiento,
                Vigencia::Activo,
            ],
        )?;

        let id = conn.last_insert_rowid();
        leer_por_id(&conn, id)?.ok_or(ErrorApp::NoEncontrado("Inmueble"))
    }

    fn asignar_imagenes(&self, id: i64, urls: &[String]) -> Result<Inmueble, ErrorApp> {
        let urls = serde_json::to_string(urls)?;
        let conn = self.conn.lock()?;
        let filas = conn.execute(
            "UPDATE inmuebles SET imagenes_urls = ?1, updated_at = datetime('now','localtime')
             WHERE id = ?2 AND vigencia = ?3",
            rusqlite::params![urls, id, Vigencia::Activo],
        )?;
        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Inmueble"));
        }
        leer_por_id(&conn, id)?.ok_or(ErrorApp::NoEncontrado("Inmueble"))
    }

    fn obtener_inmueble(&self, id: i64) -> Result<Option<Inmueble>, ErrorApp> {
        let conn = self.conn.lock()?;
        leer_por_id(&conn, id)
    }

    fn buscar_por_codigo(&self, codigo: &str) -> Result<Option<Inmueble>, ErrorApp> {
        let conn = self.conn.lock()?;
        let inmueble = conn
            .query_row(
                &format!(
                    "SELECT {} FROM inmuebles WHERE codigo = ?1 AND vigencia = ?2 LIMIT 1",
                    COLUMNAS
                ),
                rusqlite::params![codigo.trim(), Vigencia::Activo],
                inmueble_desde_fila,
            )
            .optional()?;
        Ok(inmueble)
    }

    fn listar_inmuebles_activos(&self) -> Result<Vec<Inmueble>, ErrorApp> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM inmuebles WHERE vigencia = ?1 ORDER BY fecha_registro DESC, id DESC",
            COLUMNAS
        ))?;
        let inmuebles = stmt
            .query_map(rusqlite::params![Vigencia::Activo], inmueble_desde_fila)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(inmuebles)
    }

    fn actualizar_inmueble(&self, id: i64, cambios: &CambiosInmueble) -> Result<Inmueble, ErrorApp> {
        let servicios = cambios
            .servicios
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let p = cambios.propietario.as_ref();

        let conn = self.conn.lock()?;
        let filas = conn.execute(
            "UPDATE inmuebles SET
                tipo = COALESCE(?1, tipo),
                direccion = COALESCE(?2, direccion),
                ubicacion_url = COALESCE(?3, ubicacion_url),
                zona = COALESCE(?4, zona),
                area = COALESCE(?5, area),
                precio_venta = COALESCE(?6, precio_venta),
                precio_propietario = COALESCE(?7, precio_propietario),
                precio_m2 = COALESCE(?8, precio_m2),
                estado = COALESCE(?9, estado),
                numero_pisos = COALESCE(?10, numero_pisos),
                superficie = COALESCE(?11, superficie),
                superficie_construida = COALESCE(?12, superficie_construida),
                frente = COALESCE(?13, frente),
                caracteristicas = COALESCE(?14, caracteristicas),
                servicios = COALESCE(?15, servicios),
                propietario_nombre_completo = COALESCE(?16, propietario_nombre_completo),
                propietario_telefono = COALESCE(?17, propietario_telefono),
                propietario_ci = COALESCE(?18, propietario_ci),
                propietario_domicilio = COALESCE(?19, propietario_domicilio),
                propietario_telefono_familiar = COALESCE(?20, propietario_telefono_familiar),
                propietario_nombre_familiar = COALESCE(?21, propietario_nombre_familiar),
                propietario_procedencia = COALESCE(?22, propietario_procedencia),
                updated_at = datetime('now','localtime')
             WHERE id = ?23 AND vigencia = ?24",
            rusqlite::params![
                cambios.tipo,
                cambios.direccion,
                cambios.ubicacion_url,
                cambios.zona,
                cambios.area,
                cambios.precio_venta,
                cambios.precio_propietario,
                cambios.precio_m2,
                cambios.estado,
                cambios.numero_pisos,
                cambios.superficie,
                cambios.superficie_construida,
                cambios.frente,
                cambios.caracteristicas,
                servicios,
                p.map(|p| p.nombre_completo.as_str()),
                p.map(|p| p.telefono.as_str()),
                p.map(|p| p.ci.as_str()),
                p.map(|p| p.domicilio.as_str()),
                p.map(|p| p.telefono_familiar.as_str()),
                p.map(|p| p.nombre_familiar.as_str()),
                p.map(|p| p.procedencia.as_str()),
                id,
                Vigencia::Activo,
            ],
        )?;

        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Inmueble"));
        }
        leer_por_id(&conn, id)?.ok_or(ErrorApp::NoEncontrado("Inmueble"))
    }

    fn eliminar_inmueble(&self, id: i64) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        let filas = conn.execute(
            "UPDATE inmuebles SET vigencia = ?1, updated_at = datetime('now','localtime')
             WHERE id = ?2 AND vigencia = ?3",
            rusqlite::params![Vigencia::Eliminado, id, Vigencia::Activo],
        )?;
        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Inmueble"));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{EstadoInmueble, Servicio};
    use chrono::NaiveDate;

    pub(crate) fn nuevo_inmueble(codigo: &str) -> NuevoInmueble {
        NuevoInmueble {
            codigo: codigo.to_string(),
            tipo: "casa".to_string(),
            direccion: "Calle Jordán 123".to_string(),
            ubicacion_url: "https://maps.example.com/?q=-17.39,-66.15".to_string(),
            zona: "Centro".to_string(),
            area: "urbana".to_string(),
            precio_venta: 150_000.0,
            precio_propietario: 140_000.0,
            precio_m2: 750.0,
            estado: EstadoInmueble::Disponible,
            numero_pisos: 2,
            superficie: 200.0,
            superficie_construida: 180.0,
            frente: 10.0,
            caracteristicas: "3 dormitorios, garaje".to_string(),
            servicios: vec![
                Servicio { nombre: "agua".to_string() },
                Servicio { nombre: "luz".to_string() },
            ],
            propietario: Propietario {
                nombre_completo: "Marta Quiroga".to_string(),
                telefono: "71234567".to_string(),
                ci: "4567890".to_string(),
                domicilio: "Av. Heroínas 45".to_string(),
                ..Default::default()
            },
            fecha_registro: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
        }
    }

    #[test]
    fn test_insertar_deriva_vencimiento() {
        let db = Database::en_memoria().unwrap();
        let inmueble = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        assert_eq!(inmueble.fecha_vencimiento, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert!(inmueble.imagenes_urls.is_empty());
        assert_eq!(inmueble.servicios.len(), 2);
        assert_eq!(inmueble.vigencia, Vigencia::Activo);
    }

    #[test]
    fn test_codigo_activo() {
        let db = Database::en_memoria().unwrap();
        let inmueble = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        assert!(db.existe_codigo_activo("INM-001").unwrap());
        assert!(!db.existe_codigo_activo("INM-002").unwrap());

        // Un codigo eliminado queda libre
        db.eliminar_inmueble(inmueble.id).unwrap();
        assert!(!db.existe_codigo_activo("INM-001").unwrap());
        assert_eq!(db.buscar_por_codigo("INM-001").unwrap(), None);
    }

    #[test]
    fn test_asignar_imagenes() {
        let db = Database::en_memoria().unwrap();
        let inmueble = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        let urls = vec!["u/0.webp".to_string(), "u/1.webp".to_string()];
        let actualizado = db.asignar_imagenes(inmueble.id, &urls).unwrap();
        assert_eq!(actualizado.imagenes_urls, urls);
    }

    #[test]
    fn test_actualizar_no_toca_fechas_ni_codigo() {
        let db = Database::en_memoria().unwrap();
        let inmueble = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        let cambios = CambiosInmueble {
            estado: Some(EstadoInmueble::EnTramite),
            precio_venta: Some(155_000.0),
            servicios: Some(vec![Servicio { nombre: "gas".to_string() }]),
            ..Default::default()
        };
        let actualizado = db.actualizar_inmueble(inmueble.id, &cambios).unwrap();
        assert_eq!(actualizado.estado, EstadoInmueble::EnTramite);
        assert_eq!(actualizado.precio_venta, 155_000.0);
        assert_eq!(actualizado.servicios, vec![Servicio { nombre: "gas".to_string() }]);
        assert_eq!(actualizado.codigo, inmueble.codigo);
        assert_eq!(actualizado.fecha_vencimiento, inmueble.fecha_vencimiento);
        assert_eq!(actualizado.propietario, inmueble.propietario);
    }

    #[test]
    fn test_listado_excluye_eliminados() {
        let db = Database::en_memoria().unwrap();
        let a = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        let b = db.insertar_inmueble(&nuevo_inmueble("INM-002")).unwrap();
        db.eliminar_inmueble(a.id).unwrap();

        let lista = db.listar_inmuebles_activos().unwrap();
        assert_eq!(lista, vec![b]);
        assert_eq!(db.obtener_inmueble(a.id).unwrap(), None);
        assert!(matches!(
            db.actualizar_inmueble(a.id, &CambiosInmueble::default()),
            Err(ErrorApp::NoEncontrado(_))
        ));
    }

    #[test]
    fn test_eliminar_dos_veces() {
        let db = Database::en_memoria().unwrap();
        let inmueble = db.insertar_inmueble(&nuevo_inmueble("INM-001")).unwrap();
        db.eliminar_inmueble(inmueble.id).unwrap();
        assert!(matches!(
            db.eliminar_inmueble(inmueble.id),
            Err(ErrorApp::NoEncontrado(_))
        ));
    }
}
