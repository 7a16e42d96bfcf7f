use super::RepositorioClientes;
use crate::db::Database;
use crate::error::ErrorApp;
use crate::models::{CambiosCliente, Cliente, NuevoCliente, Preferencias, Vigencia};
use chrono::Local;
use rusqlite::{OptionalExtension, Row};

const COLUMNAS: &str = "uid, nombre_completo, telefono, tipo_inmueble, precio_min, precio_max,
                        direccion, zona, fecha_registro, vigencia";

fn cliente_desde_fila(row: &Row) -> rusqlite::Result<Cliente> {
    Ok(Cliente {
        uid: row.get(0)?,
        nombre_completo: row.get(1)?,
        telefono: row.get(2)?,
        preferencias: Preferencias {
            tipo_inmueble: row.get(3)?,
            precio_min: row.get(4)?,
            precio_max: row.get(5)?,
            direccion: row.get(6)?,
            zona: row.get(7)?,
        },
        fecha_registro: row.get(8)?,
        vigencia: row.get(9)?,
    })
}

impl RepositorioClientes for Database {
    fn insertar_cliente(&self, datos: &NuevoCliente) -> Result<Cliente, ErrorApp> {
        let conn = self.conn.lock()?;
        let fecha_registro = datos
            .fecha_registro
            .unwrap_or_else(|| Local::now().date_naive());
        let p = &datos.preferencias;

        // Todo cliente nuevo nace activo
        conn.execute(
            "INSERT INTO clientes (nombre_completo, telefono, tipo_inmueble, precio_min, precio_max,
                                   direccion, zona, fecha_registro, vigencia)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                datos.nombre_completo.trim(),
                datos.telefono.trim(),
                p.tipo_inmueble,
                p.precio_min,
                p.precio_max,
                p.direccion,
                p.zona,
                fecha_registro,
                Vigencia::Activo,
            ],
        )?;

        Ok(Cliente {
            uid: conn.last_insert_rowid(),
            nombre_completo: datos.nombre_completo.trim().to_string(),
            telefono: datos.telefono.trim().to_string(),
            preferencias: p.clone(),
            fecha_registro,
            vigencia: Vigencia::Activo,
        })
    }

    fn obtener_cliente(&self, uid: i64) -> Result<Option<Cliente>, ErrorApp> {
        let conn = self.conn.lock()?;
        let cliente = conn
            .query_row(
                &format!("SELECT {} FROM clientes WHERE uid = ?1 AND vigencia = ?2", COLUMNAS),
                rusqlite::params![uid, Vigencia::Activo],
                cliente_desde_fila,
            )
            .optional()?;
        Ok(cliente)
    }

    fn listar_clientes_activos(&self) -> Result<Vec<Cliente>, ErrorApp> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clientes WHERE vigencia = ?1 ORDER BY nombre_completo",
            COLUMNAS
        ))?;
        let clientes = stmt
            .query_map(rusqlite::params![Vigencia::Activo], cliente_desde_fila)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clientes)
    }

    fn actualizar_cliente(&self, uid: i64, cambios: &CambiosCliente) -> Result<Cliente, ErrorApp> {
        let conn = self.conn.lock()?;
        let p = cambios.preferencias.as_ref();

        let filas = conn.execute(
            "UPDATE clientes SET
                nombre_completo = COALESCE(?1, nombre_completo),
                telefono = COALESCE(?2, telefono),
                tipo_inmueble = COALESCE(?3, tipo_inmueble),
                precio_min = COALESCE(?4, precio_min),
                precio_max = COALESCE(?5, precio_max),
                direccion = COALESCE(?6, direccion),
                zona = COALESCE(?7, zona),
                updated_at = datetime('now','localtime')
             WHERE uid = ?8 AND vigencia = ?9",
            rusqlite::params![
                cambios.nombre_completo.as_deref().map(str::trim),
                cambios.telefono.as_deref().map(str::trim),
                p.map(|p| p.tipo_inmueble.as_str()),
                p.map(|p| p.precio_min),
                p.map(|p| p.precio_max),
                p.map(|p| p.direccion.as_str()),
                p.map(|p| p.zona.as_str()),
                uid,
                Vigencia::Activo,
            ],
        )?;

        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Cliente"));
        }

        let cliente = conn.query_row(
            &format!("SELECT {} FROM clientes WHERE uid = ?1", COLUMNAS),
            rusqlite::params![uid],
            cliente_desde_fila,
        )?;
        Ok(cliente)
    }

    fn eliminar_cliente(&self, uid: i64) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        let filas = conn.execute(
            "UPDATE clientes SET vigencia = ?1, updated_at = datetime('now','localtime')
             WHERE uid = ?2 AND vigencia = ?3",
            rusqlite::params![Vigencia::Eliminado, uid, Vigencia::Activo],
        )?;
        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Cliente"));
        }
        Ok(())
    }
}
