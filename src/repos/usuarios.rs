use super::RepositorioUsuarios;
use crate::db::Database;
use crate::error::ErrorApp;
use crate::models::{CambiosUsuario, NuevoUsuario, Rol, Usuario, Vigencia};
use rusqlite::{OptionalExtension, Row};

const COLUMNAS: &str = "uid, email, nombre, apellidos, rol, telefono, vigencia";

fn usuario_desde_fila(row: &Row) -> rusqlite::Result<Usuario> {
    Ok(Usuario {
        uid: row.get(0)?,
        email: row.get(1)?,
        nombre: row.get(2)?,
        apellidos: row.get(3)?,
        rol: row.get(4)?,
        telefono: row.get(5)?,
        vigencia: row.get(6)?,
    })
}

impl RepositorioUsuarios for Database {
    fn insertar_usuario(&self, uid: i64, datos: &NuevoUsuario) -> Result<Usuario, ErrorApp> {
        let conn = self.conn.lock()?;
        let email = datos.email.trim().to_lowercase();

        conn.execute(
            "INSERT INTO usuarios (uid, email, nombre, apellidos, rol, telefono, vigencia)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                uid,
                email,
                datos.nombre.trim(),
                datos.apellidos.trim(),
                datos.rol,
                datos.telefono.trim(),
                Vigencia::Activo,
            ],
        )?;

        Ok(Usuario {
            uid,
            email,
            nombre: datos.nombre.trim().to_string(),
            apellidos: datos.apellidos.trim().to_string(),
            rol: datos.rol,
            telefono: datos.telefono.trim().to_string(),
            vigencia: Vigencia::Activo,
        })
    }

    fn obtener_usuario(&self, uid: i64) -> Result<Option<Usuario>, ErrorApp> {
        let conn = self.conn.lock()?;
        let usuario = conn
            .query_row(
                &format!("SELECT {} FROM usuarios WHERE uid = ?1", COLUMNAS),
                rusqlite::params![uid],
                usuario_desde_fila,
            )
            .optional()?;
        Ok(usuario)
    }

    fn listar_usuarios(&self) -> Result<Vec<Usuario>, ErrorApp> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM usuarios ORDER BY uid", COLUMNAS))?;
        let usuarios = stmt
            .query_map([], usuario_desde_fila)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usuarios)
    }

    fn listar_usuarios_activos(&self) -> Result<Vec<Usuario>, ErrorApp> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM usuarios WHERE vigencia = ?1 ORDER BY uid",
            COLUMNAS
        ))?;
        let usuarios = stmt
            .query_map(rusqlite::params![Vigencia::Activo], usuario_desde_fila)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usuarios)
    }

    fn contar_administradores_activos(&self) -> Result<i64, ErrorApp> {
        let conn = self.conn.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM usuarios WHERE rol = ?1 AND vigencia = ?2",
            rusqlite::params![Rol::Administrador, Vigencia::Activo],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn actualizar_usuario(&self, uid: i64, cambios: &CambiosUsuario) -> Result<Usuario, ErrorApp> {
        let conn = self.conn.lock()?;

        let filas = conn.execute(
            "UPDATE usuarios SET
                nombre = COALESCE(?1, nombre),
                apellidos = COALESCE(?2, apellidos),
                rol = COALESCE(?3, rol),
                telefono = COALESCE(?4, telefono),
                updated_at = datetime('now','localtime')
             WHERE uid = ?5 AND vigencia = ?6",
            rusqlite::params![
                cambios.nombre.as_deref().map(str::trim),
                cambios.apellidos.as_deref().map(str::trim),
                cambios.rol,
                cambios.telefono.as_deref().map(str::trim),
                uid,
                Vigencia::Activo,
            ],
        )?;

        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Usuario"));
        }

        let usuario = conn.query_row(
            &format!("SELECT {} FROM usuarios WHERE uid = ?1", COLUMNAS),
            rusqlite::params![uid],
            usuario_desde_fila,
        )?;
        Ok(usuario)
    }

    /// Marca el usuario como eliminado y cierra sus sesiones abiertas
    fn eliminar_usuario(&self, uid: i64) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;

        let filas = tx.execute(
            "UPDATE usuarios SET vigencia = ?1, updated_at = datetime('now','localtime')
             WHERE uid = ?2 AND vigencia = ?3",
            rusqlite::params![Vigencia::Eliminado, uid, Vigencia::Activo],
        )?;
        if filas == 0 {
            return Err(ErrorApp::NoEncontrado("Usuario"));
        }
        tx.execute(
            "DELETE FROM sesiones WHERE credencial_id = ?1",
            rusqlite::params![uid],
        )?;

        tx.commit()?;
        Ok(())
    }
}
