pub mod schema;

use crate::error::ErrorApp;
use crate::models::{NuevoUsuario, Rol, Usuario};
use crate::repos::{ProveedorIdentidad, RepositorioUsuarios};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Backend SQLite. Implementa los repositorios de cada entidad, el
/// proveedor de identidad y el registro de restablecimientos.
pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self, rusqlite::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Self::con_conexion(conn)
    }

    /// Base en memoria, se pierde al soltar el valor
    pub fn en_memoria() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::con_conexion(conn)
    }

    fn con_conexion(conn: Connection) -> Result<Self, rusqlite::Error> {
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        schema::create_tables(&conn)
    }

    /// Lee un valor de la tabla `config` ("" si no existe)
    pub fn leer_config(&self, key: &str) -> Result<String, ErrorApp> {
        let conn = self.conn.lock()?;
        let valor = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .unwrap_or_default();
        Ok(valor)
    }

    pub fn leer_toda_config(&self) -> Result<HashMap<String, String>, ErrorApp> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config")?;
        let config = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(config)
    }

    pub fn guardar_config(&self, configs: &HashMap<String, String>) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        for (key, value) in configs {
            conn.execute(
                "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )?;
        }
        Ok(())
    }

    /// Crea el administrador inicial si no hay ningun usuario.
    /// Retorna el usuario creado, o `None` si ya habia usuarios.
    pub fn sembrar_administrador(
        &self,
        email: &str,
        contrasena: &str,
    ) -> Result<Option<Usuario>, ErrorApp> {
        let count: i64 = {
            let conn = self.conn.lock()?;
            conn.query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))?
        };
        if count > 0 {
            return Ok(None);
        }

        let uid = self.registrar_credencial(email, contrasena)?;
        let admin = self.insertar_usuario(
            uid,
            &NuevoUsuario {
                email: email.to_string(),
                contrasena: String::new(),
                nombre: "ADMINISTRADOR".to_string(),
                apellidos: String::new(),
                rol: Rol::Administrador,
                telefono: String::new(),
            },
        )?;
        Ok(Some(admin))
    }
}
