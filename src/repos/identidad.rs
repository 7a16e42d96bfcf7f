use super::{ProveedorIdentidad, RegistroRestablecimientos};
use crate::db::Database;
use crate::error::{traducir_error_identidad, ErrorApp};
use crate::utils;
use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;

const LONGITUD_MINIMA_CONTRASENA: usize = 6;
const HORAS_VALIDEZ_TOKEN: i64 = 24;

fn validar_contrasena(contrasena: &str) -> Result<(), ErrorApp> {
    if contrasena.chars().count() < LONGITUD_MINIMA_CONTRASENA {
        return Err(ErrorApp::ContrasenaDebil);
    }
    Ok(())
}

impl ProveedorIdentidad for Database {
    fn registrar_credencial(&self, email: &str, contrasena: &str) -> Result<i64, ErrorApp> {
        validar_contrasena(contrasena)?;
        let email = email.trim().to_lowercase();

        let salt = utils::generar_salt();
        let hash = utils::hash_contrasena(&salt, contrasena);

        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO credenciales (email, contrasena_hash, contrasena_salt) VALUES (?1, ?2, ?3)",
            rusqlite::params![email, hash, salt],
        )
        .map_err(traducir_error_identidad)?;

        Ok(conn.last_insert_rowid())
    }

    fn autenticar(&self, email: &str, contrasena: &str) -> Result<i64, ErrorApp> {
        let email = email.trim().to_lowercase();
        let conn = self.conn.lock()?;

        let credencial: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT id, contrasena_hash, contrasena_salt FROM credenciales WHERE email = ?1",
                rusqlite::params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match credencial {
            Some((id, hash, salt)) if utils::hash_contrasena(&salt, contrasena) == hash => Ok(id),
            _ => Err(ErrorApp::CredencialesInvalidas),
        }
    }

    fn abrir_sesion(&self, credencial_id: i64) -> Result<String, ErrorApp> {
        let token = utils::generar_token();
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO sesiones (token, credencial_id) VALUES (?1, ?2)",
            rusqlite::params![token, credencial_id],
        )?;
        Ok(token)
    }

    fn cerrar_sesion(&self, token: &str) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM sesiones WHERE token = ?1", rusqlite::params![token])?;
        Ok(())
    }

    fn credencial_de_sesion(&self, token: &str) -> Result<Option<i64>, ErrorApp> {
        let conn = self.conn.lock()?;
        let id = conn
            .query_row(
                "SELECT credencial_id FROM sesiones WHERE token = ?1",
                rusqlite::params![token],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn crear_token_restablecimiento(
        &self,
        email: &str,
        ahora: DateTime<Utc>,
    ) -> Result<String, ErrorApp> {
        let email = email.trim().to_lowercase();
        let conn = self.conn.lock()?;

        let credencial_id: i64 = conn
            .query_row(
                "SELECT id FROM credenciales WHERE email = ?1",
                rusqlite::params![email],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(ErrorApp::NoEncontrado("Usuario"))?;

        let token = utils::generar_token();
        let expira_en = ahora + Duration::hours(HORAS_VALIDEZ_TOKEN);
        conn.execute(
            "INSERT INTO tokens_restablecimiento (token, credencial_id, expira_en) VALUES (?1, ?2, ?3)",
            rusqlite::params![token, credencial_id, expira_en],
        )?;

        Ok(token)
    }

    fn restablecer_contrasena(
        &self,
        token: &str,
        nueva: &str,
        ahora: DateTime<Utc>,
    ) -> Result<(), ErrorApp> {
        validar_contrasena(nueva)?;
        let conn = self.conn.lock()?;

        let registro: Option<(i64, DateTime<Utc>, bool)> = conn
            .query_row(
                "SELECT credencial_id, expira_en, usado FROM tokens_restablecimiento WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?, row.get::<_, i64>(2)? != 0)),
            )
            .optional()?;

        let credencial_id = match registro {
            Some((id, expira_en, false)) if ahora < expira_en => id,
            _ => return Err(ErrorApp::TokenInvalido),
        };

        let salt = utils::generar_salt();
        let hash = utils::hash_contrasena(&salt, nueva);

        // Cambio de clave, consumo del token y cierre de sesiones van juntos
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE credenciales SET contrasena_hash = ?1, contrasena_salt = ?2 WHERE id = ?3",
            rusqlite::params![hash, salt, credencial_id],
        )?;
        tx.execute(
            "UPDATE tokens_restablecimiento SET usado = 1 WHERE token = ?1",
            rusqlite::params![token],
        )?;
        // Las sesiones abiertas con la contraseña anterior se cierran
        tx.execute(
            "DELETE FROM sesiones WHERE credencial_id = ?1",
            rusqlite::params![credencial_id],
        )?;
        tx.commit()?;

        Ok(())
    }
}

impl RegistroRestablecimientos for Database {
    fn ultimo_envio(&self, usuario_id: i64) -> Result<Option<DateTime<Utc>>, ErrorApp> {
        let conn = self.conn.lock()?;
        let ultimo = conn
            .query_row(
                "SELECT ultimo_envio FROM restablecimientos WHERE usuario_id = ?1",
                rusqlite::params![usuario_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ultimo)
    }

    fn registrar_envio(&self, usuario_id: i64, instante: DateTime<Utc>) -> Result<(), ErrorApp> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO restablecimientos (usuario_id, ultimo_envio) VALUES (?1, ?2)",
            rusqlite::params![usuario_id, instante],
        )?;
        Ok(())
    }
}
