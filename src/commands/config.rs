use crate::db::Database;
use crate::sesion::ContextoSesion;
use std::collections::HashMap;
use tracing::info;

/// Toda la tabla config. Requiere ADMIN.
pub fn obtener_config(
    db: &Database,
    sesion: &ContextoSesion,
) -> Result<HashMap<String, String>, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    db.leer_toda_config().map_err(|e| e.to_string())
}

/// Inserta o reemplaza las claves indicadas. Requiere ADMIN.
pub fn guardar_config(
    db: &Database,
    sesion: &ContextoSesion,
    configs: HashMap<String, String>,
) -> Result<(), String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    db.guardar_config(&configs).map_err(|e| e.to_string())?;

    let mut claves: Vec<&str> = configs.keys().map(String::as_str).collect();
    claves.sort_unstable();
    info!(?claves, "configuración guardada");
    Ok(())
}
