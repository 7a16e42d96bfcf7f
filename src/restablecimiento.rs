use chrono::{DateTime, Duration, Utc};

/// Minutos minimos entre dos correos de recuperacion para el mismo usuario
pub const VENTANA_MINUTOS: i64 = 60;

/// Verdadero si todavia no paso una hora desde el ultimo envio.
/// Es una ayuda de interfaz, no un control de seguridad.
pub fn esta_bloqueado(ultimo_envio: Option<DateTime<Utc>>, ahora: DateTime<Utc>) -> bool {
    match ultimo_envio {
        Some(ultimo) => ahora - ultimo < Duration::minutes(VENTANA_MINUTOS),
        None => false,
    }
}
