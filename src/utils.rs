use rand::Rng;
use sha2::{Digest, Sha256};

/// Genera un salt aleatorio de 16 caracteres hexadecimales
pub fn generar_salt() -> String {
    let mut rng = rand::thread_rng();
    let salt: u64 = rng.gen();
    format!("{:016x}", salt)
}

/// Hash de contraseña con salt usando SHA-256, en hexadecimal
pub fn hash_contrasena(salt: &str, contrasena: &str) -> String {
    let input = format!("{}{}", salt, contrasena);
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)
}

/// Token opaco de 32 caracteres hexadecimales (sesiones y restablecimiento)
pub fn generar_token() -> String {
    let mut rng = rand::thread_rng();
    let token: u128 = rng.gen();
    format!("{:032x}", token)
}

/// Devuelve los nombres de los campos vacios (solo espacios cuenta como vacio)
pub fn campos_vacios(campos: &[(&'static str, &str)]) -> Vec<&'static str> {
    campos
        .iter()
        .filter(|(_, valor)| valor.trim().is_empty())
        .map(|(nombre, _)| *nombre)
        .collect()
}
