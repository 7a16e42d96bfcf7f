use std::sync::PoisonError;
use thiserror::Error;

/// Errores de la aplicacion. El texto de cada variante es el mensaje que se
/// muestra al usuario.
#[derive(Debug, Error)]
pub enum ErrorApp {
    /// Faltan campos obligatorios (o no son numeros validos) en un formulario.
    #[error("Todos los campos son requeridos.")]
    CamposRequeridos(Vec<&'static str>),

    #[error("{0}")]
    Validacion(String),

    #[error("{0} no encontrado")]
    NoEncontrado(&'static str),

    #[error("El código del inmueble ya existe.")]
    CodigoDuplicado,

    #[error("El correo electrónico ya está en uso.")]
    CorreoEnUso,

    #[error("El correo electrónico no es válido.")]
    CorreoInvalido,

    #[error("La contraseña es demasiado débil.")]
    ContrasenaDebil,

    #[error("Correo o contraseña incorrectos.")]
    CredencialesInvalidas,

    #[error("Usuario no encontrado en la base de datos.")]
    PerfilInexistente,

    #[error("Su cuenta está inactiva. Comuníquese con el administrador.")]
    CuentaInactiva,

    #[error("Debe iniciar sesión")]
    SinSesion,

    #[error("Se requiere permisos de administrador")]
    SinPermiso,

    #[error("No se puede eliminar o cambiar el rol del último administrador activo")]
    UltimoAdministrador,

    #[error("Ya se envió un correo de recuperación recientemente. Inténtalo más tarde.")]
    RestablecimientoBloqueado,

    #[error("El enlace de recuperación no es válido o ya venció.")]
    TokenInvalido,

    #[error("Servicio de email no configurado.")]
    CorreoNoConfigurado,

    #[error("Error enviando email: {0}")]
    EnvioCorreo(String),

    #[error("No se pudo conectar al servicio de email: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error de base de datos: {0}")]
    BaseDatos(#[from] rusqlite::Error),

    #[error("Error de almacenamiento: {0}")]
    Almacenamiento(#[from] std::io::Error),

    #[error("Error procesando imagen: {0}")]
    Imagen(#[from] image::ImageError),

    #[error("Error de serialización: {0}")]
    Serializacion(#[from] serde_json::Error),

    #[error("Base de datos bloqueada")]
    Bloqueo,
}

impl<T> From<PoisonError<T>> for ErrorApp {
    fn from(_: PoisonError<T>) -> Self {
        ErrorApp::Bloqueo
    }
}

/// Traduce errores del backend de identidad a mensajes amigables buscando
/// fragmentos conocidos en el texto del error.
pub fn traducir_error_identidad(err: rusqlite::Error) -> ErrorApp {
    let texto = err.to_string();
    if texto.contains("UNIQUE constraint failed: credenciales.email") {
        ErrorApp::CorreoEnUso
    } else if texto.contains("CHECK constraint failed") && texto.contains("email") {
        ErrorApp::CorreoInvalido
    } else {
        ErrorApp::BaseDatos(err)
    }
}
