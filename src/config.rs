use std::path::PathBuf;

const NOMBRE_DB: &str = "inmobiliaria.db";
const DIR_ALMACEN: &str = "almacen";
const URL_APP_DEFECTO: &str = "http://localhost:3000";

/// Configuracion del proceso. La configuracion del negocio (servicio de
/// email, nombre de la agencia) vive en la tabla `config` de la base.
#[derive(Debug, Clone)]
pub struct Config {
    pub dir_datos: PathBuf,
    /// URL publica bajo la que se sirven los archivos del almacen
    pub url_almacen: String,
    /// URL de la aplicacion, usada en los enlaces de recuperacion
    pub url_app: String,
    /// Administrador inicial (email, contraseña) si la base no tiene usuarios
    pub admin_inicial: Option<(String, String)>,
}

impl Config {
    pub fn desde_entorno() -> Self {
        let dir_datos = std::env::var("INMOBILIARIA_DATA_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(dirs_next)
            .unwrap_or_else(|| PathBuf::from("."));

        let url_almacen = std::env::var("INMOBILIARIA_URL_ALMACEN")
            .unwrap_or_else(|_| format!("file://{}", dir_datos.join(DIR_ALMACEN).display()));

        let url_app =
            std::env::var("INMOBILIARIA_URL_APP").unwrap_or_else(|_| URL_APP_DEFECTO.to_string());

        let admin_inicial = match (
            std::env::var("INMOBILIARIA_ADMIN_EMAIL"),
            std::env::var("INMOBILIARIA_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(contrasena)) => Some((email, contrasena)),
            _ => None,
        };

        Config {
            dir_datos,
            url_almacen,
            url_app,
            admin_inicial,
        }
    }

    /// Configuracion aislada en un directorio (pruebas, instalaciones portables)
    pub fn en_directorio(dir: impl Into<PathBuf>) -> Self {
        let dir_datos = dir.into();
        Config {
            url_almacen: format!("file://{}", dir_datos.join(DIR_ALMACEN).display()),
            dir_datos,
            url_app: URL_APP_DEFECTO.to_string(),
            admin_inicial: None,
        }
    }

    pub fn ruta_db(&self) -> PathBuf {
        self.dir_datos.join(NOMBRE_DB)
    }

    pub fn dir_almacen(&self) -> PathBuf {
        self.dir_datos.join(DIR_ALMACEN)
    }
}

/// Retorna el directorio de datos de la aplicación
fn dirs_next() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("InmobiliariaAdmin"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".inmobiliaria-admin"))
    }
}
