pub mod acceso;
pub mod almacen;
pub mod commands;
pub mod config;
pub mod correo;
pub mod db;
pub mod error;
pub mod formulario;
pub mod imagenes;
pub mod models;
pub mod repos;
pub mod restablecimiento;
pub mod sesion;
pub mod utils;

use almacen::AlmacenLocal;
use commands::usuarios::OpcionesRestablecimiento;
use config::Config;
use correo::ServicioCorreoHttp;
use db::Database;
use error::ErrorApp;
use sesion::ContextoSesion;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inicializa el log. El nivel se toma de `RUST_LOG` (por defecto `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Servicios compartidos por todos los comandos
pub struct Aplicacion {
    pub config: Config,
    pub db: Database,
    pub almacen: AlmacenLocal,
}

impl Aplicacion {
    /// Abre (o crea) la base y el almacen en el directorio de datos
    pub fn iniciar(config: Config) -> Result<Self, ErrorApp> {
        std::fs::create_dir_all(&config.dir_datos)?;
        let db = Database::new(&config.ruta_db())?;
        let almacen = AlmacenLocal::new(config.dir_almacen(), config.url_almacen.clone())?;

        info!(datos = %config.dir_datos.display(), "aplicación iniciada");
        Ok(Aplicacion {
            config,
            db,
            almacen,
        })
    }

    /// Resuelve la sesion de una solicitud a partir de su token
    pub fn sesion(&self, token: Option<&str>) -> Result<ContextoSesion, ErrorApp> {
        ContextoSesion::resolver(&self.db, &self.db, token)
    }

    /// Arma el notificador con la configuracion actual de la tabla config
    /// y envia el correo de recuperacion.
    pub async fn solicitar_restablecimiento(
        &self,
        sesion: &ContextoSesion,
        uid: i64,
    ) -> Result<String, String> {
        sesion.requerir_administrador().map_err(|e| e.to_string())?;
        let notificador = ServicioCorreoHttp::desde_config(&self.db).map_err(|e| e.to_string())?;
        let nombre_agencia = self
            .db
            .leer_config("nombre_agencia")
            .map_err(|e| e.to_string())?;
        let opciones = OpcionesRestablecimiento {
            url_app: &self.config.url_app,
            nombre_agencia: &nombre_agencia,
        };

        commands::usuarios::solicitar_restablecimiento(
            &self.db,
            &self.db,
            &self.db,
            &notificador,
            opciones,
            sesion,
            uid,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rol;

    #[test]
    fn test_iniciar_en_directorio() {
        let dir = tempfile::tempdir().unwrap();
        let app = Aplicacion::iniciar(Config::en_directorio(dir.path())).unwrap();
        assert!(dir.path().join("inmobiliaria.db").is_file());
        assert!(dir.path().join("almacen").is_dir());

        let admin = app
            .db
            .sembrar_administrador("admin@inmo.com", "secreta1")
            .unwrap()
            .unwrap();
        let inicio = commands::sesion::iniciar_sesion(
            &app.db,
            &app.db,
            "admin@inmo.com".to_string(),
            "secreta1".to_string(),
        )
        .unwrap();
        let sesion = app.sesion(Some(&inicio.token)).unwrap();
        assert_eq!(sesion.usuario().map(|u| u.uid), Some(admin.uid));
        assert_eq!(sesion.usuario().map(|u| u.rol), Some(Rol::Administrador));
    }

    #[tokio::test]
    async fn test_restablecimiento_sin_servicio_de_email() {
        let dir = tempfile::tempdir().unwrap();
        let app = Aplicacion::iniciar(Config::en_directorio(dir.path())).unwrap();
        let admin = app
            .db
            .sembrar_administrador("admin@inmo.com", "secreta1")
            .unwrap()
            .unwrap();
        let sesion = ContextoSesion::con_usuario(admin.clone());

        let err = app.solicitar_restablecimiento(&sesion, admin.uid).await.unwrap_err();
        assert_eq!(err, "Servicio de email no configurado.");
    }
}
