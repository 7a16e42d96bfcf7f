use inmobiliaria_admin::config::Config;
use inmobiliaria_admin::error::ErrorApp;
use inmobiliaria_admin::repos::{RepositorioClientes, RepositorioInmuebles, RepositorioUsuarios};
use inmobiliaria_admin::{init_logging, Aplicacion};
use tracing::{info, warn};

/// Prepara el directorio de datos: crea la base, aplica migraciones y, si la
/// base esta vacia, siembra el administrador inicial.
fn main() -> Result<(), ErrorApp> {
    init_logging();

    let config = Config::desde_entorno();
    let app = Aplicacion::iniciar(config)?;

    match &app.config.admin_inicial {
        Some((email, contrasena)) => match app.db.sembrar_administrador(email, contrasena)? {
            Some(admin) => info!(uid = admin.uid, email = %admin.email, "administrador inicial creado"),
            None => info!("ya existen usuarios, no se crea administrador inicial"),
        },
        None => {
            if app.db.listar_usuarios()?.is_empty() {
                warn!("base sin usuarios; defina INMOBILIARIA_ADMIN_EMAIL e INMOBILIARIA_ADMIN_PASSWORD");
            }
        }
    }

    info!(
        usuarios = app.db.listar_usuarios_activos()?.len(),
        clientes = app.db.listar_clientes_activos()?.len(),
        inmuebles = app.db.listar_inmuebles_activos()?.len(),
        "estado de la base"
    );
    Ok(())
}
