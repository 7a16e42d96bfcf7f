use crate::correo::{correo_restablecimiento, Notificador};
use crate::error::ErrorApp;
use crate::models::{CambiosUsuario, NuevoUsuario, Rol, Usuario};
use crate::repos::{ProveedorIdentidad, RegistroRestablecimientos, RepositorioUsuarios};
use crate::restablecimiento::esta_bloqueado;
use crate::sesion::ContextoSesion;
use crate::utils::campos_vacios;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Datos para armar el correo de recuperacion
#[derive(Debug, Clone, Copy)]
pub struct OpcionesRestablecimiento<'a> {
    /// URL base de la aplicacion; el enlace es `{url_app}/restablecer?token=...`
    pub url_app: &'a str,
    pub nombre_agencia: &'a str,
}

/// Registra la credencial en el proveedor de identidad y crea el perfil con
/// el mismo uid. Requiere ADMIN.
pub fn registrar_usuario(
    identidad: &impl ProveedorIdentidad,
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
    usuario: NuevoUsuario,
) -> Result<Usuario, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    let faltantes = campos_vacios(&[
        ("email", usuario.email.as_str()),
        ("contrasena", usuario.contrasena.as_str()),
        ("nombre", usuario.nombre.as_str()),
    ]);
    if !faltantes.is_empty() {
        return Err(ErrorApp::CamposRequeridos(faltantes).to_string());
    }

    let uid = identidad
        .registrar_credencial(&usuario.email, &usuario.contrasena)
        .map_err(|e| {
            error!(email = %usuario.email, error = %e, "error en el registro");
            e.to_string()
        })?;

    let creado = usuarios
        .insertar_usuario(uid, &usuario)
        .map_err(|e| e.to_string())?;

    info!(uid = creado.uid, rol = creado.rol.as_str(), "usuario registrado");
    Ok(creado)
}

/// Lista todos los usuarios, activos e inactivos. Requiere ADMIN.
pub fn listar_usuarios(
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
) -> Result<Vec<Usuario>, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    usuarios.listar_usuarios().map_err(|e| e.to_string())
}

pub fn listar_usuarios_activos(
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
) -> Result<Vec<Usuario>, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    usuarios.listar_usuarios_activos().map_err(|e| e.to_string())
}

pub fn obtener_usuario(
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
    uid: i64,
) -> Result<Usuario, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    usuarios
        .obtener_usuario(uid)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| ErrorApp::NoEncontrado("Usuario").to_string())
}

/// No deja sin administradores activos al sistema
fn proteger_ultimo_admin(
    usuarios: &impl RepositorioUsuarios,
    uid: i64,
    nuevo_rol: Option<Rol>,
) -> Result<(), ErrorApp> {
    let actual = usuarios
        .obtener_usuario(uid)?
        .ok_or(ErrorApp::NoEncontrado("Usuario"))?;

    let deja_de_ser_admin = actual.rol == Rol::Administrador
        && actual.vigencia.es_activo()
        && nuevo_rol.map_or(true, |r| r != Rol::Administrador);

    if deja_de_ser_admin && usuarios.contar_administradores_activos()? <= 1 {
        return Err(ErrorApp::UltimoAdministrador);
    }
    Ok(())
}

/// Actualiza nombre, apellidos, rol o telefono. Requiere ADMIN.
pub fn actualizar_usuario(
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
    uid: i64,
    cambios: CambiosUsuario,
) -> Result<Usuario, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    if let Some(rol) = cambios.rol {
        proteger_ultimo_admin(usuarios, uid, Some(rol)).map_err(|e| e.to_string())?;
    }

    let actualizado = usuarios
        .actualizar_usuario(uid, &cambios)
        .map_err(|e| {
            error!(uid, error = %e, "error actualizando usuario");
            e.to_string()
        })?;

    info!(uid, "usuario actualizado");
    Ok(actualizado)
}

/// Desactiva (soft-delete) un usuario. Requiere ADMIN.
pub fn eliminar_usuario(
    usuarios: &impl RepositorioUsuarios,
    sesion: &ContextoSesion,
    uid: i64,
) -> Result<(), String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    proteger_ultimo_admin(usuarios, uid, None).map_err(|e| e.to_string())?;
    usuarios.eliminar_usuario(uid).map_err(|e| e.to_string())?;

    info!(uid, "usuario eliminado");
    Ok(())
}

async fn solicitar(
    identidad: &impl ProveedorIdentidad,
    usuarios: &impl RepositorioUsuarios,
    registro: &impl RegistroRestablecimientos,
    notificador: &dyn Notificador,
    opciones: OpcionesRestablecimiento<'_>,
    uid: i64,
    ahora: DateTime<Utc>,
) -> Result<(), ErrorApp> {
    let usuario = usuarios
        .obtener_usuario(uid)?
        .ok_or(ErrorApp::NoEncontrado("Usuario"))?;

    if esta_bloqueado(registro.ultimo_envio(uid)?, ahora) {
        return Err(ErrorApp::RestablecimientoBloqueado);
    }

    let token = identidad.crear_token_restablecimiento(&usuario.email, ahora)?;
    let enlace = format!(
        "{}/restablecer?token={}",
        opciones.url_app.trim_end_matches('/'),
        token
    );
    let correo = correo_restablecimiento(
        &usuario.email,
        &usuario.nombre,
        opciones.nombre_agencia,
        &enlace,
    );

    notificador.enviar(&correo).await?;

    // Solo cuenta como envio si el correo salio
    registro.registrar_envio(uid, ahora)?;
    Ok(())
}

/// Envia el correo de recuperacion de contraseña a un usuario. Si ya se
/// envio uno en la ultima hora se rechaza. Requiere ADMIN.
pub async fn solicitar_restablecimiento(
    identidad: &impl ProveedorIdentidad,
    usuarios: &impl RepositorioUsuarios,
    registro: &impl RegistroRestablecimientos,
    notificador: &dyn Notificador,
    opciones: OpcionesRestablecimiento<'_>,
    sesion: &ContextoSesion,
    uid: i64,
) -> Result<String, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    match solicitar(identidad, usuarios, registro, notificador, opciones, uid, Utc::now()).await {
        Ok(()) => {
            info!(uid, "correo de recuperación enviado");
            Ok("Correo de recuperación enviado correctamente.".to_string())
        }
        Err(ErrorApp::RestablecimientoBloqueado) => {
            warn!(uid, "recuperación bloqueada, envío reciente");
            Err(ErrorApp::RestablecimientoBloqueado.to_string())
        }
        Err(e) => {
            error!(uid, error = %e, "error enviando correo de recuperación");
            Err("Error enviando correo de recuperación.".to_string())
        }
    }
}

/// Aplica la nueva contraseña a partir del token recibido por correo
pub fn confirmar_restablecimiento(
    identidad: &impl ProveedorIdentidad,
    token: String,
    nueva_contrasena: String,
) -> Result<String, String> {
    identidad
        .restablecer_contrasena(&token, &nueva_contrasena, Utc::now())
        .map_err(|e| e.to_string())?;
    Ok("Contraseña actualizada. Inicie sesión nuevamente.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correo::tests::NotificadorMemoria;
    use crate::db::Database;
    use crate::models::Vigencia;
    use crate::sesion::tests::crear_usuario;
    use chrono::Duration;

    const OPCIONES: OpcionesRestablecimiento<'static> = OpcionesRestablecimiento {
        url_app: "http://localhost:3000/",
        nombre_agencia: "Casa Nova",
    };

    fn nuevo(email: &str, rol: Rol) -> NuevoUsuario {
        NuevoUsuario {
            email: email.to_string(),
            contrasena: "secreta1".to_string(),
            nombre: "Luis".to_string(),
            apellidos: "Vargas".to_string(),
            rol,
            telefono: "76000000".to_string(),
        }
    }

    fn con_admin() -> (Database, ContextoSesion) {
        let db = Database::en_memoria().unwrap();
        let admin = crear_usuario(&db, "admin@inmo.com", Rol::Administrador);
        (db, ContextoSesion::con_usuario(admin))
    }

    #[test]
    fn test_registrar_usuario() {
        let (db, sesion) = con_admin();
        let luis = registrar_usuario(&db, &db, &sesion, nuevo("luis@inmo.com", Rol::Vendedor)).unwrap();
        assert_eq!(luis.vigencia, Vigencia::Activo);
        assert_eq!(db.autenticar("luis@inmo.com", "secreta1").unwrap(), luis.uid);

        let err = registrar_usuario(&db, &db, &sesion, nuevo("luis@inmo.com", Rol::Empleado))
            .unwrap_err();
        assert_eq!(err, "El correo electrónico ya está en uso.");

        let mut debil = nuevo("otro@inmo.com", Rol::Empleado);
        debil.contrasena = "123".to_string();
        assert_eq!(
            registrar_usuario(&db, &db, &sesion, debil).unwrap_err(),
            "La contraseña es demasiado débil."
        );
    }

    #[test]
    fn test_registrar_requiere_admin_y_campos() {
        let (db, sesion) = con_admin();
        let vendedor = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);
        let err = registrar_usuario(
            &db,
            &db,
            &ContextoSesion::con_usuario(vendedor),
            nuevo("x@inmo.com", Rol::Vendedor),
        )
        .unwrap_err();
        assert_eq!(err, "Se requiere permisos de administrador");

        let mut sin_nombre = nuevo("x@inmo.com", Rol::Vendedor);
        sin_nombre.nombre = String::new();
        assert_eq!(
            registrar_usuario(&db, &db, &sesion, sin_nombre).unwrap_err(),
            "Todos los campos son requeridos."
        );
    }

    #[test]
    fn test_eliminar_y_listar() {
        let (db, sesion) = con_admin();
        let ven = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);

        eliminar_usuario(&db, &sesion, ven.uid).unwrap();

        let activos = listar_usuarios_activos(&db, &sesion).unwrap();
        assert!(activos.iter().all(|u| u.uid != ven.uid));
        let todos = listar_usuarios(&db, &sesion).unwrap();
        let eliminado = todos.iter().find(|u| u.uid == ven.uid).unwrap();
        assert_eq!(eliminado.vigencia, Vigencia::Eliminado);
    }

    #[test]
    fn test_ultimo_administrador_protegido() {
        let (db, sesion) = con_admin();
        let admin_uid = sesion.usuario().unwrap().uid;

        assert_eq!(
            eliminar_usuario(&db, &sesion, admin_uid).unwrap_err(),
            ErrorApp::UltimoAdministrador.to_string()
        );
        let degradar = CambiosUsuario {
            rol: Some(Rol::Vendedor),
            ..Default::default()
        };
        assert!(actualizar_usuario(&db, &sesion, admin_uid, degradar.clone()).is_err());

        // Con un segundo administrador si se puede
        crear_usuario(&db, "admin2@inmo.com", Rol::Administrador);
        let actualizado = actualizar_usuario(&db, &sesion, admin_uid, degradar).unwrap();
        assert_eq!(actualizado.rol, Rol::Vendedor);
    }

    #[test]
    fn test_actualizar_usuario() {
        let (db, sesion) = con_admin();
        let ven = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);
        let cambios = CambiosUsuario {
            nombre: Some("Carla".to_string()),
            ..Default::default()
        };
        let actualizado = actualizar_usuario(&db, &sesion, ven.uid, cambios).unwrap();
        assert_eq!(actualizado.nombre, "Carla");
        assert_eq!(obtener_usuario(&db, &sesion, ven.uid).unwrap(), actualizado);
        assert!(obtener_usuario(&db, &sesion, 999).is_err());
    }

    #[tokio::test]
    async fn test_restablecimiento_bloqueado_dentro_de_una_hora() {
        let (db, sesion) = con_admin();
        let ven = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);
        let notificador = NotificadorMemoria::default();

        let primero =
            solicitar_restablecimiento(&db, &db, &db, &notificador, OPCIONES, &sesion, ven.uid)
                .await;
        assert_eq!(primero.unwrap(), "Correo de recuperación enviado correctamente.");

        let segundo =
            solicitar_restablecimiento(&db, &db, &db, &notificador, OPCIONES, &sesion, ven.uid)
                .await;
        assert_eq!(
            segundo.unwrap_err(),
            "Ya se envió un correo de recuperación recientemente. Inténtalo más tarde."
        );

        let enviados = notificador.enviados.lock().unwrap();
        assert_eq!(enviados.len(), 1);
        assert_eq!(enviados[0].destinatario, "ven@inmo.com");
        assert!(enviados[0]
            .cuerpo_html
            .contains("http://localhost:3000/restablecer?token="));
    }

    #[tokio::test]
    async fn test_restablecimiento_por_usuario_y_tras_una_hora() {
        let (db, _) = con_admin();
        let ana = crear_usuario(&db, "ana@inmo.com", Rol::Vendedor);
        let luis = crear_usuario(&db, "luis@inmo.com", Rol::Empleado);
        let notificador = NotificadorMemoria::default();
        let ahora = Utc::now();

        solicitar(&db, &db, &db, &notificador, OPCIONES, ana.uid, ahora)
            .await
            .unwrap();
        // Otro usuario no se ve afectado
        solicitar(&db, &db, &db, &notificador, OPCIONES, luis.uid, ahora)
            .await
            .unwrap();
        // Pasada la hora se permite otra vez
        solicitar(&db, &db, &db, &notificador, OPCIONES, ana.uid, ahora + Duration::minutes(61))
            .await
            .unwrap();
        assert_eq!(notificador.enviados.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fallo_de_envio_no_bloquea() {
        let (db, sesion) = con_admin();
        let ven = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);
        let caido = NotificadorMemoria {
            fallar: true,
            ..Default::default()
        };

        let err = solicitar_restablecimiento(&db, &db, &db, &caido, OPCIONES, &sesion, ven.uid)
            .await
            .unwrap_err();
        assert_eq!(err, "Error enviando correo de recuperación.");
        assert_eq!(db.ultimo_envio(ven.uid).unwrap(), None);
    }

    #[test]
    fn test_confirmar_restablecimiento() {
        let (db, _) = con_admin();
        let ven = crear_usuario(&db, "ven@inmo.com", Rol::Vendedor);
        let token = db.crear_token_restablecimiento("ven@inmo.com", Utc::now()).unwrap();

        confirmar_restablecimiento(&db, token.clone(), "clave-nueva".to_string()).unwrap();
        assert_eq!(db.autenticar("ven@inmo.com", "clave-nueva").unwrap(), ven.uid);
        assert!(confirmar_restablecimiento(&db, token, "otra-clave".to_string()).is_err());
    }
}
