use crate::error::ErrorApp;
use crate::models::{CambiosCliente, Cliente, NuevoCliente};
use crate::repos::RepositorioClientes;
use crate::sesion::ContextoSesion;
use crate::utils::campos_vacios;
use tracing::{error, info};

/// Registra un cliente. Siempre nace activo. Cualquier usuario activo puede
/// registrar clientes.
pub fn crear_cliente(
    clientes: &impl RepositorioClientes,
    sesion: &ContextoSesion,
    cliente: NuevoCliente,
) -> Result<Cliente, String> {
    sesion.requerir_usuario().map_err(|e| e.to_string())?;

    let faltantes = campos_vacios(&[
        ("nombre_completo", cliente.nombre_completo.as_str()),
        ("telefono", cliente.telefono.as_str()),
    ]);
    if !faltantes.is_empty() {
        return Err(ErrorApp::CamposRequeridos(faltantes).to_string());
    }

    let p = &cliente.preferencias;
    if p.precio_min < 0.0 || p.precio_max < 0.0 {
        return Err(ErrorApp::Validacion("Los precios no pueden ser negativos".to_string()).to_string());
    }

    let creado = clientes.insertar_cliente(&cliente).map_err(|e| {
        error!(error = %e, "error registrando cliente");
        "Error al registrar el cliente. Intenta nuevamente.".to_string()
    })?;

    info!(uid = creado.uid, "cliente registrado");
    Ok(creado)
}

/// Clientes activos, ordenados por nombre
pub fn listar_clientes(
    clientes: &impl RepositorioClientes,
    sesion: &ContextoSesion,
) -> Result<Vec<Cliente>, String> {
    sesion.requerir_usuario().map_err(|e| e.to_string())?;
    clientes.listar_clientes_activos().map_err(|e| e.to_string())
}

pub fn obtener_cliente(
    clientes: &impl RepositorioClientes,
    sesion: &ContextoSesion,
    uid: i64,
) -> Result<Cliente, String> {
    sesion.requerir_usuario().map_err(|e| e.to_string())?;
    clientes
        .obtener_cliente(uid)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| ErrorApp::NoEncontrado("Cliente").to_string())
}

pub fn actualizar_cliente(
    clientes: &impl RepositorioClientes,
    sesion: &ContextoSesion,
    uid: i64,
    cambios: CambiosCliente,
) -> Result<Cliente, String> {
    sesion.requerir_usuario().map_err(|e| e.to_string())?;

    let vacios: Vec<&'static str> = [
        ("nombre_completo", cambios.nombre_completo.as_deref()),
        ("telefono", cambios.telefono.as_deref()),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_some_and(|s| s.trim().is_empty()))
    .map(|(campo, _)| campo)
    .collect();
    if !vacios.is_empty() {
        return Err(ErrorApp::CamposRequeridos(vacios).to_string());
    }

    let actualizado = clientes
        .actualizar_cliente(uid, &cambios)
        .map_err(|e| e.to_string())?;
    info!(uid, "cliente actualizado");
    Ok(actualizado)
}

/// Eliminacion logica: el cliente queda ELIMINADO y sale de los listados
pub fn eliminar_cliente(
    clientes: &impl RepositorioClientes,
    sesion: &ContextoSesion,
    uid: i64,
) -> Result<(), String> {
    sesion.requerir_usuario().map_err(|e| e.to_string())?;
    clientes.eliminar_cliente(uid).map_err(|e| e.to_string())?;
    info!(uid, "cliente eliminado");
    Ok(())
}
