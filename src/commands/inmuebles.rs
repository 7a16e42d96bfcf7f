use crate::almacen::{ruta_imagen_inmueble, AlmacenObjetos};
use crate::error::ErrorApp;
use crate::formulario::FormularioInmueble;
use crate::imagenes::convertir_a_webp_data_url;
use crate::models::{CambiosInmueble, Inmueble};
use crate::repos::RepositorioInmuebles;
use crate::sesion::ContextoSesion;
use tracing::{debug, error, info, warn};

const ERROR_GUARDAR: &str = "Error al guardar el inmueble. Intenta nuevamente.";

/// Valida el formulario completo, crea el registro y sube sus imagenes.
///
/// La validacion ocurre antes de tocar cualquier servicio. Si algo falla
/// despues de insertar no se deshace nada: el registro puede quedar sin
/// imagenes o con solo parte de ellas subidas.
pub fn guardar_inmueble_con_imagenes(
    inmuebles: &impl RepositorioInmuebles,
    almacen: &impl AlmacenObjetos,
    formulario: &FormularioInmueble,
) -> Result<Inmueble, ErrorApp> {
    let nuevo = formulario.validar()?;

    if inmuebles.existe_codigo_activo(&nuevo.codigo)? {
        return Err(ErrorApp::CodigoDuplicado);
    }
    let inmueble = inmuebles.insertar_inmueble(&nuevo)?;

    let mut urls = Vec::with_capacity(formulario.imagenes().len());
    for (indice, imagen) in formulario.imagenes().iter().enumerate() {
        let data_url = convertir_a_webp_data_url(&imagen.bytes)?;
        let ruta = ruta_imagen_inmueble(inmueble.id, indice);
        almacen.subir_data_url(&ruta, &data_url)?;
        urls.push(almacen.url_descarga(&ruta)?);
        debug!(id = inmueble.id, imagen = %imagen.nombre, ruta = %ruta, "imagen subida");
    }

    if urls.is_empty() {
        return Ok(inmueble);
    }
    inmuebles.asignar_imagenes(inmueble.id, &urls)
}

/// Envia el formulario. Si se guarda bien el formulario vuelve al primer
/// paso vacio. Requiere ADMIN.
pub fn registrar_inmueble(
    inmuebles: &impl RepositorioInmuebles,
    almacen: &impl AlmacenObjetos,
    sesion: &ContextoSesion,
    formulario: &mut FormularioInmueble,
) -> Result<Inmueble, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    match guardar_inmueble_con_imagenes(inmuebles, almacen, formulario) {
        Ok(inmueble) => {
            info!(
                id = inmueble.id,
                codigo = %inmueble.codigo,
                imagenes = inmueble.imagenes_urls.len(),
                "inmueble registrado"
            );
            formulario.reiniciar();
            Ok(inmueble)
        }
        Err(ErrorApp::CamposRequeridos(campos)) => {
            warn!(?campos, "formulario de inmueble incompleto");
            Err(ErrorApp::CamposRequeridos(campos).to_string())
        }
        Err(e @ ErrorApp::CodigoDuplicado) => {
            warn!(codigo = %formulario.borrador.codigo, "código de inmueble duplicado");
            Err(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "error al guardar el inmueble");
            Err(ERROR_GUARDAR.to_string())
        }
    }
}

/// Inmuebles activos, los mas recientes primero
pub fn listar_inmuebles(
    inmuebles: &impl RepositorioInmuebles,
    sesion: &ContextoSesion,
) -> Result<Vec<Inmueble>, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    inmuebles.listar_inmuebles_activos().map_err(|e| e.to_string())
}

pub fn obtener_inmueble(
    inmuebles: &impl RepositorioInmuebles,
    sesion: &ContextoSesion,
    id: i64,
) -> Result<Inmueble, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    inmuebles
        .obtener_inmueble(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| ErrorApp::NoEncontrado("Inmueble").to_string())
}

pub fn buscar_inmueble_por_codigo(
    inmuebles: &impl RepositorioInmuebles,
    sesion: &ContextoSesion,
    codigo: String,
) -> Result<Inmueble, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    inmuebles
        .buscar_por_codigo(&codigo)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| ErrorApp::NoEncontrado("Inmueble").to_string())
}

/// Cambios parciales; codigo, fechas y vigencia no se modifican aqui
pub fn actualizar_inmueble(
    inmuebles: &impl RepositorioInmuebles,
    sesion: &ContextoSesion,
    id: i64,
    cambios: CambiosInmueble,
) -> Result<Inmueble, String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;

    let negativos = [
        cambios.precio_venta,
        cambios.precio_propietario,
        cambios.precio_m2,
        cambios.superficie,
        cambios.superficie_construida,
        cambios.frente,
    ];
    if negativos.iter().flatten().any(|v| *v < 0.0) {
        return Err(ErrorApp::Validacion("Los valores numéricos no pueden ser negativos".to_string())
            .to_string());
    }

    let actualizado = inmuebles
        .actualizar_inmueble(id, &cambios)
        .map_err(|e| e.to_string())?;
    info!(id, "inmueble actualizado");
    Ok(actualizado)
}

pub fn eliminar_inmueble(
    inmuebles: &impl RepositorioInmuebles,
    sesion: &ContextoSesion,
    id: i64,
) -> Result<(), String> {
    sesion.requerir_administrador().map_err(|e| e.to_string())?;
    inmuebles.eliminar_inmueble(id).map_err(|e| e.to_string())?;
    info!(id, "inmueble eliminado");
    Ok(())
}
