use crate::error::ErrorApp;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub const MIME_WEBP: &str = "image/webp";

/// Imagen elegida en el formulario, tal como se leyo del disco
#[derive(Debug, Clone)]
pub struct ImagenSeleccionada {
    pub nombre: String,
    pub bytes: Vec<u8>,
}

/// Decodifica la imagen (png, jpeg o webp) y la recodifica como WebP.
/// Retorna un data URL `data:image/webp;base64,...` listo para subir.
pub fn convertir_a_webp_data_url(bytes: &[u8]) -> Result<String, ErrorApp> {
    let imagen = image::load_from_memory(bytes)?;
    // El codificador WebP solo acepta 8 bits por canal
    let rgba = DynamicImage::ImageRgba8(imagen.to_rgba8());

    let mut salida = Cursor::new(Vec::new());
    rgba.write_to(&mut salida, ImageFormat::WebP)?;

    Ok(format!("data:{};base64,{}", MIME_WEBP, BASE64.encode(salida.into_inner())))
}

/// Separa un data URL en (tipo MIME, bytes)
pub fn decodificar_data_url(data_url: &str) -> Result<(String, Vec<u8>), ErrorApp> {
    let invalido = || ErrorApp::Validacion("Data URL inválido".to_string());

    let resto = data_url.strip_prefix("data:").ok_or_else(invalido)?;
    let (cabecera, datos) = resto.split_once(',').ok_or_else(invalido)?;
    let mime = cabecera.strip_suffix(";base64").ok_or_else(invalido)?;

    let bytes = BASE64.decode(datos).map_err(|_| invalido())?;
    Ok((mime.to_string(), bytes))
}
