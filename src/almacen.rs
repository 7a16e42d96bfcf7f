use crate::error::ErrorApp;
use crate::imagenes;
use std::path::{Component, Path, PathBuf};

/// Almacenamiento de objetos: subida por string codificado (data URL) y
/// obtencion de la URL de descarga.
pub trait AlmacenObjetos {
    fn subir_data_url(&self, ruta: &str, data_url: &str) -> Result<(), ErrorApp>;
    fn url_descarga(&self, ruta: &str) -> Result<String, ErrorApp>;
}

/// Ruta de almacenamiento de la n-esima imagen de un inmueble
pub fn ruta_imagen_inmueble(inmueble_id: i64, indice: usize) -> String {
    format!("inmuebles/{}/image-{}.webp", inmueble_id, indice)
}

/// Almacen sobre un directorio local, servido bajo `url_base`
pub struct AlmacenLocal {
    raiz: PathBuf,
    url_base: String,
}

impl AlmacenLocal {
    pub fn new(raiz: impl Into<PathBuf>, url_base: impl Into<String>) -> Result<Self, ErrorApp> {
        let raiz = raiz.into();
        std::fs::create_dir_all(&raiz)?;
        Ok(AlmacenLocal {
            raiz,
            url_base: url_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Solo rutas relativas sin `..`
    fn resolver(&self, ruta: &str) -> Result<PathBuf, ErrorApp> {
        let relativa = Path::new(ruta);
        let valida = !ruta.is_empty()
            && relativa
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valida {
            return Err(ErrorApp::Validacion(format!("Ruta de almacenamiento inválida: {}", ruta)));
        }
        Ok(self.raiz.join(relativa))
    }
}

impl AlmacenObjetos for AlmacenLocal {
    fn subir_data_url(&self, ruta: &str, data_url: &str) -> Result<(), ErrorApp> {
        let destino = self.resolver(ruta)?;
        let (_mime, bytes) = imagenes::decodificar_data_url(data_url)?;

        if let Some(parent) = destino.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destino, bytes)?;
        Ok(())
    }

    fn url_descarga(&self, ruta: &str) -> Result<String, ErrorApp> {
        let destino = self.resolver(ruta)?;
        if !destino.is_file() {
            return Err(ErrorApp::NoEncontrado("Archivo"));
        }
        Ok(format!("{}/{}", self.url_base, ruta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subir_y_obtener_url() {
        let dir = tempfile::tempdir().unwrap();
        let almacen = AlmacenLocal::new(dir.path(), "https://cdn.inmo.com/").unwrap();
        let ruta = ruta_imagen_inmueble(7, 0);
        assert_eq!(ruta, "inmuebles/7/image-0.webp");

        almacen
            .subir_data_url(&ruta, "data:image/webp;base64,aG9sYQ==")
            .unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("inmuebles/7/image-0.webp")).unwrap(),
            b"hola"
        );
        assert_eq!(
            almacen.url_descarga(&ruta).unwrap(),
            "https://cdn.inmo.com/inmuebles/7/image-0.webp"
        );
    }

    #[test]
    fn test_url_de_archivo_inexistente() {
        let dir = tempfile::tempdir().unwrap();
        let almacen = AlmacenLocal::new(dir.path(), "https://cdn.inmo.com").unwrap();
        assert!(matches!(
            almacen.url_descarga("inmuebles/1/image-0.webp"),
            Err(ErrorApp::NoEncontrado(_))
        ));
    }

    #[test]
    fn test_rechaza_rutas_fuera_del_almacen() {
        let dir = tempfile::tempdir().unwrap();
        let almacen = AlmacenLocal::new(dir.path(), "https://cdn.inmo.com").unwrap();
        for ruta in ["../fuera.webp", "/etc/passwd", ""] {
            assert!(almacen
                .subir_data_url(ruta, "data:image/webp;base64,aG9sYQ==")
                .is_err());
        }
    }
}
