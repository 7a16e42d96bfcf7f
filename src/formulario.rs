//! Formulario de registro de inmuebles en tres pasos:
//! Propietario -> Informacion -> Caracteristicas (+ imagenes).

use crate::error::ErrorApp;
use crate::imagenes::ImagenSeleccionada;
use crate::models::{calcular_vencimiento, EstadoInmueble, NuevoInmueble, Propietario, Servicio};
use crate::utils::campos_vacios;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Paso {
    #[default]
    Propietario,
    Informacion,
    Caracteristicas,
}

impl Paso {
    pub fn numero(&self) -> u8 {
        match self {
            Paso::Propietario => 1,
            Paso::Informacion => 2,
            Paso::Caracteristicas => 3,
        }
    }

    fn siguiente(self) -> Self {
        match self {
            Paso::Propietario => Paso::Informacion,
            Paso::Informacion | Paso::Caracteristicas => Paso::Caracteristicas,
        }
    }

    fn anterior(self) -> Self {
        match self {
            Paso::Caracteristicas => Paso::Informacion,
            Paso::Informacion | Paso::Propietario => Paso::Propietario,
        }
    }
}

/// Valores tal como se escriben en el formulario (texto libre)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorradorInmueble {
    pub codigo: String,
    pub tipo: String,
    pub direccion: String,
    pub ubicacion_url: String,
    pub zona: String,
    pub area: String,
    pub precio_venta: String,
    pub precio_propietario: String,
    pub precio_m2: String,
    pub estado: EstadoInmueble,
    pub numero_pisos: String,
    pub superficie: String,
    pub superficie_construida: String,
    pub frente: String,
    pub caracteristicas: String,
    pub servicios: Vec<Servicio>,
    pub propietario: Propietario,
    pub fecha_registro: Option<NaiveDate>,
}

impl Default for BorradorInmueble {
    fn default() -> Self {
        BorradorInmueble {
            codigo: String::new(),
            tipo: String::new(),
            direccion: String::new(),
            ubicacion_url: String::new(),
            zona: String::new(),
            area: String::new(),
            precio_venta: String::new(),
            precio_propietario: String::new(),
            precio_m2: String::new(),
            estado: EstadoInmueble::Disponible,
            numero_pisos: String::new(),
            superficie: String::new(),
            superficie_construida: String::new(),
            frente: String::new(),
            caracteristicas: String::new(),
            servicios: Vec::new(),
            propietario: Propietario::default(),
            fecha_registro: Some(Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormularioInmueble {
    paso: Paso,
    pub borrador: BorradorInmueble,
    imagenes: Vec<ImagenSeleccionada>,
}

impl FormularioInmueble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paso(&self) -> Paso {
        self.paso
    }

    /// Avanza un paso; en el ultimo se queda
    pub fn siguiente(&mut self) -> Paso {
        self.paso = self.paso.siguiente();
        self.paso
    }

    pub fn anterior(&mut self) -> Paso {
        self.paso = self.paso.anterior();
        self.paso
    }

    pub fn es_ultimo_paso(&self) -> bool {
        self.paso == Paso::Caracteristicas
    }

    /// Agrega un servicio; los nombres vacios se ignoran
    pub fn agregar_servicio(&mut self, nombre: &str) {
        let nombre = nombre.trim();
        if !nombre.is_empty() {
            self.borrador.servicios.push(Servicio {
                nombre: nombre.to_string(),
            });
        }
    }

    pub fn quitar_servicio(&mut self, indice: usize) {
        if indice < self.borrador.servicios.len() {
            self.borrador.servicios.remove(indice);
        }
    }

    /// Reemplaza la seleccion de imagenes
    pub fn seleccionar_imagenes(&mut self, imagenes: Vec<ImagenSeleccionada>) {
        self.imagenes = imagenes;
    }

    pub fn imagenes(&self) -> &[ImagenSeleccionada] {
        &self.imagenes
    }

    /// Fecha de vencimiento derivada (no editable)
    pub fn fecha_vencimiento(&self) -> Option<NaiveDate> {
        self.borrador
            .fecha_registro
            .and_then(|f| calcular_vencimiento(f).ok())
    }

    /// Vuelve al primer paso con un borrador vacio
    pub fn reiniciar(&mut self) {
        *self = Self::default();
    }

    /// Valida los campos de los tres pasos a la vez. Si falta alguno
    /// retorna un unico error con la lista de campos.
    pub fn validar(&self) -> Result<NuevoInmueble, ErrorApp> {
        let b = &self.borrador;
        let p = &b.propietario;

        let mut faltantes = campos_vacios(&[
            ("codigo", b.codigo.as_str()),
            ("tipo", b.tipo.as_str()),
            ("direccion", b.direccion.as_str()),
            ("ubicacion_url", b.ubicacion_url.as_str()),
            ("zona", b.zona.as_str()),
            ("area", b.area.as_str()),
            ("caracteristicas", b.caracteristicas.as_str()),
            ("propietario.nombre_completo", p.nombre_completo.as_str()),
            ("propietario.telefono", p.telefono.as_str()),
            ("propietario.ci", p.ci.as_str()),
            ("propietario.domicilio", p.domicilio.as_str()),
        ]);

        let precio_venta = numero::<f64>("precio_venta", &b.precio_venta, &mut faltantes);
        let precio_propietario =
            numero::<f64>("precio_propietario", &b.precio_propietario, &mut faltantes);
        let precio_m2 = numero::<f64>("precio_m2", &b.precio_m2, &mut faltantes);
        let numero_pisos = numero::<u32>("numero_pisos", &b.numero_pisos, &mut faltantes);
        let superficie = numero::<f64>("superficie", &b.superficie, &mut faltantes);
        let superficie_construida =
            numero::<f64>("superficie_construida", &b.superficie_construida, &mut faltantes);
        let frente = numero::<f64>("frente", &b.frente, &mut faltantes);

        let fecha_registro = match b.fecha_registro {
            Some(f) if calcular_vencimiento(f).is_ok() => Some(f),
            _ => {
                faltantes.push("fecha_registro");
                None
            }
        };

        match (
            precio_venta,
            precio_propietario,
            precio_m2,
            numero_pisos,
            superficie,
            superficie_construida,
            frente,
            fecha_registro,
        ) {
            (
                Some(precio_venta),
                Some(precio_propietario),
                Some(precio_m2),
                Some(numero_pisos),
                Some(superficie),
                Some(superficie_construida),
                Some(frente),
                Some(fecha_registro),
            ) if faltantes.is_empty() => Ok(NuevoInmueble {
                codigo: b.codigo.trim().to_string(),
                tipo: b.tipo.trim().to_string(),
                direccion: b.direccion.trim().to_string(),
                ubicacion_url: b.ubicacion_url.trim().to_string(),
                zona: b.zona.trim().to_string(),
                area: b.area.trim().to_string(),
                precio_venta,
                precio_propietario,
                precio_m2,
                estado: b.estado,
                numero_pisos,
                superficie,
                superficie_construida,
                frente,
                caracteristicas: b.caracteristicas.trim().to_string(),
                servicios: b.servicios.clone(),
                propietario: p.clone(),
                fecha_registro,
            }),
            _ => Err(ErrorApp::CamposRequeridos(faltantes)),
        }
    }
}

/// Valores numericos del formulario; descarta infinitos y NaN
trait Numero: FromStr + PartialOrd + Default {
    fn es_finito(&self) -> bool;
}

impl Numero for f64 {
    fn es_finito(&self) -> bool {
        self.is_finite()
    }
}

impl Numero for u32 {
    fn es_finito(&self) -> bool {
        true
    }
}

/// Interpreta un campo numerico con punto decimal. Si esta vacio, no es un
/// numero finito o es negativo lo anota como faltante. No se aceptan
/// separadores de miles.
fn numero<T: Numero>(
    campo: &'static str,
    valor: &str,
    faltantes: &mut Vec<&'static str>,
) -> Option<T> {
    match valor.trim().parse::<T>() {
        Ok(n) if n.es_finito() && n >= T::default() => Some(n),
        _ => {
            faltantes.push(campo);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn formulario_completo(codigo: &str) -> FormularioInmueble {
        let mut f = FormularioInmueble::new();
        f.borrador.propietario = Propietario {
            nombre_completo: "Marta Quiroga".to_string(),
            telefono: "71234567".to_string(),
            ci: "4567890".to_string(),
            domicilio: "Av. Heroínas 45".to_string(),
            ..Default::default()
        };
        f.siguiente();
        f.borrador.codigo = codigo.to_string();
        f.borrador.tipo = "casa".to_string();
        f.borrador.direccion = "Calle Jordán 123".to_string();
        f.borrador.ubicacion_url = "https://maps.example.com/?q=-17.39,-66.15".to_string();
        f.borrador.zona = "Centro".to_string();
        f.borrador.area = "urbana".to_string();
        f.borrador.precio_venta = "150000".to_string();
        f.borrador.precio_propietario = "140000".to_string();
        f.borrador.precio_m2 = "750.5".to_string();
        f.siguiente();
        f.borrador.numero_pisos = "2".to_string();
        f.borrador.superficie = "200".to_string();
        f.borrador.superficie_construida = "180".to_string();
        f.borrador.frente = "10".to_string();
        f.borrador.caracteristicas = "3 dormitorios".to_string();
        f.borrador.fecha_registro = NaiveDate::from_ymd_opt(2024, 3, 15);
        f.agregar_servicio("agua");
        f
    }

    #[test]
    fn test_pasos_lineales() {
        let mut f = FormularioInmueble::new();
        assert_eq!(f.paso(), Paso::Propietario);
        assert_eq!(f.anterior(), Paso::Propietario);
        assert_eq!(f.siguiente(), Paso::Informacion);
        assert_eq!(f.siguiente(), Paso::Caracteristicas);
        assert!(f.es_ultimo_paso());
        assert_eq!(f.siguiente(), Paso::Caracteristicas);
        assert_eq!(f.anterior(), Paso::Informacion);
        assert_eq!(f.paso().numero(), 2);
    }

    #[test]
    fn test_validar_formulario_completo() {
        let f = formulario_completo("INM-010");
        let nuevo = f.validar().unwrap();
        assert_eq!(nuevo.codigo, "INM-010");
        assert_eq!(nuevo.precio_m2, 750.5);
        assert_eq!(nuevo.numero_pisos, 2);
        assert_eq!(nuevo.servicios.len(), 1);
        assert_eq!(
            f.fecha_vencimiento(),
            NaiveDate::from_ymd_opt(2024, 9, 15)
        );
    }

    #[test]
    fn test_error_agrega_todos_los_pasos() {
        let mut f = formulario_completo("INM-010");
        f.borrador.propietario.ci = String::new();
        f.borrador.zona = "  ".to_string();
        f.borrador.frente = "diez".to_string();
        f.borrador.fecha_registro = None;

        match f.validar() {
            Err(ErrorApp::CamposRequeridos(campos)) => {
                assert_eq!(
                    campos,
                    vec!["zona", "propietario.ci", "frente", "fecha_registro"]
                );
            }
            otro => panic!("se esperaba CamposRequeridos, llego {:?}", otro),
        }
    }

    #[test]
    fn test_numeros_mal_formados() {
        for valor in ["150,000", "1.500,50", "inf", "-inf", "NaN", "1e400", "-5"] {
            let mut f = formulario_completo("INM-010");
            f.borrador.precio_venta = valor.to_string();
            match f.validar() {
                Err(ErrorApp::CamposRequeridos(campos)) => {
                    assert_eq!(campos, vec!["precio_venta"], "valor {:?}", valor)
                }
                otro => panic!("{:?} deberia rechazarse, llego {:?}", valor, otro),
            }
        }

        let mut f = formulario_completo("INM-010");
        f.borrador.precio_venta = " 150000.75 ".to_string();
        assert_eq!(f.validar().unwrap().precio_venta, 150_000.75);
    }

    #[test]
    fn test_formulario_vacio() {
        let f = FormularioInmueble::new();
        match f.validar() {
            Err(ErrorApp::CamposRequeridos(campos)) => assert_eq!(campos.len(), 18),
            otro => panic!("se esperaba CamposRequeridos, llego {:?}", otro),
        }
    }

    #[test]
    fn test_servicios() {
        let mut f = FormularioInmueble::new();
        f.agregar_servicio("agua");
        f.agregar_servicio("   ");
        f.agregar_servicio("luz");
        f.quitar_servicio(0);
        f.quitar_servicio(9);
        assert_eq!(f.borrador.servicios, vec![Servicio { nombre: "luz".to_string() }]);
    }

    #[test]
    fn test_reiniciar() {
        let mut f = formulario_completo("INM-010");
        f.seleccionar_imagenes(vec![ImagenSeleccionada {
            nombre: "frente.png".to_string(),
            bytes: vec![1, 2, 3],
        }]);
        f.reiniciar();
        assert_eq!(f.paso(), Paso::Propietario);
        assert!(f.imagenes().is_empty());
        assert!(f.borrador.codigo.is_empty());
    }
}
