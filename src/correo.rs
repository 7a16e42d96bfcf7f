use crate::db::Database;
use crate::error::ErrorApp;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Correo {
    pub destinatario: String,
    pub asunto: String,
    pub cuerpo_html: String,
}

/// Canal de envio de correos transaccionales
#[async_trait]
pub trait Notificador: Send + Sync {
    async fn enviar(&self, correo: &Correo) -> Result<(), ErrorApp>;
}

/// Cliente del servicio HTTP de email (`POST {url}/enviar-email`)
pub struct ServicioCorreoHttp {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ServicioCorreoHttp {
    pub fn new(url: &str, api_key: &str) -> Result<Self, ErrorApp> {
        if url.is_empty() || api_key.is_empty() {
            return Err(ErrorApp::CorreoNoConfigurado);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(ServicioCorreoHttp {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Lee `email_service_url` y `email_service_api_key` de la tabla config
    pub fn desde_config(db: &Database) -> Result<Self, ErrorApp> {
        let url = db.leer_config("email_service_url")?;
        let api_key = db.leer_config("email_service_api_key")?;
        Self::new(&url, &api_key)
    }
}

#[async_trait]
impl Notificador for ServicioCorreoHttp {
    async fn enviar(&self, correo: &Correo) -> Result<(), ErrorApp> {
        let body = serde_json::json!({
            "destinatario": correo.destinatario,
            "asunto": correo.asunto,
            "cuerpo_html": correo.cuerpo_html,
            "adjuntos": [],
        });

        let resp = self
            .client
            .post(format!("{}/enviar-email", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err_body = resp.text().await.unwrap_or_default();
            return Err(ErrorApp::EnvioCorreo(err_body));
        }

        Ok(())
    }
}

pub fn correo_restablecimiento(
    destinatario: &str,
    nombre: &str,
    nombre_agencia: &str,
    enlace: &str,
) -> Correo {
    let cuerpo_html = format!(
        r#"<div style="font-family:Arial,sans-serif;max-width:600px;margin:0 auto">
        <h2 style="color:#1e40af">{}</h2>
        <p>Hola {},</p>
        <p>Recibimos una solicitud para restablecer su contraseña.</p>
        <p><a href="{}">Restablecer contraseña</a></p>
        <p>El enlace vence en 24 horas. Si no solicitó el cambio, ignore este mensaje.</p>
        </div>"#,
        nombre_agencia, nombre, enlace
    );

    Correo {
        destinatario: destinatario.to_string(),
        asunto: format!("Recuperación de contraseña - {}", nombre_agencia),
        cuerpo_html,
    }
}
