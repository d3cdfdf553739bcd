//! QR login cards for registered patients.
//!
//! The card encodes `https://<public_host>/?email=<email>&id=<id>` and is
//! stored as an SVG data URL so clients can drop it straight into `<img>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("Invalid public host: {0}")]
    InvalidHost(String),

    #[error("QR generation failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Build the login URL a patient's QR card points at.
pub fn patient_login_url(public_host: &str, email: &str, patient_id: i64) -> Result<Url, QrError> {
    if public_host.is_empty() || public_host.contains("://") || public_host.contains('/') {
        return Err(QrError::InvalidHost(public_host.to_string()));
    }
    let mut url = Url::parse(&format!("https://{public_host}/"))
        .map_err(|_| QrError::InvalidHost(public_host.to_string()))?;
    url.query_pairs_mut()
        .append_pair("email", email)
        .append_pair("id", &patient_id.to_string());
    Ok(url)
}

pub fn render_svg(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;

    let svg_string = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .max_dimensions(300, 300)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .quiet_zone(true)
        .build();

    Ok(svg_string)
}

pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Login URL → QR → data URL, the value stored in `patients.qr_code`.
pub fn patient_qr_code(public_host: &str, email: &str, patient_id: i64) -> Result<String, QrError> {
    let url = patient_login_url(public_host, email, patient_id)?;
    let svg = render_svg(url.as_str())?;
    Ok(svg_data_url(&svg))
}
