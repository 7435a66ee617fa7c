//! Terminal rendering of the device pairing code.

use qrcode::QrCode;
use tracing::{info, warn};

/// Renders `code` as a QR image made of block characters, two columns per
/// module so it stays square in a terminal.
pub fn render(code: &str) -> Result<String, qrcode::types::QrError> {
    let qr = QrCode::new(code.as_bytes())?;
    Ok(qr
        .render::<char>()
        .quiet_zone(false)
        .module_dimensions(2, 1)
        .build())
}

/// Prints the pairing QR for the operator to scan with the phone app.
pub fn show(code: &str) {
    match render(code) {
        Ok(image) => {
            info!("Scan the QR code below with WhatsApp (Linked devices):");
            println!("\n{image}\n");
        }
        Err(e) => warn!("Could not render pairing QR ({}); raw code: {}", e, code),
    }
}
