//! Logging setup and Prometheus text rendering shared by both services.

use prometheus::{Encoder, Registry, TextEncoder};

pub fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Renders every metric family in `registry`.
///
/// Returns the content type together with the body.
pub fn render(registry: &Registry) -> prometheus::Result<(String, String)> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;

    Ok((
        encoder.format_type().to_string(),
        String::from_utf8_lossy(&buffer).into_owned(),
    ))
}
