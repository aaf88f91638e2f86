//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;

use crate::registry::TlsFiles;

/// Load a rustls config from the PEM certificate and key files.
pub async fn load_tls_config(files: &TlsFiles) -> Result<RustlsConfig, std::io::Error> {
    if !files.cert.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", files.cert),
        ));
    }
    if !files.key.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", files.key),
        ));
    }

    RustlsConfig::from_pem_file(&files.cert, &files.key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_certificate_is_not_found() {
        let files = TlsFiles::new("does/not/exist.crt", "does/not/exist.pem");
        let err = load_tls_config(&files).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("Certificate file not found"));
    }
}
