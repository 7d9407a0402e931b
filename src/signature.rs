//! # Signature Resolver
//!
//! Loads the authorised-signatory image and normalizes it into a form
//! any renderer can embed. Resolution order: configured HTTP source,
//! then `signature.png` in the asset directory, then `signature.jpg`,
//! and finally a deterministic inline-SVG scrawl. The resolver never
//! fails; a missing or corrupt image only downgrades the representation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;

use crate::error::LekhaError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Stylized fallback signature, rendered when no raster is available.
const FALLBACK_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="80" viewBox="0 0 200 80"><path d="M 12 52 C 30 18, 44 14, 52 38 S 70 64, 84 44 S 104 20, 118 40 S 142 60, 162 36" fill="none" stroke="#1a1a6e" stroke-width="3" stroke-linecap="round"/><path d="M 20 60 C 60 66, 120 66, 180 58" fill="none" stroke="#1a1a6e" stroke-width="1.5" stroke-linecap="round"/></svg>"##;

/// Which resolution path produced the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Png,
    Jpeg,
    Vector,
}

/// An embeddable signature. The data URI suits the HTML renderer
/// directly; the decoded raster (absent for the vector fallback) suits
/// the PDF and canvas backends.
#[derive(Debug, Clone)]
pub struct ResolvedSignature {
    pub kind: SignatureKind,
    pub data_uri: String,
    pub raster: Option<DynamicImage>,
}

impl ResolvedSignature {
    fn from_raster(bytes: &[u8], kind: SignatureKind) -> Result<Self, LekhaError> {
        let raster = image::load_from_memory(bytes)
            .map_err(|e| LekhaError::Signature(format!("failed to decode image: {}", e)))?;
        let mime = match kind {
            SignatureKind::Png => "image/png",
            SignatureKind::Jpeg => "image/jpeg",
            SignatureKind::Vector => "image/svg+xml",
        };
        Ok(Self {
            kind,
            data_uri: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
            raster: Some(raster),
        })
    }

    /// The deterministic vector scrawl. Always available.
    pub fn vector_fallback() -> Self {
        Self {
            kind: SignatureKind::Vector,
            data_uri: format!(
                "data:image/svg+xml;base64,{}",
                BASE64.encode(FALLBACK_SVG.as_bytes())
            ),
            raster: None,
        }
    }
}

/// Classify raster bytes by magic number.
fn sniff_kind(bytes: &[u8]) -> Option<SignatureKind> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(SignatureKind::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(SignatureKind::Jpeg)
    } else {
        None
    }
}

/// Resolves the signature image on every call. Stateless apart from
/// configuration; callers cache the result within one render pass.
#[derive(Debug, Clone)]
pub struct SignatureResolver {
    dir: PathBuf,
    url: Option<String>,
}

impl SignatureResolver {
    pub fn new(dir: PathBuf, url: Option<String>) -> Self {
        Self { dir, url }
    }

    /// Resolve to an embeddable representation. Never fails: every error
    /// path ends in the vector fallback, logged rather than surfaced.
    pub async fn resolve(&self) -> ResolvedSignature {
        if let Some(url) = &self.url {
            match self.fetch(url).await {
                Ok(sig) => return sig,
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "signature fetch failed");
                }
            }
        }

        for (file, kind) in [
            ("signature.png", SignatureKind::Png),
            ("signature.jpg", SignatureKind::Jpeg),
            ("signature.jpeg", SignatureKind::Jpeg),
        ] {
            let path = self.dir.join(file);
            match load_file(&path, kind) {
                Ok(Some(sig)) => return sig,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "unusable signature file");
                }
            }
        }

        tracing::info!("no signature image available, using vector fallback");
        ResolvedSignature::vector_fallback()
    }

    async fn fetch(&self, url: &str) -> Result<ResolvedSignature, LekhaError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| LekhaError::Transport(format!("http client: {}", e)))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| LekhaError::Transport(format!("fetch {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(LekhaError::Transport(format!(
                "fetch {}: status {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LekhaError::Transport(format!("read body: {}", e)))?;
        let kind = sniff_kind(&bytes)
            .ok_or_else(|| LekhaError::Signature("unsupported image format".to_string()))?;
        ResolvedSignature::from_raster(&bytes, kind)
    }
}

/// `Ok(None)` when the file simply is not there; `Err` when it exists
/// but cannot be used.
fn load_file(path: &Path, kind: SignatureKind) -> Result<Option<ResolvedSignature>, LekhaError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    ResolvedSignature::from_raster(&bytes, kind).map(Some)
}
