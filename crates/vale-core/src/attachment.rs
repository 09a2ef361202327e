//! Proof file attached to a voucher.
//!
//! The frontend reads the file with `FileReader.readAsDataURL`, so the
//! payload usually arrives as `data:<mime>;base64,<content>`. Plain base64
//! is accepted as well. The stored form is the string exactly as received;
//! decoding only validates it and measures its size.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upload payload for `PUT /api/vales/{id}/arquivo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Base64 content, optionally wrapped in a data URL
    pub arquivo_base64: String,
    /// Original file name
    pub arquivo_nome: String,
}

/// A decoded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    /// MIME type taken from the data URL header, if any
    pub mime: Option<String>,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Validates the name and decodes the content.
    ///
    /// Returns [`Error::Validation`] for a blank name, a name that is only a
    /// directory path, or invalid base64.
    /// Size limits are enforced by the caller, which knows the configured
    /// maximum.
    pub fn decode(&self) -> Result<DecodedFile> {
        if self.arquivo_nome.trim().is_empty() {
            return Err(Error::validation_field("arquivoNome", "must not be blank"));
        }
        if self.file_name().trim().is_empty() {
            return Err(Error::validation_field("arquivoNome", "must name a file"));
        }

        let (mime, content) = split_data_url(self.arquivo_base64.trim())?;
        if content.is_empty() {
            return Err(Error::validation_field("arquivoBase64", "file is empty"));
        }

        let bytes = STANDARD
            .decode(content)
            .map_err(|e| Error::validation_field("arquivoBase64", format!("invalid base64: {e}")))?;

        Ok(DecodedFile { mime, bytes })
    }

    /// File name with any client-side directory components removed.
    pub fn file_name(&self) -> &str {
        let name = self.arquivo_nome.trim();
        name.rsplit(['/', '\\']).next().unwrap_or(name)
    }
}

impl DecodedFile {
    /// Size of the decoded file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the file has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn split_data_url(raw: &str) -> Result<(Option<String>, &str)> {
    let Some(rest) = raw.strip_prefix("data:") else {
        return Ok((None, raw));
    };

    let Some((header, content)) = rest.split_once(',') else {
        return Err(Error::validation_field(
            "arquivoBase64",
            "malformed data URL",
        ));
    };

    let mut parts = header.split(';');
    let mime = parts.next().filter(|m| !m.is_empty()).map(str::to_string);
    if !parts.any(|p| p == "base64") {
        return Err(Error::validation_field(
            "arquivoBase64",
            "data URL is not base64 encoded",
        ));
    }

    Ok((mime, content))
}
