// src/document/loader.rs

// --- Imports ---
use std::borrow::Cow;

use encoding_rs::{DecoderResult, Encoding, EUC_KR, UTF_8};
use scraper::Html;

use crate::document::{markup, Document};
use crate::utils::config::ExtractorConfig;
use crate::utils::error::{ConfigError, DecodeFailure, DocumentParseError};

/// Decodes raw report bytes and parses them with the recovering tree builder.
///
/// Decoding is strict: a malformed byte sequence under the primary encoding is
/// what triggers the single retry with the fallback encoding. The decoded text
/// is normalized token by token (self-closing tags, markup inside titles)
/// before the tree is built. Markup problems never fail a load; the tree
/// builder repairs them and records them in [`Document::recovered_errors`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentLoader {
    primary: &'static Encoding,
    fallback: &'static Encoding,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        // Older filings are frequently EUC-KR even when served as XML.
        Self::new(UTF_8, EUC_KR)
    }
}

impl DocumentLoader {
    pub fn new(primary: &'static Encoding, fallback: &'static Encoding) -> Self {
        Self { primary, fallback }
    }

    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let (primary, fallback) = config.encodings()?;
        Ok(Self::new(primary, fallback))
    }

    pub fn primary(&self) -> &'static Encoding {
        self.primary
    }

    pub fn fallback(&self) -> &'static Encoding {
        self.fallback
    }

    /// Parses `bytes` into a traversable [`Document`].
    pub fn load(&self, bytes: &[u8]) -> Result<Document, DocumentParseError> {
        let (text, encoding, used_fallback) = match decode_strict(bytes, self.primary) {
            Ok(text) => (text, self.primary, false),
            Err(primary_failure) => {
                tracing::warn!(
                    "Decoding as {} failed ({}), retrying with {}",
                    self.primary.name(),
                    primary_failure,
                    self.fallback.name()
                );
                let text = decode_strict(bytes, self.fallback).map_err(|cause| {
                    tracing::error!("Decoding as {} also failed: {}", self.fallback.name(), cause);
                    DocumentParseError {
                        primary: self.primary.name(),
                        fallback: self.fallback.name(),
                        cause,
                    }
                })?;
                (text, self.fallback, true)
            }
        };

        let html = parse(&text);
        tracing::info!(
            "Loaded document ({} bytes, {}, {} markup issues recovered)",
            bytes.len(),
            encoding.name(),
            html.errors.len()
        );

        Ok(Document::new(html, encoding, used_fallback))
    }
}

/// Loads a document with the default UTF-8 → EUC-KR fallback.
pub fn load(bytes: &[u8]) -> Result<Document, DocumentParseError> {
    DocumentLoader::default().load(bytes)
}

// Falls back to the raw text when the token reader gives up (a tag cut off
// at end of input, for instance); the tree builder copes with those.
fn parse(text: &str) -> Html {
    match markup::normalize(text) {
        Ok(normalized) => Html::parse_document(&normalized),
        Err(err) => {
            tracing::warn!("Markup normalization failed ({}), parsing raw text", err);
            let mut html = Html::parse_document(text);
            html.errors.push(Cow::Owned(format!("markup normalization skipped: {}", err)));
            html
        }
    }
}

/// Decodes without replacement characters so that a wrong guess surfaces as an error.
fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeFailure> {
    // Strip a BOM only when it belongs to the encoding being attempted.
    let bytes = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut out = String::new();
    let mut consumed = 0;

    loop {
        let remaining = &bytes[consumed..];
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(remaining.len())
            .unwrap_or(remaining.len().saturating_mul(3));
        out.reserve(needed);

        let (result, read) = decoder.decode_to_string_without_replacement(remaining, &mut out, true);
        consumed += read;

        match result {
            DecoderResult::InputEmpty => return Ok(out),
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad_len, consumed_after) => {
                return Err(DecodeFailure {
                    encoding: encoding.name(),
                    offset: consumed.saturating_sub(bad_len as usize + consumed_after as usize),
                });
            }
        }
    }
}
