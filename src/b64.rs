//! Incremental base64 decoding for the `|...|` and `{...}` forms.
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Push-driven base64 decoder.
///
/// ASCII whitespace is stripped before decoding, so encoded input may be
/// wrapped and indented freely. Input arrives in arbitrary chunks; decoding
/// happens one 4-character group at a time, as soon as a group completes.
/// Groups that do not decode contribute nothing to the output.
#[derive(Debug, Default)]
pub(crate) struct WriteDecoder {
    quad: Vec<u8>,
}

impl WriteDecoder {
    pub fn new() -> Self {
        Self {
            quad: Vec::with_capacity(4),
        }
    }

    /// Feed encoded bytes, appending decoded octets to `out`.
    pub fn write(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &byte in input {
            self.push(byte, out);
        }
    }

    /// Feed a single encoded byte, appending decoded octets to `out`.
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        if matches!(byte, b' ' | b'\t' | b'\r' | b'\n') {
            return;
        }
        self.quad.push(byte);
        if self.quad.len() == 4 {
            self.decode_into(out);
        }
    }

    /// Decode any trailing partial group and reset.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if !self.quad.is_empty() {
            self.decode_into(out);
        }
    }

    fn decode_into(&mut self, out: &mut Vec<u8>) {
        if let Ok(decoded) = STANDARD.decode(&self.quad) {
            out.extend_from_slice(&decoded);
        }
        self.quad.clear();
    }
}
