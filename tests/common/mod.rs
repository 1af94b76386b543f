use lopdf::{Document as LopdfDocument, ObjectId};
use quire::Document;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a rendered PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    /// Parse raw bytes with lopdf
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// The `/Size` entry of the trailer
    pub fn trailer_size(&self) -> Result<i64, Box<dyn std::error::Error>> {
        Ok(self.doc.trailer.get(b"Size")?.as_i64()?)
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Render `doc` and parse the result
pub fn render(doc: &mut Document) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let bytes = doc.render()?;
    GeneratedPdf::from_bytes(bytes)
}

/// The cross-reference table as written: its offset and raw entries
pub struct XrefTable {
    pub offset: usize,
    pub declared: usize,
    pub entries: Vec<Vec<u8>>,
}

/// Locate the table through `startxref` and split it into entries
pub fn read_xref(bytes: &[u8]) -> Option<XrefTable> {
    let marker = b"startxref\n";
    let at = bytes.windows(marker.len()).rposition(|w| w == marker)? + marker.len();
    let offset: usize = read_line(bytes, at)?.0.parse().ok()?;

    let body = bytes.get(offset..)?;
    if !body.starts_with(b"xref\n") {
        return None;
    }
    let (subsection, next) = read_line(bytes, offset + b"xref\n".len())?;
    let declared: usize = subsection.split(' ').nth(1)?.parse().ok()?;

    let entries = (0..declared)
        .map(|i| bytes.get(next + i * 20..next + (i + 1) * 20).map(<[u8]>::to_vec))
        .collect::<Option<Vec<_>>>()?;
    Some(XrefTable { offset, declared, entries })
}

fn read_line(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let len = bytes.get(start..)?.iter().position(|&b| b == b'\n')?;
    let line = String::from_utf8(bytes[start..start + len].to_vec()).ok()?;
    Some((line, start + len + 1))
}

/// Decode a PDF text string, honouring a UTF-16BE byte order mark
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(wide) => {
            let units: Vec<u16> = wide.chunks(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
