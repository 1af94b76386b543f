use crate::config::DEFAULT_VERSION;
use crate::error::PdfError;
use quire_encode::write_dictionary;
use quire_object::{Dictionary, dictionary};
use quire_store::ObjectStore;
use std::io::{self, Write};

/// Writes an [`ObjectStore`] out as a complete PDF file.
///
/// The body lists objects in store order. Each object's byte offset is
/// recorded on the object and referenced from the cross-reference table.
/// Compression and compaction are the caller's business and must happen
/// before assembly.
pub struct Assembler<'a> {
    store: &'a mut ObjectStore,
    version: &'a str,
    trailer: Option<&'a Dictionary>,
}

impl<'a> Assembler<'a> {
    pub fn new(store: &'a mut ObjectStore) -> Self {
        Self {
            store,
            version: DEFAULT_VERSION,
            trailer: None,
        }
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = version;
        self
    }

    /// Extra trailer entries; they override `Size`, `Root` and `Info` when
    /// they share a key.
    pub fn trailer(mut self, extra: &'a Dictionary) -> Self {
        self.trailer = Some(extra);
        self
    }

    pub fn render(self) -> Result<Vec<u8>, PdfError> {
        self.write(Vec::new())
    }

    pub fn write<W: Write>(self, writer: W) -> Result<W, PdfError> {
        let mut out = OffsetWriter::new(writer);

        writeln!(out, "%PDF-{}", self.version)?;
        out.write_all(b"%\xFF\xFF\xFF\xFF\n")?;

        let mut buf = Vec::new();
        for object in self.store.iter_mut() {
            object.set_offset(out.offset);
            buf.clear();
            object.write_object(&mut buf)?;
            out.write_all(&buf)?;
        }
        let xref_offset = out.offset;
        let size = self.store.len() + 1;
        writeln!(out, "xref\n0 {}", size)?;
        out.write_all(b"0000000000 65535 f \n")?;
        for object in self.store.iter() {
            writeln!(out, "{:010} {:05} n ", object.offset().unwrap_or_default(), object.generation())?;
        }

        let mut trailer = dictionary! {
            "Size" => size,
            "Root" => self.store.root(),
            "Info" => self.store.info(),
        };
        if let Some(extra) = self.trailer {
            trailer.merge(extra);
        }
        buf.clear();
        buf.extend_from_slice(b"trailer\n");
        write_dictionary(&mut buf, &trailer, false)?;
        out.write_all(&buf)?;
        writeln!(out, "\nstartxref\n{}\n%%EOF", xref_offset)?;
        out.flush()?;

        log::debug!(
            "Assembled {} objects: body ends at {}, file is {} bytes",
            self.store.len(),
            xref_offset,
            out.offset
        );
        Ok(out.into_inner())
    }
}

/// Counts bytes on their way to the inner writer.
struct OffsetWriter<W> {
    inner: W,
    offset: usize,
}

impl<W: Write> OffsetWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for OffsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.offset += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
