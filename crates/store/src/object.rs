use crate::error::StoreError;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use quire_encode::encode_to;
use quire_object::{Dictionary, ObjectRef, References, Value};
use std::fmt;
use std::io::Write;

/// An addressable PDF object: an identifier/generation pair, a payload, and
/// an optional byte stream.
///
/// Objects are owned by the [`ObjectStore`](crate::ObjectStore) and are
/// addressed everywhere else through [`ObjectRef`] handles.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    id: u32,
    generation: u16,
    payload: Value,
    stream: Option<Vec<u8>>,
    compressed: bool,
    live: bool,
    offset: Option<usize>,
}

impl IndirectObject {
    pub fn new(id: u32, payload: impl Into<Value>) -> Self {
        Self {
            id,
            generation: 0,
            payload: payload.into(),
            stream: None,
            compressed: false,
            live: false,
            offset: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u16) {
        self.generation = generation;
    }

    /// The handle other objects use to point at this one.
    pub fn reference(&self) -> ObjectRef {
        ObjectRef::with_generation(self.id, self.generation)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Value {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Value>) {
        self.payload = payload.into();
    }

    /// The payload as a dictionary, if it is one.
    pub fn dict(&self) -> Option<&Dictionary> {
        self.payload.as_dict()
    }

    pub fn dict_mut(&mut self) -> Option<&mut Dictionary> {
        self.payload.as_dict_mut()
    }

    pub fn stream(&self) -> Option<&[u8]> {
        self.stream.as_deref()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Byte offset of this object in the last rendered output.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = Some(offset);
    }

    /// Appends `bytes` to the stream, opening it on first use.
    ///
    /// A `Null` payload becomes an empty dictionary; any other
    /// non-dictionary payload cannot carry a stream.
    pub fn append_stream(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        if self.compressed {
            return Err(StoreError::StreamAlreadyCompressed(self.id));
        }
        self.stream_dict()?;
        self.stream.get_or_insert_with(Vec::new).extend_from_slice(bytes);
        self.sync_length()
    }

    /// Deflates the stream in place and marks it `/FlateDecode`.
    ///
    /// Calling this on an already compressed stream does nothing.
    pub fn compress_stream(&mut self) -> Result<(), StoreError> {
        if self.compressed {
            return Ok(());
        }
        let Some(raw) = self.stream.as_ref() else {
            log::warn!("Object {} has no stream to compress", self.id);
            return Ok(());
        };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw)?;
        let deflated = encoder.finish()?;
        log::trace!("Object {} stream deflated from {} to {} bytes", self.id, raw.len(), deflated.len());

        self.stream = Some(deflated);
        self.compressed = true;
        self.stream_dict()?.set("Filter", Value::name("FlateDecode"));
        self.sync_length()
    }

    /// Takes over the payload and stream of `other`, keeping this object's
    /// identity so existing handles to it stay valid.
    pub fn replace(&mut self, other: &IndirectObject) {
        self.payload = other.payload.clone();
        self.stream = other.stream.clone();
        self.compressed = other.compressed;
    }

    /// Sets the live flag, returning `false` if it was already set.
    ///
    /// The flag doubles as the visited set while marking, so a cyclic graph
    /// is walked once.
    pub fn mark_live(&mut self) -> bool {
        !std::mem::replace(&mut self.live, true)
    }

    pub(crate) fn clear_live(&mut self) {
        self.live = false;
    }

    /// `"{id} {generation} obj\n" <payload> [stream] "\nendobj\n"`
    pub fn to_object_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::new();
        self.write_object(&mut out)?;
        Ok(out)
    }

    pub fn write_object(&self, out: &mut Vec<u8>) -> Result<(), StoreError> {
        out.extend_from_slice(format!("{} {} obj\n", self.id, self.generation).as_bytes());

        match &self.stream {
            None => encode_to(out, &self.payload, false)?,
            Some(stream) => {
                let dict = self.payload.as_dict().ok_or(StoreError::StreamOnNonDictionary(self.id))?;
                let length = stream.len() as i64;
                if dict.get("Length").and_then(Value::as_integer) == Some(length) {
                    encode_to(out, &self.payload, false)?;
                } else {
                    let mut synced = dict.clone();
                    synced.set("Length", length);
                    encode_to(out, &synced.into(), false)?;
                }
                out.extend_from_slice(b"\nstream\n");
                out.extend_from_slice(stream);
                out.extend_from_slice(b"\nendstream");
            }
        }

        out.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    fn stream_dict(&mut self) -> Result<&mut Dictionary, StoreError> {
        if self.payload.is_null() {
            self.payload = Dictionary::new().into();
        }
        let id = self.id;
        self.payload.as_dict_mut().ok_or(StoreError::StreamOnNonDictionary(id))
    }

    fn sync_length(&mut self) -> Result<(), StoreError> {
        let length = self.stream.as_ref().map_or(0, Vec::len);
        self.stream_dict()?.set("Length", length);
        Ok(())
    }
}

impl References for IndirectObject {
    fn collect_references(&self, out: &mut Vec<ObjectRef>) {
        self.payload.collect_references(out);
    }
}

impl fmt::Display for IndirectObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use quire_encode::encode;
    use quire_object::dictionary;
    use std::io::Read;

    fn object_str(object: &IndirectObject) -> String {
        String::from_utf8(object.to_object_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_reference_token() {
        let object = IndirectObject::new(1, true);
        assert_eq!(object.to_string(), "1 0 R");
    }

    #[test]
    fn test_generation_can_change() {
        let mut object = IndirectObject::new(1, true);
        object.set_generation(1);
        assert_eq!(object.to_string(), "1 1 R");
        assert_eq!(object.reference(), ObjectRef::with_generation(1, 1));
    }

    #[test]
    fn test_object_bytes() {
        let payload = Value::Array(vec![Value::Integer(1), Value::from("foo")]);
        let object = IndirectObject::new(2, payload.clone());
        let body = String::from_utf8(encode(&payload, false).unwrap()).unwrap();
        assert_eq!(object_str(&object), format!("2 0 obj\n{}\nendobj\n", body));
    }

    #[test]
    fn test_append_opens_a_stream() {
        let mut object = IndirectObject::new(1, dictionary! { "Length" => 41 });
        object.append_stream(b"BT\n/F1 12 Tf\n72 712 Td\n( A stream ) Tj\nET").unwrap();

        let expected = "1 0 obj\n<< /Length 41\n>>\nstream\
                        \nBT\n/F1 12 Tf\n72 712 Td\n( A stream ) Tj\nET\
                        \nendstream\nendobj\n";
        assert_eq!(object_str(&object), expected);
    }

    #[test]
    fn test_append_concatenates_and_tracks_length() {
        let mut object = IndirectObject::new(3, Value::Null);
        object.append_stream(b"0 0 m\n").unwrap();
        object.append_stream(b"10 10 l\n").unwrap();

        assert_eq!(object.stream(), Some(&b"0 0 m\n10 10 l\n"[..]));
        assert_eq!(object.dict().unwrap().get("Length"), Some(&Value::Integer(14)));
    }

    #[test]
    fn test_stream_requires_dictionary_payload() {
        let mut object = IndirectObject::new(3, Value::Array(vec![]));
        assert!(matches!(object.append_stream(b"x"), Err(StoreError::StreamOnNonDictionary(3))));
    }

    #[test]
    fn test_length_is_synced_on_output() {
        let mut object = IndirectObject::new(1, Dictionary::new());
        object.append_stream(b"abc").unwrap();
        object.dict_mut().unwrap().set("Length", 99);
        assert_eq!(object_str(&object), "1 0 obj\n<< /Length 3\n>>\nstream\nabc\nendstream\nendobj\n");
    }

    #[test]
    fn test_compress_stream() {
        let source = "Hi There ".repeat(20);
        let mut plain = IndirectObject::new(2, Dictionary::new());
        plain.append_stream(source.as_bytes()).unwrap();

        let mut compressed = IndirectObject::new(2, Dictionary::new());
        compressed.append_stream(source.as_bytes()).unwrap();
        compressed.compress_stream().unwrap();

        assert!(compressed.stream().unwrap().len() < plain.stream().unwrap().len());
        assert_eq!(compressed.dict().unwrap().get("Filter"), Some(&Value::name("FlateDecode")));
        assert_eq!(
            compressed.dict().unwrap().get("Length"),
            Some(&Value::from(compressed.stream().unwrap().len()))
        );

        let mut inflated = String::new();
        ZlibDecoder::new(compressed.stream().unwrap()).read_to_string(&mut inflated).unwrap();
        assert_eq!(inflated, source);
    }

    #[test]
    fn test_compress_is_idempotent() {
        let mut object = IndirectObject::new(2, Dictionary::new());
        object.append_stream("Hi There ".repeat(20).as_bytes()).unwrap();
        object.compress_stream().unwrap();
        let once = object.stream().unwrap().to_vec();
        object.compress_stream().unwrap();

        assert_eq!(object.stream().unwrap(), &once[..]);
        assert!(object.is_compressed());
        assert!(matches!(object.append_stream(b"more"), Err(StoreError::StreamAlreadyCompressed(2))));
    }

    #[test]
    fn test_compress_without_stream_is_noop() {
        let mut object = IndirectObject::new(2, Dictionary::new());
        object.compress_stream().unwrap();
        assert!(!object.is_compressed());
        assert!(object.dict().unwrap().is_empty());
    }

    #[test]
    fn test_replace_copies_data_and_stream() {
        let mut from = IndirectObject::new(3, dictionary! { "foo" => "bar" });
        from.append_stream(b"has a stream too").unwrap();

        let mut to = IndirectObject::new(4, dictionary! { "foo" => "baz" });
        to.replace(&from);

        assert_eq!(to.id(), 4);
        assert_eq!(to.payload(), from.payload());
        assert_eq!(to.stream(), from.stream());
    }

    #[test]
    fn test_replace_copies_compressed_stream() {
        let mut from = IndirectObject::new(5, dictionary! { "foo" => "bar" });
        from.append_stream("has a stream too ".repeat(20).as_bytes()).unwrap();
        from.compress_stream().unwrap();

        let mut to = IndirectObject::new(6, dictionary! { "foo" => "baz" });
        to.replace(&from);

        assert_eq!(to.id(), 6);
        assert_eq!(to.payload(), from.payload());
        assert_eq!(to.stream(), from.stream());
        assert!(to.is_compressed());
    }

    #[test]
    fn test_mark_live_reports_first_visit() {
        let mut object = IndirectObject::new(1, Value::Null);
        assert!(object.mark_live());
        assert!(!object.mark_live());
        object.clear_live();
        assert!(!object.is_live());
    }
}
