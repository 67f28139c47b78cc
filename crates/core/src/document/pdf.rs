//! PDF document store backed by `lopdf`.
//!
//! Content edits are applied to the in-memory object table; nothing touches
//! the filesystem until [`PdfDocument::save`].

use std::fmt;
use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use rustc_hash::FxHashSet;

use super::store::SurfaceStore;
use super::surface::{ResourceEntry, ResourceKind, ResourceTable, SurfaceId};
use crate::codec::{Compression, EncodedContent, flate};
use crate::error::{PdfError, Result};
use crate::model::ObjRef;
use crate::parser::lexer::name_from_bytes;

/// Path reported for documents loaded from memory.
const MEMORY_PATH: &str = "<memory>";

/// Bytes at the end of the file searched for an `/Encrypt` trailer entry
/// when the document cannot be parsed.
const ENCRYPT_SCAN_WINDOW: usize = 4096;

/// Longest chain of indirect references followed before giving up.
const MAX_REFERENCE_CHAIN: usize = 32;

/// A loaded PDF document.
pub struct PdfDocument {
    doc: Document,
    encrypted: bool,
}

impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDocument")
            .field("objects", &self.doc.objects.len())
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Load a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| PdfError::Load {
            path: path.to_path_buf(),
            msg: e.to_string(),
        })?;
        Self::parse(&bytes, path)
    }

    /// Load a document from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(bytes, Path::new(MEMORY_PATH))
    }

    /// Wrap an already-built `lopdf` document.
    pub fn from_document(doc: Document) -> Self {
        let encrypted = doc.trailer.has(b"Encrypt");
        Self { doc, encrypted }
    }

    fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        match Document::load_mem(bytes) {
            Ok(doc) => {
                let encrypted = doc.trailer.has(b"Encrypt");
                tracing::debug!(
                    path = %path.display(),
                    objects = doc.objects.len(),
                    encrypted,
                    "loaded document"
                );
                Ok(Self { doc, encrypted })
            }
            // Parsing may fail on the encryption dictionary itself.
            Err(_) if trailer_mentions_encrypt(bytes) => Err(PdfError::Encrypted),
            Err(e) => Err(PdfError::Load {
                path: path.to_path_buf(),
                msg: e.to_string(),
            }),
        }
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Pages in document order.
    pub fn pages(&self) -> Vec<SurfaceId> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| SurfaceId::page(number, id.into()))
            .collect()
    }

    /// Serialize and write the document to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let save_error = |msg: String| PdfError::Save {
            path: path.to_path_buf(),
            msg,
        };
        let bytes = self.write_bytes().map_err(save_error)?;
        fs::write(path, bytes).map_err(|e| save_error(e.to_string()))?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Serialize the document to bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.write_bytes().map_err(|msg| PdfError::Save {
            path: MEMORY_PATH.into(),
            msg,
        })
    }

    /// Drop objects no longer referenced (replaced content streams) and
    /// serialize.
    fn write_bytes(&mut self) -> std::result::Result<Vec<u8>, String> {
        let pruned = self.doc.prune_objects();
        if !pruned.is_empty() {
            tracing::debug!(pruned = pruned.len(), "pruned unreferenced objects");
        }
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).map_err(|e| e.to_string())?;
        Ok(buf)
    }

    fn object(&self, id: ObjectId) -> Result<&Object> {
        self.doc
            .objects
            .get(&id)
            .ok_or(PdfError::ObjectNotFound(id.into()))
    }

    /// Follow indirect references to a direct object.
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> Result<&'a Object> {
        for _ in 0..MAX_REFERENCE_CHAIN {
            match obj {
                Object::Reference(id) => obj = self.object(*id)?,
                _ => return Ok(obj),
            }
        }
        Err(PdfError::Decode("reference chain too long".into()))
    }

    /// Resolve to a dictionary; `null` counts as absent.
    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Result<Option<&'a Dictionary>> {
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Ok(Some(dict)),
            Object::Null => Ok(None),
            other => Err(type_error("dictionary", other)),
        }
    }

    fn dict(&self, id: ObjectId) -> Result<&Dictionary> {
        match self.object(id)? {
            Object::Dictionary(dict) => Ok(dict),
            Object::Stream(stream) => Ok(&stream.dict),
            other => Err(type_error("dictionary", other)),
        }
    }

    fn stream(&self, id: ObjectId) -> Result<&Stream> {
        match self.object(id)? {
            Object::Stream(stream) => Ok(stream),
            other => Err(type_error("stream", other)),
        }
    }

    fn stream_mut(&mut self, id: ObjectId) -> Result<&mut Stream> {
        match self.doc.objects.get_mut(&id) {
            Some(Object::Stream(stream)) => Ok(stream),
            Some(other) => Err(type_error("stream", other)),
            None => Err(PdfError::ObjectNotFound(id.into())),
        }
    }

    fn page_dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        match self.doc.objects.get_mut(&id) {
            Some(Object::Dictionary(dict)) => Ok(dict),
            Some(other) => Err(type_error("dictionary", other)),
            None => Err(PdfError::ObjectNotFound(id.into())),
        }
    }

    /// Look up a page attribute, walking up the `/Parent` chain.
    fn inherited(&self, page: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut seen = FxHashSet::default();
        let mut current = page;
        while seen.insert(current) {
            let dict = self.dict(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => return Ok(None),
            }
        }
        tracing::warn!(page = %ObjRef::from(page), "cycle in page tree /Parent chain");
        Ok(None)
    }

    /// Content stream objects of a page, in drawing order.
    fn page_content_ids(&self, page: ObjectId) -> Result<Vec<ObjectId>> {
        let Ok(contents) = self.dict(page)?.get(b"Contents") else {
            return Ok(Vec::new());
        };
        match contents {
            Object::Reference(id) => match self.object(*id)? {
                Object::Stream(_) => Ok(vec![*id]),
                Object::Array(items) => references(items),
                other => Err(type_error("stream or array", other)),
            },
            Object::Array(items) => references(items),
            Object::Null => Ok(Vec::new()),
            other => Err(type_error("stream or array", other)),
        }
    }

    fn is_form(&self, id: ObjectId) -> bool {
        match self.doc.objects.get(&id) {
            Some(Object::Stream(stream)) => {
                matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(subtype)) if subtype == b"Form")
            }
            Some(_) => false,
            None => {
                tracing::debug!(obj = %ObjRef::from(id), "XObject reference to missing object");
                false
            }
        }
    }
}

impl SurfaceStore for PdfDocument {
    fn content(&self, surface: &SurfaceId) -> Result<Vec<u8>> {
        match *surface {
            SurfaceId::Page { obj, .. } => {
                let mut content = Vec::new();
                for (i, id) in self.page_content_ids(obj.into())?.into_iter().enumerate() {
                    if i > 0 {
                        content.push(b'\n');
                    }
                    content.extend_from_slice(&decode_stream(self.stream(id)?)?);
                }
                Ok(content)
            }
            SurfaceId::Form { obj } => decode_stream(self.stream(obj.into())?),
        }
    }

    fn set_content(&mut self, surface: &SurfaceId, content: EncodedContent) -> Result<()> {
        match *surface {
            SurfaceId::Page { obj, .. } => {
                let page = ObjectId::from(obj);
                let ids = self.page_content_ids(page)?;
                if ids.is_empty() && content_is_empty(&content)? {
                    return Ok(());
                }
                if let [id] = ids[..] {
                    write_stream(self.stream_mut(id)?, content);
                } else {
                    let mut stream = Stream::new(Dictionary::new(), Vec::new());
                    write_stream(&mut stream, content);
                    let id = self.doc.add_object(Object::Stream(stream));
                    self.page_dict_mut(page)?
                        .set("Contents", Object::Reference(id));
                }
            }
            SurfaceId::Form { obj } => write_stream(self.stream_mut(obj.into())?, content),
        }
        Ok(())
    }

    fn resources(&self, surface: &SurfaceId) -> Result<ResourceTable> {
        let resources = match *surface {
            SurfaceId::Page { obj, .. } => self.inherited(obj.into(), b"Resources")?,
            SurfaceId::Form { obj } => self.stream(obj.into())?.dict.get(b"Resources").ok(),
        };
        let Some(resources) = resources else {
            return Ok(ResourceTable::new());
        };
        let Some(resources) = self.resolve_dict(resources)? else {
            return Ok(ResourceTable::new());
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(ResourceTable::new());
        };
        let Some(xobjects) = self.resolve_dict(xobjects)? else {
            return Ok(ResourceTable::new());
        };

        Ok(xobjects
            .iter()
            .map(|(name, value)| {
                let kind = match value {
                    Object::Reference(id) if self.is_form(*id) => ResourceKind::Form((*id).into()),
                    _ => ResourceKind::Opaque,
                };
                ResourceEntry::new(name_from_bytes(name), kind)
            })
            .collect())
    }
}

/// Decoded bytes of a stream.
fn decode_stream(stream: &Stream) -> Result<Vec<u8>> {
    let Ok(filter) = stream.dict.get(b"Filter") else {
        return Ok(stream.content.clone());
    };
    let flate_only = match filter {
        Object::Name(name) => name == b"FlateDecode",
        Object::Array(items) => {
            matches!(items.as_slice(), [Object::Name(name)] if name == b"FlateDecode")
        }
        _ => false,
    };
    if flate_only && !stream.dict.has(b"DecodeParms") {
        return flate::decompress(&stream.content);
    }
    stream
        .decompressed_content()
        .map_err(|e| PdfError::Decode(format!("content stream: {e}")))
}

/// Replace a stream's data, keeping `/Filter` and `/Length` consistent.
fn write_stream(stream: &mut Stream, content: EncodedContent) {
    stream.dict.remove(b"DecodeParms");
    match content.compression {
        Compression::Flate => stream
            .dict
            .set("Filter", Object::Name(b"FlateDecode".to_vec())),
        Compression::None => {
            stream.dict.remove(b"Filter");
        }
    }
    stream.set_content(content.data);
}

/// True when `content` decodes to no bytes at all.
fn content_is_empty(content: &EncodedContent) -> Result<bool> {
    match content.compression {
        Compression::None => Ok(content.data.is_empty()),
        Compression::Flate => Ok(flate::decompress(&content.data)?.is_empty()),
    }
}

fn references(items: &[Object]) -> Result<Vec<ObjectId>> {
    items
        .iter()
        .map(|item| match item {
            Object::Reference(id) => Ok(*id),
            other => Err(type_error("reference", other)),
        })
        .collect()
}

fn type_error(expected: &'static str, got: &Object) -> PdfError {
    PdfError::TypeError {
        expected,
        got: object_kind(got),
    }
}

const fn object_kind(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "bool",
        Object::Integer(_) => "int",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dict",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

fn trailer_mentions_encrypt(bytes: &[u8]) -> bool {
    let tail = &bytes[bytes.len().saturating_sub(ENCRYPT_SCAN_WINDOW)..];
    tail.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}
