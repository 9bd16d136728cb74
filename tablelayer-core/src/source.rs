//! Record sources yielding the field mappings a table is built from.
//!
//! A [`RecordSource`] produces an ordered list of [`Document`]s, one per record. Sources are
//! consumed once, during table construction. Provided sources:
//!
//! - `Vec<Document>` - records already in memory
//! - [`JsonFileSource`] - a JSON file holding an array of objects
//! - [`BsonFileSource`] - a file of concatenated BSON documents
//! - [`FileSource`] - either of the above, picked by file extension
//!
//! [`ResourceBundle`] locates the file for a table by name inside a resource directory.

use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use bson::Document;
use tracing::debug;

use crate::error::{TableError, TableResult};

/// Produces the ordered field mappings a table is built from.
pub trait RecordSource {
    /// Reads every record, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::SourceNotFound`] if the source does not exist and
    /// [`TableError::Source`] if it cannot be read or parsed.
    fn records(self) -> TableResult<Vec<Document>>;
}

impl RecordSource for Vec<Document> {
    fn records(self) -> TableResult<Vec<Document>> {
        Ok(self)
    }
}

/// A JSON file whose top level is an array of objects.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn records(self) -> TableResult<Vec<Document>> {
        let text = fs::read_to_string(&self.path)
            .map_err(|err| read_error(&self.path, err))?;

        let documents = serde_json::from_str::<Vec<Document>>(&text)
            .map_err(|err| TableError::Source(format!("{}: {err}", self.path.display())))?;

        debug!(path = %self.path.display(), records = documents.len(), "read json record source");

        Ok(documents)
    }
}

/// A file of concatenated BSON documents.
#[derive(Debug, Clone)]
pub struct BsonFileSource {
    path: PathBuf,
}

impl BsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for BsonFileSource {
    fn records(self) -> TableResult<Vec<Document>> {
        let bytes = fs::read(&self.path)
            .map_err(|err| read_error(&self.path, err))?;

        let mut cursor = Cursor::new(bytes.as_slice());
        let mut documents = Vec::new();

        while (cursor.position() as usize) < bytes.len() {
            let document = Document::from_reader(&mut cursor)
                .map_err(|err| TableError::Source(format!("{}: {err}", self.path.display())))?;
            documents.push(document);
        }

        debug!(path = %self.path.display(), records = documents.len(), "read bson record source");

        Ok(documents)
    }
}

/// A record file whose format is picked from its extension.
///
/// Files ending in `.bson` are read as [`BsonFileSource`], everything else as [`JsonFileSource`].
#[derive(Debug, Clone)]
pub enum FileSource {
    Json(JsonFileSource),
    Bson(BsonFileSource),
}

impl FileSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bson") => FileSource::Bson(BsonFileSource::new(path)),
            _ => FileSource::Json(JsonFileSource::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileSource::Json(source) => source.path(),
            FileSource::Bson(source) => source.path(),
        }
    }
}

impl RecordSource for FileSource {
    fn records(self) -> TableResult<Vec<Document>> {
        match self {
            FileSource::Json(source) => source.records(),
            FileSource::Bson(source) => source.records(),
        }
    }
}

/// A directory of record files, one per table.
///
/// The file for a table named `colors` is `colors.json`, or `colors.bson` when no JSON file
/// exists.
///
/// # Example
///
/// ```ignore
/// let bundle = ResourceBundle::new("resources");
/// let colors = Table::<Color>::from_bundle(&bundle, "id")?;
/// ```
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    root: PathBuf,
}

impl ResourceBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the record file for a resource name.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::SourceNotFound`] if neither `<name>.json` nor `<name>.bson` exists.
    pub fn locate(&self, name: &str) -> TableResult<FileSource> {
        ["json", "bson"]
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .map(FileSource::open)
            .ok_or_else(|| {
                TableError::SourceNotFound(format!("{name} in {}", self.root.display()))
            })
    }
}

fn read_error(path: &Path, err: io::Error) -> TableError {
    match err.kind() {
        io::ErrorKind::NotFound => TableError::SourceNotFound(path.display().to_string()),
        _ => TableError::Source(format!("{}: {err}", path.display())),
    }
}
