use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while decoding map documents or querying tilesets.
#[derive(Debug)]
pub enum MapError {
    /// The atlas has no image; offsets and blits cannot be computed.
    MissingResource {
        /// Name of the atlas whose image failed to load.
        atlas: String,
    },
    /// No tileset contains the gid and no placeholder tileset can stand in.
    NoMatchingAtlas {
        /// The queried gid, flip bits already stripped.
        gid: u32,
    },
    /// A local tile index past the number of tiles the atlas image holds.
    TileOutOfRange {
        /// Name of the atlas.
        atlas: String,
        /// Requested local index.
        index: u32,
        /// Number of tiles in the atlas.
        count: u32,
    },
    /// File I/O error
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// JSON parse error
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// Structurally valid JSON that does not describe a usable map.
    InvalidMap(String),
    /// A custom property with a type this crate does not decode.
    UnsupportedPropertyType {
        /// Property name.
        name: String,
        /// Declared Tiled type.
        kind: String,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingResource { atlas } => {
                write!(f, "Tileset '{}' has no image loaded", atlas)
            }
            MapError::NoMatchingAtlas { gid } => {
                write!(f, "No matching tileset found for gid {}", gid)
            }
            MapError::TileOutOfRange {
                atlas,
                index,
                count,
            } => write!(
                f,
                "Tile index {} out of range for tileset '{}' ({} tiles)",
                index, atlas, count
            ),
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Json { path, source } => {
                write!(f, "Failed to parse JSON in {}: {}", path.display(), source)
            }
            MapError::InvalidMap(msg) => write!(f, "Invalid map: {}", msg),
            MapError::UnsupportedPropertyType { name, kind } => {
                write!(f, "Unsupported type '{}' for property '{}'", kind, name)
            }
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
