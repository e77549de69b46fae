#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no tileset definition named {0:?}")]
    TilesetNotFound(String),

    #[error("tileset {tileset:?} tags an unknown tile type {tag:?}")]
    UnknownTileTag { tileset: String, tag: String },

    #[error("tileset {0:?} has no usable enum tags")]
    EmptyTileTypeMap(String),

    #[error("level {level:?} has no tile layer")]
    MissingTileLayer { level: String },

    #[error("level {level:?} has unusable grid dimensions {width}x{height}")]
    BadDimensions { level: String, width: i64, height: i64 },

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("invalid pack data: {0}")]
    InvalidPack(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit status for the CLI. Configuration problems (the
    /// tile-type mapping could not be built) and structural problems (a
    /// level missing its tile layer) get distinguished codes so build
    /// scripts can tell them apart from plain I/O failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::TilesetNotFound(_)
            | Error::UnknownTileTag { .. }
            | Error::EmptyTileTypeMap(_) => 2,
            Error::MissingTileLayer { .. } | Error::BadDimensions { .. } => 3,
            _ => 1,
        }
    }
}
