/// Raw filesystem facts for one image in the photo folder.
///
/// This is the only input the assembler sees; anything richer (EXIF, pixel
/// dimensions) is not read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileFact {
    pub filename: String,
    pub size_bytes: u64,
    pub modified_unix: i64,
}

impl FileFact {
    pub fn new(
        filename: impl Into<String>,
        size_bytes: u64,
        modified_unix: i64,
    ) -> Self {
        Self {
            filename: filename.into(),
            size_bytes,
            modified_unix,
        }
    }
}
