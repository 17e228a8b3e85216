use thiserror_no_std::Error;

/// Contract violations rejected by the button matrix.
///
/// A rejected call leaves the widget exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// The map slice has no entries at all, not even a terminator
    #[error("Map has no entries")]
    EmptyMap,

    /// A label is not valid UTF-8 once its control prefix is stripped
    #[error("Map entry {index} is not a valid label")]
    InvalidLabel {
        /// Position of the entry in the map slice
        index: usize,
    },

    /// The map declares more keys than an index can address
    #[error("Map declares too many buttons ({count})")]
    TooManyButtons {
        /// Number of keys found before giving up
        count: usize,
    },

    /// Control map length differs from the key count of the active map
    #[error("Control map has {actual} entries, expected {expected}")]
    CtrlMapLength {
        /// Key count of the active map
        expected: usize,
        /// Length of the slice handed in
        actual: usize,
    },

    /// Key index outside the active map
    #[error("Button index {index} out of range (count: {count})")]
    InvalidIndex {
        /// Index handed in
        index: u16,
        /// Key count of the active map
        count: u16,
    },

    /// Relative width outside `1..=7`
    #[error("Invalid relative width {width}")]
    InvalidWidth {
        /// Width handed in
        width: u8,
    },
}

/// Result type for button matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;
