use std::io;

#[derive(Debug, thiserror::Error)]
pub enum LdifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: no valid string-representation of distinguished name {dn:?}")]
    InvalidDn { line: usize, dn: String },

    #[error("line {line}: two lines starting with dn: in one record")]
    DuplicateDn { line: usize },

    #[error("line {line}: read changetype: before getting valid dn: line")]
    ChangetypeBeforeDn { line: usize },

    #[error("line {line}: two lines starting with changetype: in one record")]
    DuplicateChangetype { line: usize },

    #[error("line {line}: changetype value {value:?} is invalid")]
    InvalidChangetype { line: usize, value: String },

    #[error("line {line}: attribute line before any dn: line")]
    MissingDn { line: usize },

    #[error("line {line}: invalid base64 value: {source}")]
    Base64 {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("line {line}: invalid modify operation {op:?}")]
    InvalidModOp { line: usize, op: String },

    #[error("line {line}: expected value for {expected:?}, got {found:?}")]
    ModAttributeMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: modify item not terminated by '-'")]
    UnterminatedModification { line: usize },

    #[error("line {line}: unexpected attribute {attr:?} in change record")]
    UnexpectedAttribute { line: usize, attr: String },

    #[error("line {line}: {message}")]
    InvalidModRdn { line: usize, message: String },

    #[error("fold width must be at least 2, got {0}")]
    InvalidColumns(usize),

    #[error("change items of different shapes in one record")]
    MixedChangeItems,

    #[error("record handler failed: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, LdifError>;
