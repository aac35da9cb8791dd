//! Reading and writing LDIF (RFC 2849).

pub mod codec;
pub mod collect;
pub mod config;
pub mod copy;
pub mod data;
pub mod dn;
pub mod error;
pub mod fold;
pub mod parser;
pub mod reader;
pub mod writer;

pub use codec::{Fetch, FileFetcher, SkipReason};
pub use collect::{parse_ldif, RecordList};
pub use config::{CaseInsensitiveSet, ParserConfig, WriterConfig, DEFAULT_COLS};
pub use copy::LdifCopy;
pub use data::{Attribute, ChangeItem, ChangeType, Entry, LdapMod, ModOp, Record, RenameRecord};
pub use dn::{is_dn, needs_base64};
pub use error::{LdifError, Result};
pub use parser::{LdifParser, RecordHandler, SkippedLine};
pub use writer::{create_ldif, LdifWriter};
