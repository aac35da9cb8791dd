//! Gather parsed records in memory.

use std::io::BufRead;

use crate::config::ParserConfig;
use crate::data::Record;
use crate::error::Result;
use crate::parser::{LdifParser, RecordHandler};

/// Handler keeping every record in input order.
#[derive(Debug, Default)]
pub struct RecordList {
    pub records: Vec<(String, Record)>,
}

impl RecordList {
    pub fn new() -> Self {
        RecordList::default()
    }
}

impl RecordHandler for RecordList {
    fn handle(&mut self, dn: &str, record: Record) -> Result<()> {
        self.records.push((dn.to_string(), record));
        Ok(())
    }
}

/// Parse `input` completely and return its records.
pub fn parse_ldif<R, I, S>(
    input: R,
    ignored_attr_types: I,
    max_entries: usize,
) -> Result<Vec<(String, Record)>>
where
    R: BufRead,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = ParserConfig::new()
        .with_ignored_attr_types(ignored_attr_types)
        .with_max_entries(max_entries);
    let mut list = RecordList::new();
    LdifParser::new(input, config).parse_with(&mut list)?;
    Ok(list.records)
}
