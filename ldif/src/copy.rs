//! Re-encode LDIF: every parsed record is written straight back out.

use std::io::{BufRead, Write};

use tracing::info;

use crate::codec::Fetch;
use crate::config::{ParserConfig, WriterConfig};
use crate::data::Record;
use crate::error::Result;
use crate::parser::{LdifParser, RecordHandler};
use crate::writer::LdifWriter;

impl<W: Write> RecordHandler for LdifWriter<W> {
    fn handle(&mut self, dn: &str, record: Record) -> Result<()> {
        self.write(dn, &record)
    }
}

pub struct LdifCopy<R, W> {
    parser: LdifParser<R>,
    writer: LdifWriter<W>,
}

impl<R: BufRead, W: Write> LdifCopy<R, W> {
    pub fn new(
        input: R,
        output: W,
        parser_config: ParserConfig,
        writer_config: WriterConfig,
    ) -> Result<Self> {
        Ok(LdifCopy {
            parser: LdifParser::new(input, parser_config),
            writer: LdifWriter::new(output, writer_config)?,
        })
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.parser = self.parser.with_fetcher(fetcher);
        self
    }

    /// Copy all records.  Returns the number of records read.
    pub fn copy(&mut self) -> Result<usize> {
        let read = self.parser.parse_with(&mut self.writer)?;
        info!(read, written = self.writer.records_written(), "LDIF copied");
        Ok(read)
    }

    pub fn records_read(&self) -> usize {
        self.parser.records_read()
    }

    pub fn records_written(&self) -> usize {
        self.writer.records_written()
    }

    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }
}
