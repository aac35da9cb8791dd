//! LDIF parser.
//!
//! Reads RFC 2849 records from any `BufRead` source and hands each completed
//! record to a [`RecordHandler`].

use std::io::BufRead;

use tracing::debug;

use crate::codec::{decode_line, FileFetcher, Fetch, LdifLine, SkipReason};
use crate::config::ParserConfig;
use crate::data::{ChangeType, Entry, LdapMod, ModOp, Record, RenameRecord};
use crate::dn::is_dn;
use crate::error::{LdifError, Result};
use crate::reader::LineReader;

/// Receives every record the parser completes.
pub trait RecordHandler {
    fn handle(&mut self, dn: &str, record: Record) -> Result<()>;
}

impl<F> RecordHandler for F
where
    F: FnMut(&str, Record) -> Result<()>,
{
    fn handle(&mut self, dn: &str, record: Record) -> Result<()> {
        self(dn, record)
    }
}

/// Handler that only lets the parser count records.
struct Discard;

impl RecordHandler for Discard {
    fn handle(&mut self, _dn: &str, _record: Record) -> Result<()> {
        Ok(())
    }
}

/// A line dropped without failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

// ---------------------------------------------------------------------------
// Record assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RenameState {
    new_rdn: Option<String>,
    delete_old_rdn: Option<bool>,
    new_superior: Option<String>,
}

/// What the lines after `dn:` are being collected into.
#[derive(Debug)]
enum Body {
    /// No `changetype:` seen (yet).
    Content(Entry),
    Add(Entry),
    Modify {
        mods: Vec<LdapMod>,
        open: Option<LdapMod>,
    },
    Delete,
    ModRdn(RenameState),
}

#[derive(Debug)]
struct RecordBuilder {
    dn: Option<String>,
    body: Body,
}

impl RecordBuilder {
    fn new() -> Self {
        RecordBuilder {
            dn: None,
            body: Body::Content(Entry::new()),
        }
    }

    fn is_untouched(&self) -> bool {
        self.dn.is_none() && matches!(&self.body, Body::Content(e) if e.is_empty())
    }

    /// Turn the collected lines into a record.  `Ok(None)` for records that
    /// are empty and therefore not reported.
    fn finish(self, line: usize) -> Result<Option<(String, Record)>> {
        let record = match self.body {
            Body::Content(entry) => Record::Entry(entry),
            Body::Add(entry) => Record::Add(entry.attributes),
            Body::Modify { open: Some(_), .. } => {
                return Err(LdifError::UnterminatedModification { line });
            }
            Body::Modify { mods, open: None } => Record::Modify(mods),
            Body::Delete => Record::Delete,
            Body::ModRdn(state) => {
                let new_rdn = state.new_rdn.ok_or_else(|| LdifError::InvalidModRdn {
                    line,
                    message: "expected 'newrdn'".to_string(),
                })?;
                let delete_old_rdn = state.delete_old_rdn.ok_or_else(|| LdifError::InvalidModRdn {
                    line,
                    message: "expected 'deleteoldrdn'".to_string(),
                })?;
                Record::ModRdn(RenameRecord {
                    new_rdn,
                    delete_old_rdn,
                    new_superior: state.new_superior,
                })
            }
        };
        if record.is_empty() {
            return Ok(None);
        }
        Ok(self.dn.map(|dn| (dn, record)))
    }
}

fn value_string(value: &[u8]) -> String {
    String::from_utf8_lossy(value).trim().to_string()
}

// ---------------------------------------------------------------------------
// LdifParser
// ---------------------------------------------------------------------------

pub struct LdifParser<R> {
    reader: LineReader<R>,
    config: ParserConfig,
    fetcher: Box<dyn Fetch>,
    records_read: usize,
    version: Option<String>,
    skipped: Vec<SkippedLine>,
}

impl<R: BufRead> LdifParser<R> {
    pub fn new(input: R, config: ParserConfig) -> Self {
        LdifParser {
            reader: LineReader::new(input),
            config,
            fetcher: Box::new(FileFetcher),
            records_read: 0,
            version: None,
            skipped: Vec::new(),
        }
    }

    /// Use `fetcher` to dereference `attr:< url` values whose scheme is in
    /// the configured scheme set.
    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Number of records handed to a handler so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Value of the last `version:` line seen in front of a `dn:` line.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Lines dropped leniently, in input order.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Parse all records, only counting them.
    pub fn parse(&mut self) -> Result<usize> {
        self.parse_with(&mut Discard)
    }

    /// Parse records until EOF or until `max_entries` records were read,
    /// passing each to `handler`.  Returns the running record count.
    pub fn parse_with<H: RecordHandler + ?Sized>(&mut self, handler: &mut H) -> Result<usize> {
        while !self.limit_reached() {
            match self.read_record()? {
                Some((dn, record)) => {
                    debug!(dn = %dn, changetype = ?record.changetype(), "record parsed");
                    handler.handle(&dn, record)?;
                    self.records_read += 1;
                }
                None => break,
            }
        }
        Ok(self.records_read)
    }

    fn limit_reached(&self) -> bool {
        self.config.max_entries != 0 && self.records_read >= self.config.max_entries
    }

    fn skip(&mut self, line: usize, reason: SkipReason) {
        debug!(line, ?reason, "line skipped");
        self.skipped.push(SkippedLine { line, reason });
    }

    /// Read the next non-empty record.  `Ok(None)` at EOF.
    fn read_record(&mut self) -> Result<Option<(String, Record)>> {
        let mut rec = RecordBuilder::new();
        loop {
            let line = match self.reader.next_line()? {
                Some(line) => line,
                None => return rec.finish(self.reader.line_number()),
            };
            let parsed = decode_line(
                &line.text,
                line.number,
                &self.config.process_url_schemes,
                self.fetcher.as_mut(),
            )?;
            match parsed {
                LdifLine::Blank => {
                    if rec.is_untouched() {
                        continue;
                    }
                    let done = std::mem::replace(&mut rec, RecordBuilder::new());
                    if let Some(record) = done.finish(line.number)? {
                        return Ok(Some(record));
                    }
                }
                LdifLine::Skipped(reason) => self.skip(line.number, reason),
                LdifLine::Separator => {
                    if !self.close_modification(&mut rec) {
                        self.skip(line.number, SkipReason::Malformed);
                    }
                }
                LdifLine::Pair { attr, value } => self.accept(&mut rec, line.number, attr, value)?,
            }
        }
    }

    /// Close the open modify item on a `-` line.  Items on ignored types
    /// are dropped here.  False if there is no open item.
    fn close_modification(&self, rec: &mut RecordBuilder) -> bool {
        match &mut rec.body {
            Body::Modify { mods, open } => match open.take() {
                Some(m) => {
                    if !self.config.ignored_attr_types.contains(&m.attr) {
                        mods.push(m);
                    }
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn accept(
        &mut self,
        rec: &mut RecordBuilder,
        line: usize,
        attr: String,
        value: Vec<u8>,
    ) -> Result<()> {
        if attr.eq_ignore_ascii_case("dn") {
            if rec.dn.is_some() {
                return Err(LdifError::DuplicateDn { line });
            }
            let dn = String::from_utf8(value).map_err(|e| LdifError::InvalidDn {
                line,
                dn: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })?;
            if !is_dn(&dn) {
                return Err(LdifError::InvalidDn { line, dn });
            }
            rec.dn = Some(dn);
            return Ok(());
        }

        if rec.dn.is_none() && attr.eq_ignore_ascii_case("version") {
            self.version = Some(value_string(&value));
            return Ok(());
        }

        if attr.eq_ignore_ascii_case("changetype") {
            return Self::start_change(rec, line, &value);
        }

        match &mut rec.body {
            Body::Content(entry) | Body::Add(entry) => {
                if self.config.ignored_attr_types.contains(&attr) {
                    return Ok(());
                }
                if rec.dn.is_none() {
                    return Err(LdifError::MissingDn { line });
                }
                entry.append_value(&attr, &value);
            }
            Body::Modify { open, .. } => match open {
                None => {
                    let op = ModOp::from_name(&attr)
                        .ok_or_else(|| LdifError::InvalidModOp { line, op: attr.clone() })?;
                    *open = Some(LdapMod {
                        op,
                        attr: value_string(&value),
                        values: Vec::new(),
                    });
                }
                Some(m) => {
                    if !attr.eq_ignore_ascii_case(&m.attr) {
                        return Err(LdifError::ModAttributeMismatch {
                            line,
                            expected: m.attr.clone(),
                            found: attr,
                        });
                    }
                    m.values.push(value);
                }
            },
            Body::Delete => return Err(LdifError::UnexpectedAttribute { line, attr }),
            Body::ModRdn(state) => Self::accept_rename(state, line, &attr, &value)?,
        }

        Ok(())
    }

    fn start_change(rec: &mut RecordBuilder, line: usize, value: &[u8]) -> Result<()> {
        if rec.dn.is_none() {
            return Err(LdifError::ChangetypeBeforeDn { line });
        }
        let entry = match &mut rec.body {
            Body::Content(entry) => std::mem::take(entry),
            _ => return Err(LdifError::DuplicateChangetype { line }),
        };
        let name = value_string(value);
        let changetype: ChangeType = name
            .parse()
            .map_err(|()| LdifError::InvalidChangetype { line, value: name.clone() })?;

        // Only an add record can absorb attributes that preceded the
        // changetype line.
        if changetype != ChangeType::Add {
            if let Some(attr) = entry.attributes.first() {
                return Err(LdifError::UnexpectedAttribute {
                    line,
                    attr: attr.ad.clone(),
                });
            }
        }

        rec.body = match changetype {
            ChangeType::Add => Body::Add(entry),
            ChangeType::Modify => Body::Modify {
                mods: Vec::new(),
                open: None,
            },
            ChangeType::Delete => Body::Delete,
            ChangeType::ModRdn => Body::ModRdn(RenameState::default()),
        };
        Ok(())
    }

    /// `newrdn`, `deleteoldrdn` and an optional `newsuperior`, in this order.
    fn accept_rename(state: &mut RenameState, line: usize, attr: &str, value: &[u8]) -> Result<()> {
        let invalid = |message: &str| LdifError::InvalidModRdn {
            line,
            message: message.to_string(),
        };
        let value = value_string(value);

        if state.new_rdn.is_none() {
            if !attr.eq_ignore_ascii_case("newrdn") {
                return Err(invalid("expected 'newrdn'"));
            }
            state.new_rdn = Some(value);
        } else if state.delete_old_rdn.is_none() {
            if !attr.eq_ignore_ascii_case("deleteoldrdn") {
                return Err(invalid("expected 'deleteoldrdn'"));
            }
            state.delete_old_rdn = Some(match value.as_str() {
                "0" => false,
                "1" => true,
                _ => return Err(invalid("expected '0' or '1' for 'deleteoldrdn'")),
            });
        } else if state.new_superior.is_none() && attr.eq_ignore_ascii_case("newsuperior") {
            if !is_dn(&value) {
                return Err(LdifError::InvalidDn { line, dn: value });
            }
            state.new_superior = Some(value);
        } else {
            return Err(invalid("garbage at end of modrdn record"));
        }
        Ok(())
    }
}
