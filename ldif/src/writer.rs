//! LDIF output.
//!
//! Every logical line goes through [`encode_attr_value`] and is then folded
//! to the configured width.

use std::io::Write;

use tracing::{debug, trace};

use crate::codec::encode_attr_value;
use crate::config::{CaseInsensitiveSet, WriterConfig};
use crate::data::{Attribute, Record};
use crate::error::Result;
use crate::fold::fold_line;

pub struct LdifWriter<W> {
    output: W,
    config: WriterConfig,
    records_written: usize,
}

impl<W: Write> LdifWriter<W> {
    pub fn new(output: W, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(LdifWriter {
            output,
            config,
            records_written: 0,
        })
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn get_ref(&self) -> &W {
        &self.output
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn line(&mut self, text: &str) -> Result<()> {
        fold_line(&mut self.output, text, self.config.cols, &self.config.line_sep)
    }

    fn pair(&mut self, attr: &str, value: &[u8]) -> Result<()> {
        let text = encode_attr_value(attr, value, &self.config.base64_attrs);
        self.line(&text)
    }

    fn values(&mut self, attr: &Attribute) -> Result<()> {
        for value in &attr.values {
            self.pair(&attr.ad, value)?;
        }
        Ok(())
    }

    /// Write one record followed by a blank line.  Empty records are
    /// skipped and not counted.
    pub fn write(&mut self, dn: &str, record: &Record) -> Result<()> {
        if record.is_empty() {
            trace!(dn = %dn, "empty record not written");
            return Ok(());
        }

        self.pair("dn", dn.as_bytes())?;
        if let Some(changetype) = record.changetype() {
            self.line(&format!("changetype: {}", changetype))?;
        }

        match record {
            Record::Entry(entry) => {
                for attr in entry.sorted_attributes() {
                    self.values(attr)?;
                }
            }
            Record::Add(attrs) => {
                for attr in attrs {
                    self.values(attr)?;
                }
            }
            Record::Modify(mods) => {
                for m in mods {
                    self.pair(m.op.as_str(), m.attr.as_bytes())?;
                    for value in &m.values {
                        self.pair(&m.attr, value)?;
                    }
                    self.line("-")?;
                }
            }
            Record::Delete => {}
            Record::ModRdn(rename) => {
                self.pair("newrdn", rename.new_rdn.as_bytes())?;
                self.line(if rename.delete_old_rdn {
                    "deleteoldrdn: 1"
                } else {
                    "deleteoldrdn: 0"
                })?;
                if let Some(superior) = &rename.new_superior {
                    self.pair("newsuperior", superior.as_bytes())?;
                }
            }
        }

        self.output.write_all(self.config.line_sep.as_bytes())?;
        self.records_written += 1;
        debug!(dn = %dn, count = self.records_written, "record written");
        Ok(())
    }
}

/// Render a single record as LDIF text with `\n` line separators.
pub fn create_ldif(
    dn: &str,
    record: &Record,
    base64_attrs: &CaseInsensitiveSet,
    cols: usize,
) -> Result<String> {
    let config = WriterConfig {
        base64_attrs: base64_attrs.clone(),
        cols,
        line_sep: "\n".to_string(),
    };
    let mut writer = LdifWriter::new(Vec::new(), config)?;
    writer.write(dn, record)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
