use std::fmt;
use std::str::FromStr;

use crate::error::{LdifError, Result};

/// Attribute values of a content record, in first-seen attribute order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub attributes: Vec<Attribute>,
}

/// An attribute: a descriptor (name) with a list of binary-safe values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub ad: String,
    pub values: Vec<Vec<u8>>,
}

/// Operation of one modify item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModOp {
    Add,
    Delete,
    Replace,
}

/// One item of a `changetype: modify` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapMod {
    pub op: ModOp,
    pub attr: String,
    pub values: Vec<Vec<u8>>,
}

/// Body of a `changetype: modrdn` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    pub new_superior: Option<String>,
}

/// Value of a `changetype:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add,
    Delete,
    Modify,
    ModRdn,
}

/// An untyped change item as handed over by callers building modlists:
/// either an addition `(type, values)` or a modification
/// `(op, type, values)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeItem {
    Add {
        attr: String,
        values: Vec<Vec<u8>>,
    },
    Modify {
        op: ModOp,
        attr: String,
        values: Vec<Vec<u8>>,
    },
}

/// The body of one LDIF record; the DN travels next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Content record without `changetype:`.
    Entry(Entry),
    Add(Vec<Attribute>),
    Modify(Vec<LdapMod>),
    Delete,
    ModRdn(RenameRecord),
}

impl Entry {
    pub fn new() -> Entry {
        Entry::default()
    }

    /// Find an attribute by descriptor name.
    /// If `create` is true and the attribute doesn't exist, create it.
    pub fn find_attribute(&mut self, ad: &str, create: bool) -> Option<&mut Attribute> {
        let pos = self.attributes.iter().position(|a| a.ad == ad);
        match pos {
            Some(i) => Some(&mut self.attributes[i]),
            None if create => {
                self.attributes.push(Attribute::new(ad.to_string()));
                self.attributes.last_mut()
            }
            None => None,
        }
    }

    pub fn get_attribute(&self, ad: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.ad == ad)
    }

    /// Append `data` to the values of `ad`, creating the attribute on first use.
    pub fn append_value(&mut self, ad: &str, data: &[u8]) {
        if let Some(attr) = self.find_attribute(ad, true) {
            attr.append_value(data);
        }
    }

    pub fn with_value(mut self, ad: &str, data: &[u8]) -> Entry {
        self.append_value(ad, data);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Attributes ordered by descriptor, as the writer emits them.
    pub fn sorted_attributes(&self) -> Vec<&Attribute> {
        let mut attrs: Vec<&Attribute> = self.attributes.iter().collect();
        attrs.sort_by(|a, b| a.ad.cmp(&b.ad));
        attrs
    }
}

impl Attribute {
    pub fn new(ad: String) -> Attribute {
        Attribute {
            ad,
            values: Vec::new(),
        }
    }

    pub fn with_values(ad: &str, values: Vec<Vec<u8>>) -> Attribute {
        Attribute {
            ad: ad.to_string(),
            values,
        }
    }

    pub fn append_value(&mut self, data: &[u8]) {
        self.values.push(data.to_vec());
    }
}

impl ModOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ModOp::Add => "add",
            ModOp::Delete => "delete",
            ModOp::Replace => "replace",
        }
    }

    /// Case-insensitive lookup of a modify operation name.
    pub fn from_name(name: &str) -> Option<ModOp> {
        [ModOp::Add, ModOp::Delete, ModOp::Replace]
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ModOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Delete => "delete",
            ChangeType::Modify => "modify",
            ChangeType::ModRdn => "modrdn",
        }
    }
}

impl FromStr for ChangeType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" => Ok(ChangeType::Add),
            "delete" => Ok(ChangeType::Delete),
            "modify" => Ok(ChangeType::Modify),
            "modrdn" => Ok(ChangeType::ModRdn),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Record {
    /// Build a change record from untyped items.  The first item decides
    /// between `changetype: add` and `changetype: modify`; every further
    /// item has to have the same shape.
    pub fn from_changes(items: Vec<ChangeItem>) -> Result<Record> {
        let is_add = match items.first() {
            None => return Ok(Record::Add(Vec::new())),
            Some(item) => matches!(item, ChangeItem::Add { .. }),
        };

        if is_add {
            let mut attrs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    ChangeItem::Add { attr, values } => attrs.push(Attribute { ad: attr, values }),
                    ChangeItem::Modify { .. } => return Err(LdifError::MixedChangeItems),
                }
            }
            Ok(Record::Add(attrs))
        } else {
            let mut mods = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    ChangeItem::Modify { op, attr, values } => mods.push(LdapMod { op, attr, values }),
                    ChangeItem::Add { .. } => return Err(LdifError::MixedChangeItems),
                }
            }
            Ok(Record::Modify(mods))
        }
    }

    /// Records without attributes or modify items are neither written nor
    /// reported by the parser.  Delete and modrdn records carry their meaning
    /// in the changetype alone.
    pub fn is_empty(&self) -> bool {
        match self {
            Record::Entry(entry) => entry.is_empty(),
            Record::Add(attrs) => attrs.is_empty(),
            Record::Modify(mods) => mods.is_empty(),
            Record::Delete | Record::ModRdn(_) => false,
        }
    }

    /// The `changetype:` of the record, `None` for a content record.
    pub fn changetype(&self) -> Option<ChangeType> {
        match self {
            Record::Entry(_) => None,
            Record::Add(_) => Some(ChangeType::Add),
            Record::Modify(_) => Some(ChangeType::Modify),
            Record::Delete => Some(ChangeType::Delete),
            Record::ModRdn(_) => Some(ChangeType::ModRdn),
        }
    }

    /// The attribute entry of a content record.
    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Record::Entry(entry) => Some(entry),
            _ => None,
        }
    }
}

impl From<Entry> for Record {
    fn from(entry: Entry) -> Record {
        Record::Entry(entry)
    }
}
