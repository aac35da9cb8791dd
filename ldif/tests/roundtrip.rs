use std::io::{self, Cursor, Write};

use ldif::{
    create_ldif, is_dn, needs_base64, parse_ldif, CaseInsensitiveSet, Entry, LdapMod, LdifCopy,
    LdifError, LdifParser, LdifWriter, ModOp, ParserConfig, Record, SkipReason, WriterConfig,
};
use rstest::rstest;
use tempfile::NamedTempFile;

fn write_all(records: &[(String, Record)], config: WriterConfig) -> Vec<u8> {
    let mut writer = LdifWriter::new(Vec::new(), config).unwrap();
    for (dn, record) in records {
        writer.write(dn, record).unwrap();
    }
    writer.into_inner()
}

fn read_all(data: &[u8]) -> Vec<(String, Record)> {
    parse_ldif(Cursor::new(data), Vec::<&str>::new(), 0).unwrap()
}

// ── DN grammar ──────────────────────────────────────────────────────────

#[test]
fn dn_acceptance() {
    assert!(is_dn(""));
    assert!(is_dn("cn=Alice,dc=example,dc=com"));
    assert!(!is_dn("cn=Alice,,dc=com"));
}

// ── Record boundaries and errors ────────────────────────────────────────

#[test]
fn single_record() {
    let mut parser = LdifParser::new(Cursor::new(&b"dn: cn=a,dc=com\ncn: a\n\n"[..]), ParserConfig::default());
    let mut seen = Vec::new();
    parser
        .parse_with(&mut |dn: &str, record: Record| -> ldif::Result<()> {
            seen.push((dn.to_string(), record));
            Ok(())
        })
        .unwrap();
    assert_eq!(parser.records_read(), 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "cn=a,dc=com");
    let entry = seen[0].1.as_entry().unwrap();
    assert_eq!(entry.get_attribute("cn").unwrap().values, vec![b"a".to_vec()]);
}

#[test]
fn max_entries_stops_early() {
    let mut input = Vec::new();
    for i in 0..5 {
        write!(input, "dn: cn={i},dc=com\ncn: {i}\n\n").unwrap();
    }
    // Anything after the second record is never looked at.
    input.extend_from_slice(b"dn: broken\n\n");

    let records = parse_ldif(Cursor::new(input), Vec::<&str>::new(), 2).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].0, "cn=1,dc=com");
}

#[test]
fn ignored_userpassword() {
    let records = parse_ldif(
        Cursor::new(&b"dn: cn=a,dc=com\ncn: a\nuserPassword: secret\n\n"[..]),
        ["userPassword"],
        0,
    )
    .unwrap();
    assert!(records[0].1.as_entry().unwrap().get_attribute("userPassword").is_none());
}

#[test]
fn duplicate_dn_and_bogus_changetype() {
    let dup = parse_ldif(
        Cursor::new(&b"dn: cn=a,dc=com\ndn: cn=a,dc=com\n\n"[..]),
        Vec::<&str>::new(),
        0,
    );
    assert!(matches!(dup, Err(LdifError::DuplicateDn { .. })));

    let bogus = parse_ldif(
        Cursor::new(&b"dn: cn=a,dc=com\nchangetype: bogus\n\n"[..]),
        Vec::<&str>::new(),
        0,
    );
    assert!(matches!(bogus, Err(LdifError::InvalidChangetype { .. })));
}

// ── Writing ─────────────────────────────────────────────────────────────

#[test]
fn modify_record_text() {
    let record = Record::Modify(vec![LdapMod {
        op: ModOp::Replace,
        attr: "mail".to_string(),
        values: vec![b"a@b.com".to_vec()],
    }]);
    assert_eq!(
        create_ldif("cn=a,dc=com", &record, &CaseInsensitiveSet::new(), 76).unwrap(),
        "dn: cn=a,dc=com\nchangetype: modify\nreplace: mail\nmail: a@b.com\n-\n\n"
    );
}

#[rstest(
    value,
    case(&b"trailing space "[..]),
    case(&b"line\nbreak"[..]),
    case(&b"carriage\rreturn"[..]),
    case(&b"nul\0byte"[..]),
    case(&b" leading space"[..]),
    case(&b"\x01\x02\x7f control "[..])
)]
fn unsafe_values_survive(value: &[u8]) {
    assert!(needs_base64(value));
    let record = Record::Entry(Entry::new().with_value("description", value));
    let text = write_all(&[("cn=a,dc=com".to_string(), record.clone())], WriterConfig::default());
    assert!(String::from_utf8_lossy(&text).contains("description:: "));
    assert_eq!(read_all(&text), vec![("cn=a,dc=com".to_string(), record)]);
}

#[rstest(cols, case(2), case(7), case(76))]
fn written_records_parse_back(cols: usize) {
    let long = "x".repeat(200);
    let records = vec![
        (
            "cn=Long Value,ou=People,dc=example,dc=com".to_string(),
            Record::Entry(
                Entry::new()
                    .with_value("cn", b"Long Value")
                    .with_value("description", long.as_bytes())
                    .with_value("jpegPhoto", &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]),
            ),
        ),
        ("cn=gone,dc=example,dc=com".to_string(), Record::Delete),
    ];
    let text = write_all(&records, WriterConfig::new().with_cols(cols).with_line_sep("\r\n"));
    for line in text.split(|&c| c == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        assert!(line.len() <= cols, "line {:?} wider than {}", String::from_utf8_lossy(line), cols);
    }
    assert_eq!(read_all(&text), records);
}

// ── Copying and URL values ──────────────────────────────────────────────

#[test]
fn copy_fetches_file_urls() {
    let mut photo = NamedTempFile::new().unwrap();
    photo.write_all(b"\x89PNG binary").unwrap();
    let url = url::Url::from_file_path(photo.path()).unwrap();

    let input = format!("dn: cn=a,dc=com\ncn: a\njpegPhoto:< {}\n\n", url);
    let mut copy = LdifCopy::new(
        Cursor::new(input.into_bytes()),
        Vec::new(),
        ParserConfig::new().with_url_schemes(["file"]),
        WriterConfig::default(),
    )
    .unwrap();
    assert_eq!(copy.copy().unwrap(), 1);
    assert_eq!(copy.records_written(), 1);

    let out = copy.into_output();
    let records = read_all(&out);
    let entry = records[0].1.as_entry().unwrap();
    assert_eq!(entry.get_attribute("jpegPhoto").unwrap().values, vec![b"\x89PNG binary".to_vec()]);
}

#[test]
fn missing_file_url_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::from_file_path(dir.path().join("absent.jpg")).unwrap();
    let input = format!("dn: cn=a,dc=com\ncn: a\njpegPhoto:< {}\n\n", url);

    let mut parser = LdifParser::new(Cursor::new(input.into_bytes()), ParserConfig::new().with_url_schemes(["file"]));
    assert_eq!(parser.parse().unwrap(), 1);
    assert_eq!(parser.skipped().len(), 1);
    assert_eq!(parser.skipped()[0].line, 3);
    assert_eq!(parser.skipped()[0].reason, SkipReason::FetchFailed);
}

#[test]
fn custom_fetcher() {
    let input = b"dn: cn=a,dc=com\ndescription:< https://example.com/d.txt\n\n";
    let mut parser = LdifParser::new(Cursor::new(&input[..]), ParserConfig::new().with_url_schemes(["https"]))
        .with_fetcher(|url: &url::Url| -> io::Result<Vec<u8>> { Ok(url.host_str().unwrap_or("").as_bytes().to_vec()) });
    let mut values = Vec::new();
    parser
        .parse_with(&mut |_: &str, record: Record| -> ldif::Result<()> {
            values = record.as_entry().unwrap().get_attribute("description").unwrap().values.clone();
            Ok(())
        })
        .unwrap();
    assert_eq!(values, vec![b"example.com".to_vec()]);
}
