//! Archive unpacking and XML parsing for upstream documents.
//!
//! Pull-driven parsing with quick-xml; no DOM is built for the corp code
//! directory, which holds every registered company.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use thiserror::Error;

use super::identity::CompanyIdentity;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Errors raised while unpacking or parsing an upstream document.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("invalid archive: {0}")]
    Archive(String),

    #[error("archive contains no XML file")]
    MissingXml,

    #[error("document is not valid UTF-8")]
    Encoding,

    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    Empty,
}

/// Whether the body is a zip archive.
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Return the first `.xml` entry of a zip archive.
pub fn first_xml_entry(bytes: &[u8]) -> Result<Vec<u8>, XmlError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| XmlError::Archive(e.to_string()))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| XmlError::Archive(e.to_string()))?;
        if !file.name().to_lowercase().ends_with(".xml") {
            continue;
        }
        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)
            .map_err(|e| XmlError::Archive(e.to_string()))?;
        return Ok(contents);
    }

    Err(XmlError::MissingXml)
}

/// Unpack the body if it is an archive, otherwise hand it back unchanged.
pub fn unpack_xml(bytes: &[u8]) -> Result<Vec<u8>, XmlError> {
    if is_zip(bytes) {
        first_xml_entry(bytes)
    } else {
        Ok(bytes.to_vec())
    }
}

fn decode(bytes: &[u8]) -> Result<&str, XmlError> {
    let text = std::str::from_utf8(bytes).map_err(|_| XmlError::Encoding)?;
    Ok(text.trim_start_matches('\u{feff}'))
}

fn malformed(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> XmlError {
    XmlError::Malformed {
        position: reader.buffer_position(),
        message: err.to_string(),
    }
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Element under construction.
struct Node {
    tag: String,
    text: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
}

impl Node {
    fn open(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| malformed(reader, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| malformed(reader, e))?;
            attributes.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            tag: tag_name(start),
            text: String::new(),
            attributes,
            children: Map::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let mut fields = Map::new();
        let text = self.text.trim();
        if !text.is_empty() {
            fields.insert("text".to_string(), Value::String(text.to_string()));
        }
        if !self.attributes.is_empty() {
            fields.insert("attributes".to_string(), Value::Object(self.attributes));
        }
        for (tag, child) in self.children {
            insert_child(&mut fields, tag, child);
        }
        (self.tag, Value::Object(fields))
    }
}

/// Attach a child; repeated tags collect into an array.
fn insert_child(fields: &mut Map<String, Value>, tag: String, child: Value) {
    match fields.get_mut(&tag) {
        Some(Value::Array(items)) => items.push(child),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, child]);
        }
        None => {
            fields.insert(tag, child);
        }
    }
}

/// Convert an XML document into a field mapping of its root element.
///
/// Element text is stored under `text`, attributes under `attributes`, and
/// children by tag name. Repeated children become arrays.
pub fn xml_to_value(bytes: &[u8]) -> Result<Value, XmlError> {
    let text = decode(bytes)?;
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| malformed(&reader, e))?;
        match event {
            Event::Start(start) => stack.push(Node::open(&reader, &start)?),
            Event::Empty(start) => {
                let (tag, value) = Node::open(&reader, &start)?.close();
                attach(&mut stack, &mut root, tag, value);
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|e| malformed(&reader, e))?;
                    node.text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    let (tag, value) = node.close();
                    attach(&mut stack, &mut root, tag, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.tag));
    }
    root.ok_or(XmlError::Empty)
}

fn attach(stack: &mut [Node], root: &mut Option<Value>, tag: String, value: Value) {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, tag, value),
        None => {
            if root.is_none() {
                *root = Some(value);
            }
        }
    }
}

/// Read a `status`/`message` envelope from a non-archive body, JSON or XML.
pub fn status_envelope(bytes: &[u8]) -> Option<(String, String)> {
    if let Ok(json) = serde_json::from_slice::<Value>(bytes) {
        let status = json.get("status")?.as_str()?.to_string();
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Some((status, message));
    }

    let fields = xml_to_value(bytes).ok()?;
    let status = fields.get("status")?.get("text")?.as_str()?.to_string();
    let message = fields
        .get("message")
        .and_then(|m| m.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((status, message))
}

/// Field of a directory `<list>` entry currently being read.
#[derive(Clone, Copy)]
enum DirectoryField {
    CorpCode,
    CorpName,
    StockCode,
    ModifyDate,
}

impl DirectoryField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"corp_code" => Some(Self::CorpCode),
            b"corp_name" => Some(Self::CorpName),
            b"stock_code" => Some(Self::StockCode),
            b"modify_date" => Some(Self::ModifyDate),
            _ => None,
        }
    }
}

fn blank_company() -> CompanyIdentity {
    CompanyIdentity {
        corp_code: String::new(),
        corp_name: String::new(),
        stock_code: String::new(),
        modify_date: String::new(),
    }
}

/// Stream the corp code directory and keep companies whose name contains `query`
/// (case-insensitive).
pub fn search_directory(bytes: &[u8], query: &str) -> Result<Vec<CompanyIdentity>, XmlError> {
    let text = decode(bytes)?;
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let wanted = query.trim().to_lowercase();
    let mut matches = Vec::new();
    let mut current: Option<CompanyIdentity> = None;
    let mut field: Option<DirectoryField> = None;
    let mut saw_root = false;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| malformed(&reader, e))?;
        match event {
            Event::Start(start) => {
                saw_root = true;
                depth += 1;
                let name = start.name();
                if name.as_ref() == b"list" {
                    current = Some(blank_company());
                } else if current.is_some() {
                    field = DirectoryField::from_tag(name.as_ref());
                }
            }
            Event::Empty(_) => saw_root = true,
            Event::Text(t) => {
                if let (Some(company), Some(f)) = (current.as_mut(), field) {
                    let value = t.unescape().map_err(|e| malformed(&reader, e))?;
                    let slot = match f {
                        DirectoryField::CorpCode => &mut company.corp_code,
                        DirectoryField::CorpName => &mut company.corp_name,
                        DirectoryField::StockCode => &mut company.stock_code,
                        DirectoryField::ModifyDate => &mut company.modify_date,
                    };
                    slot.push_str(&value);
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                if end.name().as_ref() == b"list" {
                    if let Some(company) = current.take() {
                        if !company.corp_name.is_empty()
                            && company.corp_name.to_lowercase().contains(&wanted)
                        {
                            matches.push(company);
                        }
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(XmlError::Empty);
    }
    if depth > 0 {
        return Err(XmlError::Unclosed("result".to_string()));
    }
    Ok(matches)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    /// Build a zip archive holding one file.
    pub(crate) fn zip_with(name: &str, contents: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file(name, options).unwrap();
        writer.write_all(contents).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// A minimal corp code directory.
    pub(crate) fn directory_xml(companies: &[(&str, &str, &str)]) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<result>\n");
        for (code, name, stock) in companies {
            xml.push_str(&format!(
                "<list><corp_code>{}</corp_code><corp_name>{}</corp_name>\
                 <stock_code>{}</stock_code><modify_date>20240102</modify_date></list>\n",
                code, name, stock
            ));
        }
        xml.push_str("</result>");
        xml
    }

    #[test]
    fn test_xml_to_value_collects_repeated_tags() {
        let xml = br#"<doc id="7"><title>Report</title><p>one</p><p>two</p><empty/></doc>"#;
        let value = xml_to_value(xml).unwrap();
        assert_eq!(value["attributes"]["id"], "7");
        assert_eq!(value["title"]["text"], "Report");
        assert_eq!(value["p"], json!([{"text": "one"}, {"text": "two"}]));
        assert_eq!(value["empty"], json!({}));
    }

    #[test]
    fn test_xml_to_value_unescapes_text_and_cdata() {
        let value = xml_to_value(b"<a><b>x &amp; y</b><c><![CDATA[<raw>]]></c></a>").unwrap();
        assert_eq!(value["b"]["text"], "x & y");
        assert_eq!(value["c"]["text"], "<raw>");
    }

    #[test]
    fn test_xml_to_value_rejects_broken_documents() {
        assert!(matches!(
            xml_to_value(b"<a><b></a>"),
            Err(XmlError::Malformed { .. })
        ));
        assert!(matches!(xml_to_value(b"<a><b>"), Err(XmlError::Unclosed(_))));
        assert!(matches!(xml_to_value(b"   "), Err(XmlError::Empty)));
        assert!(matches!(xml_to_value(&[0xff, 0xfe]), Err(XmlError::Encoding)));
    }

    #[test]
    fn test_status_envelope_json_and_xml() {
        assert_eq!(
            status_envelope(br#"{"status":"010","message":"unregistered key"}"#),
            Some(("010".to_string(), "unregistered key".to_string()))
        );
        assert_eq!(
            status_envelope(b"<result><status>013</status><message>none</message></result>"),
            Some(("013".to_string(), "none".to_string()))
        );
        assert_eq!(status_envelope(b"%PDF-1.4"), None);
    }

    #[test]
    fn test_search_directory_matches_substring() {
        let xml = directory_xml(&[
            ("00126380", "삼성전자", "005930"),
            ("00164779", "SK하이닉스", "000660"),
            ("00126381", "삼성전자서비스", " "),
        ]);
        let found = search_directory(xml.as_bytes(), "삼성").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].corp_code, "00126380");
        assert_eq!(found[0].stock_code, "005930");
        assert_eq!(found[1].stock_code, "");

        let found = search_directory(xml.as_bytes(), "sk").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_unpack_zip_archive() {
        let archive = zip_with("CORPCODE.xml", b"<result></result>");
        assert!(is_zip(&archive));
        assert_eq!(unpack_xml(&archive).unwrap(), b"<result></result>");

        let no_xml = zip_with("readme.txt", b"hi");
        assert!(matches!(first_xml_entry(&no_xml), Err(XmlError::MissingXml)));
        assert!(matches!(
            first_xml_entry(b"PK\x03\x04garbage"),
            Err(XmlError::Archive(_))
        ));
    }
}
