//! Parsing the one request-body shape this server consumes: the
//! BatchDelete XML body (`<Delete><Object><Key>...</Key></Object>...
//! </Delete>`).

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::XmlError;

/// Extract every `<Key>` text value nested under `<Object>` elements inside
/// a BatchDelete request body, in document order.
///
/// Unknown sibling elements (e.g. a per-object `<VersionId>`, which this
/// server has no use for since it has no versioning) are ignored rather
/// than rejected: be permissive about what's accepted.
///
/// # Errors
///
/// Returns [`XmlError::QuickXml`] if the body isn't well-formed XML.
pub fn parse_batch_delete_keys(body: &[u8]) -> Result<Vec<String>, XmlError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut keys = Vec::new();
    let mut in_key = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"Key" => in_key = true,
            Event::End(e) if e.local_name().as_ref() == b"Key" => in_key = false,
            Event::Text(t) if in_key => {
                keys.push(t.unescape()?.into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if keys.is_empty() {
        return Err(XmlError::MissingElement("Key".to_owned()));
    }

    Ok(keys)
}
