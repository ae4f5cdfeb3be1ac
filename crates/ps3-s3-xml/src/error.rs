//! XML processing errors and the uniform S3 `<Error>` document.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors that can occur while serializing or deserializing S3 XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error while writing to the output buffer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying `quick-xml` reader/writer.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A batch-delete request body was missing a `<Key>` element.
    #[error("missing required XML element: {0}")]
    MissingElement(String),
}

/// Format an S3 error as the uniform XML document this server always
/// returns: `<?xml version="1.0" encoding="UTF-8"?><Error><Code>C</Code>
/// <Message>M</Message></Error>`, with an optional `<Resource>` child when
/// the error names one.
///
/// Writing to an in-memory `Vec<u8>` cannot fail in practice; if it somehow
/// does, this logs and returns an empty buffer rather than panicking, since
/// error formatting itself must never be the cause of a 500.
#[must_use]
pub fn error_to_xml(code: &str, message: &str, resource: Option<&str>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, code, message, resource) {
        tracing::error!(error = %e, "failed to serialize S3 error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(
    buf: &mut Vec<u8>,
    code: &str,
    message: &str,
    resource: Option<&str>,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(code))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(message))?;
        if let Some(res) = resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(res))?;
        }
        Ok(())
    })?;
    Ok(())
}
