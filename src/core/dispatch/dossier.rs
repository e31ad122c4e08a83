//! Document dossier XML
//!
//! Carries the same fields as the JSON registration document. Optional
//! fields are left out rather than written empty.

use crate::adapters::jembi::RegistrationDocument;
use crate::domain::JembiError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const ROOT: &str = "DocumentDossier";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_error(e: impl std::fmt::Display) -> JembiError {
    JembiError::InvalidDocument(format!("Failed to write dossier XML: {e}"))
}

fn write_start(w: &mut XmlWriter, tag: &str) -> Result<(), JembiError> {
    w.write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_error)
}

fn write_end(w: &mut XmlWriter, tag: &str) -> Result<(), JembiError> {
    w.write_event(Event::End(BytesEnd::new(tag))).map_err(xml_error)
}

fn write_text_elem(w: &mut XmlWriter, tag: &str, text: &str) -> Result<(), JembiError> {
    write_start(w, tag)?;
    w.write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    write_end(w, tag)
}

fn write_opt_elem(w: &mut XmlWriter, tag: &str, text: Option<&str>) -> Result<(), JembiError> {
    match text {
        Some(text) => write_text_elem(w, tag, text),
        None => Ok(()),
    }
}

/// Serializes a registration document as a dossier
///
/// # Errors
///
/// `JembiError::InvalidDocument` if the writer fails.
pub fn build_dossier(document: &RegistrationDocument) -> Result<String, JembiError> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    write_start(&mut w, ROOT)?;

    write_start(&mut w, "metadata")?;
    write_text_elem(&mut w, "mha", &document.mha.to_string())?;
    write_text_elem(&mut w, "swt", &document.swt.to_string())?;
    write_text_elem(&mut w, "type", &document.subscription_type.to_string())?;
    write_text_elem(&mut w, "encdate", &document.encdate)?;
    write_end(&mut w, "metadata")?;

    write_start(&mut w, "patient")?;
    write_text_elem(&mut w, "id", &document.id)?;
    write_text_elem(&mut w, "cmsisdn", &document.cmsisdn)?;
    write_text_elem(&mut w, "lang", &document.lang)?;
    write_opt_elem(&mut w, "dob", document.dob.as_deref())?;
    write_end(&mut w, "patient")?;

    if document.dmsisdn.is_some() || document.faccode.is_some() {
        write_start(&mut w, "author")?;
        write_opt_elem(&mut w, "dmsisdn", document.dmsisdn.as_deref())?;
        write_opt_elem(&mut w, "faccode", document.faccode.as_deref())?;
        write_end(&mut w, "author")?;
    }

    if let Some(ref edd) = document.edd {
        write_start(&mut w, "pregnancy")?;
        write_text_elem(&mut w, "edd", edd)?;
        write_end(&mut w, "pregnancy")?;
    }

    write_end(&mut w, ROOT)?;

    String::from_utf8(w.into_inner().into_inner()).map_err(xml_error)
}
