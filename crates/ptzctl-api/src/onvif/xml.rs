// Namespace-agnostic view of SOAP responses.
//
// Devices disagree on namespace prefixes (`tt:`, `onvif:`, `ns2:`, none),
// so elements are matched on their local name only. The document is read
// with `xml-rs` into a small owned tree; entity and character references
// are decoded, CDATA is folded into text, comments are dropped.

use ::xml::reader::{ParserConfig, XmlEvent};

use crate::error::Error;

/// One element of a parsed response.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Attribute value by local name (`token`, `x`, ...).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name)?.trim().parse().ok()
    }

    /// First descendant with the given local name, in document order.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find_map(|c| {
            if c.name == local {
                Some(c)
            } else {
                c.child(local)
            }
        })
    }

    /// Every descendant with the given local name, in document order.
    /// Matches are not searched for further matches.
    pub fn children_named(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(local, &mut found);
        found
    }

    fn collect<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        for c in &self.children {
            if c.name == local {
                found.push(c);
            } else {
                c.collect(local, found);
            }
        }
    }

    /// Non-empty text of the first descendant with the given local name.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local)
            .map(Element::text)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    }
}

/// Parse a response body. The returned element is a document node whose
/// only child is the root element.
pub(crate) fn parse(body: &str) -> Result<Element, Error> {
    let reader = ParserConfig::new()
        .cdata_to_characters(true)
        .ignore_comments(true)
        .create_reader(body.as_bytes());

    let mut stack = vec![Element::default()];
    for event in reader {
        match event.map_err(|e| Error::protocol(format!("malformed XML response: {e}")))? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => stack.push(Element {
                name: name.local_name,
                attributes: attributes
                    .into_iter()
                    .map(|a| (a.name.local_name, a.value))
                    .collect(),
                ..Element::default()
            }),
            XmlEvent::EndElement { .. } if stack.len() > 1 => {
                if let (Some(done), Some(parent)) = (stack.pop(), stack.last_mut()) {
                    parent.children.push(done);
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            _ => {}
        }
    }

    stack
        .into_iter()
        .next()
        .filter(|doc| !doc.children.is_empty())
        .ok_or_else(|| Error::protocol("empty XML response"))
}

/// Extract `(code, reason)` from a SOAP 1.2 or 1.1 fault.
///
/// The code is the most specific one available: the subcode value
/// (`ter:NotAuthorized`) when present, otherwise the top-level code.
pub(crate) fn fault(doc: &Element) -> Option<(String, String)> {
    let fault = doc.child("Fault")?;

    let code = fault
        .child("Subcode")
        .and_then(|sub| sub.child_text("Value"))
        .or_else(|| fault.child("Code").and_then(|c| c.child_text("Value")))
        .or_else(|| fault.child_text("faultcode"))
        .unwrap_or_else(|| "unknown".into());

    let reason = fault
        .child("Reason")
        .and_then(|r| r.child_text("Text"))
        .or_else(|| fault.child_text("faultstring"))
        .unwrap_or_default();

    Some((code, reason))
}

/// Escape text for inclusion in element content or a quoted attribute.
pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a response body in an envelope declaring every ONVIF prefix the
/// driver sees, then parse it.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn parse_body(body: &str) -> Element {
    parse(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"
    xmlns:tt="http://www.onvif.org/ver10/schema"
    xmlns:tds="http://www.onvif.org/ver10/device/wsdl"
    xmlns:trt="http://www.onvif.org/ver10/media/wsdl"
    xmlns:tptz="http://www.onvif.org/ver20/ptz/wsdl"
    xmlns:timg="http://www.onvif.org/ver20/imaging/wsdl"><env:Body>{body}</env:Body></env:Envelope>"#
    ))
    .unwrap()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn text(doc: &Element, local: &str) -> Option<String> {
        doc.child(local).map(|e| e.text().to_owned())
    }

    const STATUS: &str = r#"
    <tptz:GetStatusResponse>
      <tptz:PTZStatus>
        <tt:Position>
          <tt:PanTilt x="0.25" y="-0.5" space="http://www.onvif.org/ver10/tptz/PanTiltSpaces/PositionGenericSpace"/>
          <tt:Zoom x="0.1"/>
        </tt:Position>
        <tt:MoveStatus>
          <tt:PanTilt>IDLE</tt:PanTilt>
          <tt:Zoom>MOVING</tt:Zoom>
        </tt:MoveStatus>
        <tt:UtcTime>2024-03-01T10:00:00Z</tt:UtcTime>
      </tptz:PTZStatus>
    </tptz:GetStatusResponse>"#;

    #[test]
    fn matches_on_local_name_regardless_of_prefix() {
        let doc = parse_body(STATUS);
        assert_eq!(text(&doc, "UtcTime").as_deref(), Some("2024-03-01T10:00:00Z"));
        let bare = parse("<UtcTime>x</UtcTime>").unwrap();
        assert_eq!(text(&bare, "UtcTime").as_deref(), Some("x"));
        let other = parse(r#"<ns9:UtcTime xmlns:ns9="urn:x">y</ns9:UtcTime>"#).unwrap();
        assert_eq!(text(&other, "UtcTime").as_deref(), Some("y"));
    }

    #[test]
    fn does_not_match_longer_names_with_the_same_prefix() {
        let doc = parse_body("<tt:PanTiltLimits>no</tt:PanTiltLimits><tt:PanTilt>yes</tt:PanTilt>");
        assert_eq!(text(&doc, "PanTilt").as_deref(), Some("yes"));
    }

    #[test]
    fn reads_attributes_of_self_closing_elements() {
        let doc = parse_body(STATUS);
        let position = doc.child("Position").unwrap();
        let pan_tilt = position.child("PanTilt").unwrap();
        assert_eq!(pan_tilt.attr_f64("x"), Some(0.25));
        assert_eq!(pan_tilt.attr_f64("y"), Some(-0.5));
        assert_eq!(position.child("Zoom").unwrap().attr_f64("x"), Some(0.1));
        assert!(pan_tilt.attr("z").is_none());
    }

    #[test]
    fn scopes_children_to_the_parent() {
        let doc = parse_body(STATUS);
        let moving = doc.child("MoveStatus").unwrap();
        assert_eq!(moving.child_text("PanTilt").as_deref(), Some("IDLE"));
        assert_eq!(moving.child_text("Zoom").as_deref(), Some("MOVING"));
    }

    #[test]
    fn collects_repeated_elements_in_order() {
        let doc = parse_body(
            r#"<tptz:Preset token="1"><tt:Name>door</tt:Name></tptz:Preset>
            <tptz:Preset token='2'><tt:Name>gate &amp; yard</tt:Name></tptz:Preset>"#,
        );
        let presets = doc.children_named("Preset");
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].attr("token"), Some("1"));
        assert_eq!(presets[1].attr("token"), Some("2"));
        assert_eq!(presets[1].child_text("Name").as_deref(), Some("gate & yard"));
    }

    #[test]
    fn decodes_character_references_and_cdata() {
        let doc = parse_body(
            "<tt:Name>Caf&#233; &#x26; Bar</tt:Name>\
             <tt:Label><![CDATA[Stage <L>]]></tt:Label>",
        );
        assert_eq!(text(&doc, "Name").as_deref(), Some("Café & Bar"));
        assert_eq!(text(&doc, "Label").as_deref(), Some("Stage <L>"));
    }

    #[test]
    fn ignores_elements_inside_comments() {
        let doc = parse_body(
            r#"<!-- <tptz:Preset token="99"><tt:Name>gone</tt:Name></tptz:Preset> -->
            <tptz:Preset token="1"/>"#,
        );
        let presets = doc.children_named("Preset");
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].attr("token"), Some("1"));
    }

    #[test]
    fn attribute_lookup_uses_whole_names() {
        let doc = parse_body(r#"<trt:Profiles fixed="true" token="main"/>"#);
        let el = doc.child("Profiles").unwrap();
        assert_eq!(el.attr("token"), Some("main"));
        assert_eq!(el.attr("ixed"), None);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            parse("<a><b></a>"),
            Err(Error::Protocol { .. })
        ));
        assert!(matches!(parse(""), Err(Error::Protocol { .. })));
        assert!(matches!(
            parse("<html><body>Unauthorized"),
            Err(Error::Protocol { .. })
        ));
    }

    #[test]
    fn parses_soap12_fault_with_subcode() {
        let doc = parse(
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><s:Fault>
            <s:Code><s:Value>s:Sender</s:Value>
              <s:Subcode><s:Value>ter:NotAuthorized</s:Value></s:Subcode></s:Code>
            <s:Reason><s:Text xml:lang="en">Sender not authorized</s:Text></s:Reason>
            </s:Fault></s:Body></s:Envelope>"#,
        )
        .unwrap();
        let (code, reason) = fault(&doc).unwrap();
        assert_eq!(code, "ter:NotAuthorized");
        assert_eq!(reason, "Sender not authorized");
    }

    #[test]
    fn parses_soap11_fault() {
        let doc = parse(
            "<Envelope><Body><Fault><faultcode>Client</faultcode>\
             <faultstring>bad token</faultstring></Fault></Body></Envelope>",
        )
        .unwrap();
        assert_eq!(
            fault(&doc),
            Some(("Client".to_owned(), "bad token".to_owned()))
        );
        assert!(fault(&parse_body(STATUS)).is_none());
    }

    #[test]
    fn escaped_text_reads_back_unchanged() {
        let raw = r#"a<b & "c" 'd'>"#;
        let escaped = escape(raw);
        assert!(!escaped.contains('<'));
        let doc = parse(&format!(r#"<Name v="{escaped}">{escaped}</Name>"#)).unwrap();
        let name = doc.child("Name").unwrap();
        assert_eq!(name.text(), raw);
        assert_eq!(name.attr("v"), Some(raw));
    }
}
