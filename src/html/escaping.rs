use cfg_if::cfg_if;

/// Text-escaping mode of an element's content, deciding how the input
/// splitter treats the region between the start tag and the matching end
/// tag.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EscapingMode {
    /// Regular parsed character data: markup and entities are live.
    PcData,
    /// Raw text: `<` does not open markup, entities are dead.
    CData,
    /// Raw text in some legacy UAs, parsed in others. Treated as raw
    /// here, which is the conservative choice for a sanitizer.
    CDataSometimes,
    /// Raw text in which entities are still decoded.
    RcData,
    /// Raw text with no close sequence at all.
    PlainText,
    /// The element can never contain content.
    Void,
}

impl EscapingMode {
    /// The escape-exempt tag table. Tags in this fixed set switch the
    /// input splitter out of regular markup scanning when they open.
    pub fn of_exempt_tag(canonical_name: &str) -> Option<EscapingMode> {
        use self::EscapingMode::*;

        Some(match canonical_name {
            "script" | "style" | "xmp" | "listing" | "comment" => CData,
            "iframe" => CDataSometimes,
            "textarea" | "title" => RcData,
            "plaintext" => PlainText,
            _ => return None,
        })
    }

    /// Whether an HTML5 "escaping text span" (`<!-- … -->`) inside this
    /// element's content temporarily suppresses the close-tag search.
    #[inline]
    pub fn allows_escaping_text_span(self) -> bool {
        self == EscapingMode::CData || self == EscapingMode::CDataSometimes
    }

    /// Whether entities are meaningful in this element's text content.
    #[inline]
    pub fn decodes_entities(self) -> bool {
        self == EscapingMode::PcData || self == EscapingMode::RcData
    }
}

cfg_if! {
    if #[cfg(test)] {
        impl From<&str> for EscapingMode {
            fn from(mode: &str) -> Self {
                match mode {
                    "PCDATA" => EscapingMode::PcData,
                    "CDATA" => EscapingMode::CData,
                    "CDATA_SOMETIMES" => EscapingMode::CDataSometimes,
                    "RCDATA" => EscapingMode::RcData,
                    "PLAIN_TEXT" => EscapingMode::PlainText,
                    "VOID" => EscapingMode::Void,
                    _ => panic!("Unknown escaping mode"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exempt_table() {
        assert_eq!(
            EscapingMode::of_exempt_tag("script"),
            Some(EscapingMode::CData)
        );
        assert_eq!(
            EscapingMode::of_exempt_tag("textarea"),
            Some(EscapingMode::RcData)
        );
        assert_eq!(
            EscapingMode::of_exempt_tag("plaintext"),
            Some(EscapingMode::PlainText)
        );
        assert_eq!(EscapingMode::of_exempt_tag("div"), None);
    }

    #[test]
    fn escaping_text_spans() {
        assert!(EscapingMode::from("CDATA").allows_escaping_text_span());
        assert!(EscapingMode::from("CDATA_SOMETIMES").allows_escaping_text_span());
        assert!(!EscapingMode::from("RCDATA").allows_escaping_text_span());
        assert!(!EscapingMode::from("PLAIN_TEXT").allows_escaping_text_span());
    }
}
