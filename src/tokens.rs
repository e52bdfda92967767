use crate::error::{Result, SvgError};

/// One markup event, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Start {
        name: String,
        /// Local attribute names with their values, in source order.
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(String),
}

/// Decodes raw input as UTF-8, dropping a byte order mark.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map_err(|e| SvgError::malformed(format!("input is not valid UTF-8: {}", e)))
}

/// Flattens the markup into start/end/text events.
///
/// A markup error before any element has started is reported as
/// [`SvgError::EmptyDocument`].
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = match roxmltree::Document::parse_with_options(text, opts) {
        Ok(doc) => doc,
        Err(err) => {
            let pos = err.pos();
            let offset = byte_offset(text, pos.row as usize, pos.col as usize);
            if !has_element_start(&text[..offset]) {
                log::debug!("no element before markup error: {}", err);
                return Err(SvgError::EmptyDocument);
            }
            return Err(SvgError::Xml(err));
        }
    };

    let mut out = Vec::new();
    for child in doc.root().children() {
        collect_events(child, &mut out);
    }
    log::trace!("tokenized {} events", out.len());
    Ok(out)
}

fn collect_events(node: roxmltree::Node<'_, '_>, out: &mut Vec<Token>) {
    if node.is_text() {
        if let Some(text) = node.text() {
            out.push(Token::Text(text.to_string()));
        }
        return;
    }
    if !node.is_element() {
        return;
    }
    let name = node.tag_name().name().to_string();
    let attrs = node
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();
    out.push(Token::Start {
        name: name.clone(),
        attrs,
    });
    for child in node.children() {
        collect_events(child, out);
    }
    out.push(Token::End { name });
}

/// Converts a 1-based row/column (column counted in chars) to a byte offset.
fn byte_offset(text: &str, row: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if i + 1 == row {
            let in_line = line
                .char_indices()
                .nth(col.saturating_sub(1))
                .map(|(b, _)| b)
                .unwrap_or(line.len());
            return offset + in_line;
        }
        offset += line.len();
    }
    text.len()
}

fn has_element_start(prefix: &str) -> bool {
    prefix
        .as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'_' || w[1] == b':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_follow_document_order() {
        let tokens =
            tokenize(r#"<svg xmlns="http://www.w3.org/2000/svg"><title>Hi</title><g id="a"/></svg>"#)
                .unwrap();
        let names: Vec<String> = tokens
            .iter()
            .map(|t| match t {
                Token::Start { name, .. } => format!("<{}", name),
                Token::End { name } => format!("{}>", name),
                Token::Text(s) => s.clone(),
            })
            .collect();
        assert_eq!(names, vec!["<svg", "<title", "Hi", "title>", "<g", "g>", "svg>"]);
    }

    #[test]
    fn prefixed_attributes_use_local_names() {
        let tokens = tokenize(
            r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##,
        )
        .unwrap();
        match &tokens[1] {
            Token::Start { name, attrs } => {
                assert_eq!(name, "use");
                assert_eq!(attrs, &vec![("href".to_string(), "#a".to_string())]);
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn garbage_without_elements_is_empty_document() {
        assert!(matches!(tokenize("dummy"), Err(SvgError::EmptyDocument)));
        assert!(matches!(tokenize(""), Err(SvgError::EmptyDocument)));
    }

    #[test]
    fn broken_markup_after_an_element_is_xml_error() {
        assert!(matches!(tokenize("<svg><g></svg>"), Err(SvgError::Xml(_))));
    }

    #[test]
    fn doctype_is_accepted() {
        let src = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg/>";
        assert_eq!(tokenize(src).unwrap().len(), 2);
    }

    #[test]
    fn decode_strips_bom_and_rejects_bad_bytes() {
        assert_eq!(decode(b"\xEF\xBB\xBF<svg/>").unwrap(), "<svg/>");
        assert!(matches!(decode(b"<svg \xFF/>"), Err(SvgError::MalformedValue(_))));
    }
}
