//! The property filter: rewrites the contents of a `style` attribute to
//! a canonical declaration list, consulting the schema per property.
//!
//! Malformed declarations recover by skipping to the next top-level `;`
//! (bracket-balanced, so a stray `;` inside a function does not end the
//! declaration). A declaration whose value tokens all get rejected rolls
//! back entirely, property name included.

use crate::css::schema::ValueClasses;
use crate::css::{CssProperty, CssSchema, CssTokenType, CssTokens};

pub fn filter_style(schema: &CssSchema, css: &str) -> String {
    let tokens = CssTokens::lex(css);
    let mut out = String::new();
    let mut i = 0;

    while i < tokens.len() {
        i = filter_declaration(schema, &tokens, i, &mut out);
    }

    trace!(@css "{:?} -> {:?}", css, out);

    out
}

fn filter_declaration(schema: &CssSchema, tokens: &CssTokens, mut i: usize, out: &mut String) -> usize {
    // 1. Find the property name.
    loop {
        if i >= tokens.len() {
            return i;
        }

        match tokens.token_type(i) {
            CssTokenType::Ident => break,
            CssTokenType::Whitespace | CssTokenType::Semicolon => i += 1,
            _ => return skip_declaration(tokens, i),
        }
    }

    let name = tokens.token_text(i);

    i += 1;

    // 2. Require the `:`.
    while i < tokens.len() && tokens.token_type(i) == CssTokenType::Whitespace {
        i += 1;
    }

    if i >= tokens.len() || tokens.token_type(i) != CssTokenType::Colon {
        return skip_declaration(tokens, i);
    }

    i += 1;

    let property = match schema.property(name) {
        Some(property) => property,
        None => return skip_declaration(tokens, i),
    };

    let value_end = declaration_end(tokens, i);

    // 3. Filter the value tokens, rolling back if none survive.
    let rollback = out.len();

    if !out.is_empty() {
        out.push(';');
    }

    out.push_str(name);
    out.push(':');

    let before_value = out.len();

    filter_value(schema, property, tokens, i, value_end, out);

    if out.len() == before_value {
        out.truncate(rollback);
    }

    if value_end < tokens.len() {
        value_end + 1
    } else {
        value_end
    }
}

/// The exclusive end of the declaration's value: the next `;` at bracket
/// depth zero, or end of stream.
fn declaration_end(tokens: &CssTokens, mut i: usize) -> usize {
    while i < tokens.len() {
        let token_type = tokens.token_type(i);

        if token_type == CssTokenType::Semicolon {
            break;
        }

        i = match tokens.partner(i) {
            Some(partner) if token_type.is_open_bracket() => partner + 1,
            _ => i + 1,
        };
    }

    i
}

/// Error recovery: drop everything through the next top-level `;`.
fn skip_declaration(tokens: &CssTokens, i: usize) -> usize {
    let end = declaration_end(tokens, i);

    if end < tokens.len() {
        end + 1
    } else {
        end
    }
}

fn filter_value(
    schema: &CssSchema,
    property: &CssProperty,
    tokens: &CssTokens,
    mut i: usize,
    end: usize,
    out: &mut String,
) {
    let mut ident_run: Vec<&str> = Vec::new();

    while i < end {
        let token_type = tokens.token_type(i);
        let text = tokens.token_text(i);

        if token_type != CssTokenType::Ident && token_type != CssTokenType::Whitespace {
            flush_ident_run(&mut ident_run, out);
        }

        match token_type {
            CssTokenType::Whitespace => {}

            CssTokenType::Ident => {
                if property.literals.contains(text) {
                    flush_ident_run(&mut ident_run, out);
                    emit_word(out, text);
                } else if property
                    .classes
                    .contains(ValueClasses::UNRESERVED_WORD | ValueClasses::STRING)
                {
                    ident_run.push(text);
                }
            }

            CssTokenType::Number | CssTokenType::Percentage | CssTokenType::Dimension => {
                let required = if text.starts_with('-') {
                    ValueClasses::NEGATIVE
                } else {
                    ValueClasses::QUANTITY
                };

                if property.classes.contains(required) || property.literals.contains(text) {
                    emit_word(out, text);
                }
            }

            CssTokenType::HashUnrestricted => {
                if (text.len() == 4 || text.len() == 7)
                    && property.classes.contains(ValueClasses::HASH_VALUE)
                {
                    emit_word(out, text);
                }
            }

            CssTokenType::String => {
                let string_ok = property.classes.contains(ValueClasses::STRING)
                    && !property.classes.contains(ValueClasses::URL);

                if string_ok && is_plain_string(text) {
                    emit_word(out, text);
                }
            }

            CssTokenType::UnicodeRange => {
                if property.classes.contains(ValueClasses::UNICODE_RANGE) {
                    emit_word(out, text);
                }
            }

            // NOTE: URL policy integration point; until a URL policy is
            // wired in, url(...) tokens drop.
            CssTokenType::Url => {}

            CssTokenType::Function => {
                let partner = tokens.partner(i).unwrap_or(end.saturating_sub(1));
                let fn_name = &text[..text.len() - 1];

                let sub_schema = property
                    .functions
                    .get(fn_name)
                    .and_then(|&key| schema.function_schema(key));

                if let Some(sub) = sub_schema {
                    emit_word(out, text);
                    filter_value(schema, sub, tokens, i + 1, partner, out);
                    out.push(')');
                }

                i = partner + 1;
                continue;
            }

            CssTokenType::LeftParen | CssTokenType::LeftSquare | CssTokenType::LeftCurly => {
                // A bare bracketed group is not valid in any whitelisted
                // value; drop it whole.
                i = tokens.partner(i).unwrap_or(i) + 1;
                continue;
            }

            CssTokenType::Comma => {
                if property.literals.contains(",") {
                    out.push(',');
                }
            }

            CssTokenType::Delim => {
                if property.literals.contains(text) {
                    if text == "/" {
                        out.push('/');
                    } else {
                        emit_word(out, text);
                    }
                }
            }

            _ => {}
        }

        i += 1;
    }

    flush_ident_run(&mut ident_run, out);
}

/// Words accumulated for a `UNRESERVED_WORD|STRING` property come out as
/// one single-quoted, space-separated string.
fn flush_ident_run(run: &mut Vec<&str>, out: &mut String) {
    if run.is_empty() {
        return;
    }

    let mut quoted = String::with_capacity(2 + run.iter().map(|w| w.len() + 1).sum::<usize>());

    quoted.push('\'');
    quoted.push_str(&run.join(" "));
    quoted.push('\'');

    emit_word(out, &quoted);
    run.clear();
}

/// A normalized string token is emittable only when its content is plain
/// words: alphanumerics, spaces, hyphens.
fn is_plain_string(token_text: &str) -> bool {
    debug_assert!(token_text.starts_with('\'') && token_text.ends_with('\''));

    token_text[1..token_text.len() - 1]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
}

fn emit_word(out: &mut String, word: &str) {
    match out.chars().last() {
        None | Some(':') | Some('(') | Some(',') | Some('/') => {}
        _ => out.push(' '),
    }

    out.push_str(word);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(css: &str) -> String {
        filter_style(CssSchema::default_whitelist(), css)
    }

    #[test]
    fn keeps_whitelisted_declarations() {
        assert_eq!(filter("color: red"), "color:red");
        assert_eq!(filter("color:RED;"), "color:red");
        assert_eq!(filter("margin: 0 10px -5px auto"), "margin:0 10px -5px auto");
        assert_eq!(filter("font-weight: bold"), "font-weight:bold");
        assert_eq!(filter("font-weight: 700"), "font-weight:700");
    }

    #[test]
    fn drops_unknown_properties() {
        assert_eq!(filter("behavior: url(#default#time2)"), "");
        assert_eq!(filter("color: red; behavior: x"), "color:red");
        assert_eq!(filter("behavior: x; color: red"), "color:red");
    }

    #[test]
    fn drops_expression_calls() {
        assert_eq!(filter("color: red; expression(evil)"), "color:red");
        assert_eq!(filter("width: expression(alert(1))"), "");
    }

    #[test]
    fn drops_urls_until_a_policy_exists() {
        assert_eq!(filter("background: url(javascript:foo)"), "");
        assert_eq!(
            filter("background: red url(javascript:foo)"),
            "background:red"
        );
    }

    #[test]
    fn hex_colors() {
        assert_eq!(filter("color: #fff"), "color:#fff");
        assert_eq!(filter("color: #AABBCC"), "color:#aabbcc");
        // Wrong lengths are rejected.
        assert_eq!(filter("color: #ffff"), "");
        assert_eq!(filter("color: #12345"), "");
    }

    #[test]
    fn color_functions() {
        assert_eq!(filter("color: rgb(1,2,3)"), "color:rgb(1,2,3)");
        assert_eq!(filter("color: rgba(1, 2, 3, 0.5)"), "color:rgba(1,2,3,0.5)");
        // Unknown functions drop whole.
        assert_eq!(filter("color: evil(1,2)"), "");
        assert_eq!(filter("color: red evil(1,2)"), "color:red");
    }

    #[test]
    fn negative_quantities_need_the_negative_bit() {
        assert_eq!(filter("margin-left: -5px"), "margin-left:-5px");
        assert_eq!(filter("padding-left: -5px"), "");
        assert_eq!(filter("padding-left: 5px"), "padding-left:5px");
    }

    #[test]
    fn font_family_words_get_quoted() {
        assert_eq!(
            filter("font-family: Arial Black, serif"),
            "font-family:'arial black',serif"
        );
        // Quoted strings keep their case; only identifiers fold.
        assert_eq!(filter("font-family: 'Droid Sans'"), "font-family:'Droid Sans'");
    }

    #[test]
    fn vendor_prefixes_strip() {
        assert_eq!(filter("-webkit-border-radius: 5px"), "-webkit-border-radius:5px");
        assert_eq!(filter("-webkit-behavior: x"), "");
    }

    #[test]
    fn error_recovery_to_next_semicolon() {
        assert_eq!(filter("{color: red}; color: blue"), "color:blue");
        assert_eq!(filter(": red; color: blue"), "color:blue");
        assert_eq!(filter("color red; color: blue"), "color:blue");
    }

    #[test]
    fn semicolons_inside_functions_do_not_split() {
        // The lexer balances brackets, so the `;` lives inside the
        // dropped function call.
        assert_eq!(filter("color: evil(a;b); color: red"), "color:red");
    }

    #[test]
    fn empty_values_roll_back() {
        assert_eq!(filter("color:"), "");
        assert_eq!(filter("color: ;"), "");
        assert_eq!(filter("color: 7"), "");
        assert_eq!(filter("color: red; margin: url(x)"), "color:red");
    }

    #[test]
    fn bad_dimensions_are_rejected() {
        assert_eq!(filter("width: 10foo"), "");
        assert_eq!(filter("width: 10px"), "width:10px");
        assert_eq!(filter("width: 10 px"), "width:10px");
    }

    #[test]
    fn unreserved_strings() {
        assert_eq!(filter("font-family: 'ok name'"), "font-family:'ok name'");
        // Strings with markup-significant content drop (the lexer has
        // escaped them, so they are not plain words).
        assert_eq!(filter("font-family: '</style>'"), "");
    }
}
