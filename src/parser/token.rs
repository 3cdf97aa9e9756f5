use crate::base::Range;

/// Lexical class of a token. The splitter produces the coarse classes;
/// the lexer reclassifies in-tag `Text` into `AttrName`/`AttrValue`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenType {
    /// Character data in which entities are meaningful.
    Text,
    /// Raw character data from a CDATA-like region; entities are dead.
    Unescaped,
    /// `<name` or `</name`, through the end of the name.
    TagBegin,
    /// `>` or `/>`.
    TagEnd,
    AttrName,
    AttrValue,
    /// A quoted string inside a tag, including the delimiters.
    QString,
    /// `<!-- … -->`.
    Comment,
    /// `<!…>`, e.g. a doctype.
    Directive,
    /// `<%…%>`.
    ServerCode,
    /// `<?…>` bogus comment.
    QMarkMeta,
    /// In-tag whitespace.
    Ignorable,
}

/// An immutable token: a [`TokenType`] plus a half-open range into the
/// original input. Reclassification produces a new token with the same
/// range.
#[derive(Copy, Clone, Debug)]
pub struct Token {
    pub range: Range,
    pub token_type: TokenType,
}

impl Token {
    #[inline]
    pub fn new(token_type: TokenType, start: usize, end: usize) -> Self {
        Token {
            range: Range::new(start, end),
            token_type,
        }
    }

    #[inline]
    pub fn reclassified(self, token_type: TokenType) -> Self {
        Token {
            range: self.range,
            token_type,
        }
    }

    #[inline]
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        self.range.of(input)
    }
}
