mod filter;
mod schema;
mod tokens;

pub use self::filter::filter_style;
pub use self::schema::{CssProperty, CssSchema, UnknownCssPropertyError, ValueClasses};
pub use self::tokens::{CssTokenType, CssTokens};
