//! The CSS property schema: which properties a `style` attribute may
//! carry and which value shapes each property accepts.
//!
//! The default whitelist is a data table separable from the filter code.
//! Function arguments (`rgb(…)`, `rect(…)`) validate against sub-schemas
//! stored under parenthesized keys, which cannot collide with real
//! property names.

use bitflags::bitflags;
use failure::Fail;
use hashbrown::{HashMap, HashSet};
use lazy_static::lazy_static;

bitflags! {
    /// Value classes a property may accept beyond its literal set.
    pub struct ValueClasses: u8 {
        const QUANTITY        = 1;
        const HASH_VALUE      = 1 << 1;
        const NEGATIVE        = 1 << 2;
        const STRING          = 1 << 3;
        const URL             = 1 << 4;
        const UNRESERVED_WORD = 1 << 5;
        const UNICODE_RANGE   = 1 << 6;
    }
}

#[derive(Clone, Debug)]
pub struct CssProperty {
    pub classes: ValueClasses,
    pub literals: HashSet<&'static str>,
    /// Function name → schema key for the function's arguments.
    pub functions: HashMap<&'static str, &'static str>,
}

#[derive(Fail, Debug, PartialEq)]
#[fail(display = "Unknown CSS property in whitelist: `{}`.", _0)]
pub struct UnknownCssPropertyError(pub String);

static VENDOR_PREFIXES: &[&str] = &["-ms-", "-moz-", "-o-", "-webkit-"];

#[derive(Debug)]
pub struct CssSchema {
    properties: HashMap<&'static str, CssProperty>,
}

impl CssSchema {
    /// The built-in whitelist.
    #[inline]
    pub fn default_whitelist() -> &'static CssSchema {
        &DEFAULT_SCHEMA
    }

    /// A schema restricted to the named subset of the default whitelist.
    /// Unknown property names are a construction-time error.
    pub fn with_properties(names: &[&str]) -> Result<CssSchema, UnknownCssPropertyError> {
        let mut properties = HashMap::with_capacity(names.len());

        for (&key, property) in DEFAULT_SCHEMA.properties.iter() {
            // Function sub-schemas always come along.
            if key.ends_with("()") {
                properties.insert(key, property.clone());
            }
        }

        for name in names {
            match DEFAULT_SCHEMA.properties.get_key_value(*name) {
                Some((&key, property)) if !key.ends_with("()") => {
                    properties.insert(key, property.clone());
                }
                _ => return Err(UnknownCssPropertyError(name.to_string())),
            }
        }

        Ok(CssSchema { properties })
    }

    /// Looks up a property by canonical (lowercased) name, stripping a
    /// recognized vendor prefix on a miss.
    pub fn property(&self, name: &str) -> Option<&CssProperty> {
        if let Some(property) = self.properties.get(name) {
            return Some(property);
        }

        if name.starts_with('-') {
            for prefix in VENDOR_PREFIXES {
                if name.len() > prefix.len() && name.starts_with(prefix) {
                    if let Some(property) = self.properties.get(&name[prefix.len()..]) {
                        return Some(property);
                    }
                }
            }
        }

        None
    }

    /// Resolves a function sub-schema key (e.g. `"rgb()"`).
    #[inline]
    pub(crate) fn function_schema(&self, key: &str) -> Option<&CssProperty> {
        self.properties.get(key)
    }
}

fn prop(
    classes: ValueClasses,
    literals: &[&'static str],
    functions: &[(&'static str, &'static str)],
) -> CssProperty {
    CssProperty {
        classes,
        literals: literals.iter().copied().collect(),
        functions: functions.iter().copied().collect(),
    }
}

fn build_default() -> HashMap<&'static str, CssProperty> {
    use self::ValueClasses as V;

    const NONE: ValueClasses = ValueClasses::empty();

    let color_fns: &[(&'static str, &'static str)] = &[
        ("rgb", "rgb()"),
        ("rgba", "rgb()"),
        ("hsl", "rgb()"),
        ("hsla", "rgb()"),
    ];

    let colors: &[&'static str] = &[
        "aqua",
        "black",
        "blue",
        "currentcolor",
        "fuchsia",
        "gray",
        "green",
        "grey",
        "inherit",
        "lime",
        "maroon",
        "navy",
        "olive",
        "orange",
        "purple",
        "red",
        "silver",
        "teal",
        "transparent",
        "white",
        "yellow",
    ];

    let border_styles: &[&'static str] = &[
        "dashed", "dotted", "double", "groove", "hidden", "inherit", "inset", "none", "outset",
        "ridge", "solid",
    ];

    let border_widths: &[&'static str] = &["inherit", "medium", "thick", "thin"];

    let mut p: HashMap<&'static str, CssProperty> = HashMap::new();

    // Function argument sub-schemas.
    p.insert("rgb()", prop(V::QUANTITY, &[","], &[]));
    p.insert(
        "rect()",
        prop(V::QUANTITY | V::NEGATIVE, &[",", "auto"], &[]),
    );

    // Color.
    p.insert("color", prop(V::HASH_VALUE, colors, color_fns));
    p.insert("background-color", prop(V::HASH_VALUE, colors, color_fns));
    p.insert(
        "background",
        prop(
            V::HASH_VALUE | V::QUANTITY | V::NEGATIVE,
            &{
                let mut lits = colors.to_vec();
                lits.extend_from_slice(&[
                    "bottom", "center", "fixed", "left", "no-repeat", "none", "repeat",
                    "repeat-x", "repeat-y", "right", "scroll", "top", ",", "/",
                ]);
                lits
            },
            color_fns,
        ),
    );
    p.insert(
        "background-position",
        prop(
            V::QUANTITY | V::NEGATIVE,
            &["bottom", "center", "left", "right", "top", "inherit"],
            &[],
        ),
    );
    p.insert(
        "background-repeat",
        prop(
            NONE,
            &["inherit", "no-repeat", "repeat", "repeat-x", "repeat-y"],
            &[],
        ),
    );

    // Borders and outlines.
    let border_shorthand = || {
        prop(
            V::QUANTITY | V::HASH_VALUE,
            &{
                let mut lits = colors.to_vec();
                lits.extend_from_slice(border_styles);
                lits.extend_from_slice(border_widths);
                lits
            },
            color_fns,
        )
    };

    p.insert("border", border_shorthand());
    p.insert("border-bottom", border_shorthand());
    p.insert("border-left", border_shorthand());
    p.insert("border-right", border_shorthand());
    p.insert("border-top", border_shorthand());
    p.insert("outline", {
        let mut shorthand = border_shorthand();
        shorthand.literals.insert("invert");
        shorthand
    });

    for &(name, styled) in &[
        ("border-color", false),
        ("border-bottom-color", false),
        ("border-left-color", false),
        ("border-right-color", false),
        ("border-top-color", false),
        ("outline-color", true),
    ] {
        let mut property = prop(V::HASH_VALUE, colors, color_fns);

        if styled {
            property.literals.insert("invert");
        }

        p.insert(name, property);
    }

    for &name in &[
        "border-style",
        "border-bottom-style",
        "border-left-style",
        "border-right-style",
        "border-top-style",
        "outline-style",
    ] {
        p.insert(name, prop(NONE, border_styles, &[]));
    }

    for &name in &[
        "border-width",
        "border-bottom-width",
        "border-left-width",
        "border-right-width",
        "border-top-width",
        "outline-width",
    ] {
        p.insert(name, prop(V::QUANTITY, border_widths, &[]));
    }

    p.insert("border-collapse", prop(NONE, &["collapse", "inherit", "separate"], &[]));
    p.insert("border-spacing", prop(V::QUANTITY, &["inherit"], &[]));

    for &name in &[
        "border-radius",
        "border-bottom-left-radius",
        "border-bottom-right-radius",
        "border-top-left-radius",
        "border-top-right-radius",
    ] {
        p.insert(name, prop(V::QUANTITY, &["/"], &[]));
    }

    // Box model.
    for &name in &["margin", "margin-bottom", "margin-left", "margin-right", "margin-top"] {
        p.insert(
            name,
            prop(V::QUANTITY | V::NEGATIVE, &["auto", "inherit"], &[]),
        );
    }

    for &name in &[
        "padding",
        "padding-bottom",
        "padding-left",
        "padding-right",
        "padding-top",
    ] {
        p.insert(name, prop(V::QUANTITY, &["inherit"], &[]));
    }

    for &name in &["height", "width"] {
        p.insert(name, prop(V::QUANTITY, &["auto", "inherit"], &[]));
    }

    for &name in &["max-height", "max-width"] {
        p.insert(name, prop(V::QUANTITY, &["inherit", "none"], &[]));
    }

    for &name in &["min-height", "min-width"] {
        p.insert(name, prop(V::QUANTITY, &["inherit"], &[]));
    }

    // Typography.
    p.insert(
        "font",
        prop(
            V::QUANTITY | V::STRING | V::UNRESERVED_WORD,
            &[
                "100", "200", "300", "400", "500", "600", "700", "800", "900", "bold", "bolder",
                "caption", "cursive", "fantasy", "icon", "italic", "large", "larger", "lighter",
                "medium", "menu", "message-box", "monospace", "normal", "oblique", "sans-serif",
                "serif", "small", "small-caps", "small-caption", "smaller", "status-bar",
                "x-large", "x-small", "xx-large", "xx-small", ",", "/",
            ],
            &[],
        ),
    );
    p.insert(
        "font-family",
        prop(
            V::STRING | V::UNRESERVED_WORD,
            &["cursive", "fantasy", "inherit", "monospace", "sans-serif", "serif", ","],
            &[],
        ),
    );
    p.insert(
        "font-size",
        prop(
            V::QUANTITY,
            &[
                "inherit", "large", "larger", "medium", "small", "smaller", "x-large", "x-small",
                "xx-large", "xx-small",
            ],
            &[],
        ),
    );
    p.insert(
        "font-stretch",
        prop(
            NONE,
            &[
                "condensed",
                "expanded",
                "extra-condensed",
                "extra-expanded",
                "narrower",
                "normal",
                "semi-condensed",
                "semi-expanded",
                "ultra-condensed",
                "ultra-expanded",
                "wider",
            ],
            &[],
        ),
    );
    p.insert(
        "font-style",
        prop(NONE, &["inherit", "italic", "normal", "oblique"], &[]),
    );
    p.insert(
        "font-variant",
        prop(NONE, &["inherit", "normal", "small-caps"], &[]),
    );
    p.insert(
        "font-weight",
        prop(
            NONE,
            &[
                "100", "200", "300", "400", "500", "600", "700", "800", "900", "bold", "bolder",
                "inherit", "lighter", "normal",
            ],
            &[],
        ),
    );
    p.insert(
        "letter-spacing",
        prop(V::QUANTITY | V::NEGATIVE, &["inherit", "normal"], &[]),
    );
    p.insert(
        "word-spacing",
        prop(V::QUANTITY | V::NEGATIVE, &["inherit", "normal"], &[]),
    );
    p.insert("line-height", prop(V::QUANTITY, &["inherit", "normal"], &[]));
    p.insert(
        "quotes",
        prop(V::STRING, &["inherit", "none"], &[]),
    );
    p.insert(
        "text-align",
        prop(NONE, &["center", "inherit", "justify", "left", "right"], &[]),
    );
    p.insert(
        "text-decoration",
        prop(
            NONE,
            &["blink", "inherit", "line-through", "none", "overline", "underline"],
            &[],
        ),
    );
    p.insert("text-indent", prop(V::QUANTITY | V::NEGATIVE, &["inherit"], &[]));
    p.insert(
        "text-overflow",
        prop(V::STRING, &["clip", "ellipsis"], &[]),
    );
    p.insert(
        "text-transform",
        prop(
            NONE,
            &["capitalize", "inherit", "lowercase", "none", "uppercase"],
            &[],
        ),
    );
    p.insert(
        "text-wrap",
        prop(NONE, &["none", "normal", "suppress", "unrestricted"], &[]),
    );
    p.insert(
        "text-shadow",
        prop(
            V::QUANTITY | V::NEGATIVE | V::HASH_VALUE,
            &{
                let mut lits = colors.to_vec();
                lits.extend_from_slice(&["none", ","]);
                lits
            },
            color_fns,
        ),
    );
    p.insert(
        "box-shadow",
        prop(
            V::QUANTITY | V::NEGATIVE | V::HASH_VALUE,
            &{
                let mut lits = colors.to_vec();
                lits.extend_from_slice(&["inset", "none", ","]);
                lits
            },
            color_fns,
        ),
    );
    p.insert(
        "unicode-bidi",
        prop(NONE, &["bidi-override", "embed", "inherit", "normal"], &[]),
    );
    p.insert("unicode-range", prop(V::UNICODE_RANGE, &[], &[]));
    p.insert(
        "white-space",
        prop(
            NONE,
            &["inherit", "normal", "nowrap", "pre", "pre-line", "pre-wrap"],
            &[],
        ),
    );
    p.insert(
        "word-wrap",
        prop(NONE, &["break-word", "normal"], &[]),
    );
    p.insert(
        "vertical-align",
        prop(
            V::QUANTITY | V::NEGATIVE,
            &[
                "baseline",
                "bottom",
                "inherit",
                "middle",
                "sub",
                "super",
                "text-bottom",
                "text-top",
                "top",
            ],
            &[],
        ),
    );

    // Layout.
    p.insert("caption-side", prop(NONE, &["bottom", "inherit", "top"], &[]));
    p.insert("clear", prop(NONE, &["both", "inherit", "left", "none", "right"], &[]));
    p.insert("clip", prop(NONE, &["auto", "inherit"], &[("rect", "rect()")]));
    p.insert(
        "cursor",
        prop(
            NONE,
            &[
                "auto",
                "crosshair",
                "default",
                "e-resize",
                "help",
                "inherit",
                "move",
                "n-resize",
                "ne-resize",
                "nw-resize",
                "pointer",
                "progress",
                "s-resize",
                "se-resize",
                "sw-resize",
                "text",
                "w-resize",
                "wait",
            ],
            &[],
        ),
    );
    p.insert(
        "display",
        prop(
            NONE,
            &[
                "block",
                "compact",
                "flex",
                "grid",
                "inherit",
                "inline",
                "inline-block",
                "inline-flex",
                "inline-grid",
                "inline-table",
                "list-item",
                "none",
                "run-in",
                "table",
                "table-caption",
                "table-cell",
                "table-column",
                "table-column-group",
                "table-footer-group",
                "table-header-group",
                "table-row",
                "table-row-group",
            ],
            &[],
        ),
    );
    p.insert("empty-cells", prop(NONE, &["hide", "inherit", "show"], &[]));
    p.insert("float", prop(NONE, &["inherit", "left", "none", "right"], &[]));
    p.insert(
        "list-style",
        prop(
            NONE,
            &[
                "armenian",
                "circle",
                "decimal",
                "decimal-leading-zero",
                "disc",
                "georgian",
                "inherit",
                "inside",
                "lower-alpha",
                "lower-greek",
                "lower-latin",
                "lower-roman",
                "none",
                "outside",
                "square",
                "upper-alpha",
                "upper-latin",
                "upper-roman",
            ],
            &[],
        ),
    );
    p.insert(
        "list-style-position",
        prop(NONE, &["inherit", "inside", "outside"], &[]),
    );
    p.insert(
        "list-style-type",
        prop(
            NONE,
            &[
                "armenian",
                "circle",
                "decimal",
                "decimal-leading-zero",
                "disc",
                "georgian",
                "inherit",
                "lower-alpha",
                "lower-greek",
                "lower-latin",
                "lower-roman",
                "none",
                "square",
                "upper-alpha",
                "upper-latin",
                "upper-roman",
            ],
            &[],
        ),
    );
    p.insert("opacity", prop(V::QUANTITY, &["inherit"], &[]));
    p.insert(
        "overflow",
        prop(NONE, &["auto", "hidden", "inherit", "scroll", "visible"], &[]),
    );
    p.insert("overflow-x", prop(NONE, &["auto", "hidden", "no-content", "no-display", "scroll", "visible"], &[]));
    p.insert("overflow-y", prop(NONE, &["auto", "hidden", "no-content", "no-display", "scroll", "visible"], &[]));
    p.insert("table-layout", prop(NONE, &["auto", "fixed", "inherit"], &[]));
    p.insert(
        "visibility",
        prop(NONE, &["collapse", "hidden", "inherit", "visible"], &[]),
    );
    p.insert("direction", prop(NONE, &["inherit", "ltr", "rtl"], &[]));

    p
}

lazy_static! {
    static ref DEFAULT_SCHEMA: CssSchema = CssSchema {
        properties: build_default(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_whitelist_basics() {
        let schema = CssSchema::default_whitelist();

        let color = schema.property("color").unwrap();

        assert!(color.classes.contains(ValueClasses::HASH_VALUE));
        assert!(color.literals.contains("red"));
        assert_eq!(color.functions.get("rgb"), Some(&"rgb()"));

        assert!(schema.property("behavior").is_none());
        assert!(schema.property("expression").is_none());
    }

    #[test]
    fn vendor_prefix_stripping() {
        let schema = CssSchema::default_whitelist();

        assert!(schema.property("-webkit-border-radius").is_some());
        assert!(schema.property("-moz-opacity").is_some());
        assert!(schema.property("-webkit-expression").is_none());
        assert!(schema.property("-unknown-color").is_none());
    }

    #[test]
    fn subset_schema() {
        let schema = CssSchema::with_properties(&["color", "font-family"]).unwrap();

        assert!(schema.property("color").is_some());
        assert!(schema.property("margin").is_none());
        // Function sub-schemas ride along.
        assert!(schema.function_schema("rgb()").is_some());
    }

    #[test]
    fn unknown_property_is_a_construction_error() {
        let err = CssSchema::with_properties(&["color", "behavior"]).unwrap_err();

        assert_eq!(err, UnknownCssPropertyError("behavior".to_string()));
    }
}
