//! The element containment table.
//!
//! Every known element is described by an immutable record keyed by its
//! canonical name: the content groups the element belongs to, the groups
//! it may contain, transparency, close-tag scope participation, and the
//! implied child used to repair containment (`<ul>` implies `<li>`,
//! `<tr>` implies `<td>`).
//!
//! Descriptors are stored in a flat vector and addressed by index, so the
//! `block_container_child` cross-references form a graph without needing
//! mutation after construction. The whole table is frozen behind a
//! `lazy_static` and shared by all sanitizations.

use bitflags::bitflags;
use hashbrown::HashMap;
use lazy_static::lazy_static;

bitflags! {
    /// Content groups, in the HTML4 DTD tradition: an element's `types`
    /// say which groups it belongs to, its `contents` which groups it
    /// accepts as children. Containment holds iff the bitfields overlap.
    pub struct ElementGroups: u32 {
        const BLOCK          = 1;
        const INLINE         = 1 << 1;
        const INLINE_MINUS_A = 1 << 2;
        const MIXED          = 1 << 3;
        const TABLE_CONTENT  = 1 << 4;
        const HEAD_CONTENT   = 1 << 5;
        const TOP_CONTENT    = 1 << 6;
        const AREA           = 1 << 7;
        const FORM           = 1 << 8;
        const LEGEND         = 1 << 9;
        const LI             = 1 << 10;
        const DL_PART        = 1 << 11;
        const P              = 1 << 12;
        const OPTIONS        = 1 << 13;
        const OPTION         = 1 << 14;
        const PARAM          = 1 << 15;
        const TABLE          = 1 << 16;
        const TR             = 1 << 17;
        const TD             = 1 << 18;
        const COL            = 1 << 19;
        const CHARACTER_DATA = 1 << 20;

        // Content-model shorthands.
        const PHRASING = Self::INLINE.bits | Self::MIXED.bits | Self::CHARACTER_DATA.bits;
        const PHRASING_MINUS_A =
            Self::INLINE_MINUS_A.bits | Self::MIXED.bits | Self::CHARACTER_DATA.bits;
        const FLOW = Self::BLOCK.bits
            | Self::FORM.bits
            | Self::INLINE.bits
            | Self::MIXED.bits
            | Self::CHARACTER_DATA.bits;
        const FLOW_MINUS_FORM =
            Self::BLOCK.bits | Self::INLINE.bits | Self::MIXED.bits | Self::CHARACTER_DATA.bits;
    }
}

bitflags! {
    /// Close-tag scope classes. An element's `in_scopes` are the scopes
    /// it participates in, both as a searchable target and as a boundary:
    /// a close-tag search for `x` passes an intervening element `e` iff
    /// `e.in_scopes ⊆ x.in_scopes`, i.e. iff `e.in_scopes` does not
    /// overlap `x.blocked_by_scopes`.
    pub struct Scopes: u8 {
        const COMMON    = 1;
        const BUTTON    = 1 << 1;
        const LIST_ITEM = 1 << 2;
        const TABLE     = 1 << 3;

        const ALL = Self::COMMON.bits | Self::BUTTON.bits | Self::LIST_ITEM.bits | Self::TABLE.bits;
    }
}

pub type ElementIdx = usize;

pub struct ElementDescriptor {
    pub name: &'static str,
    pub types: ElementGroups,
    pub contents: ElementGroups,
    pub transparent_to_contents: ElementGroups,
    pub resumable: bool,
    pub block_container_child: Option<ElementIdx>,
    pub in_scopes: Scopes,
    pub blocked_by_scopes: Scopes,
    pub is_void: bool,
}

impl ElementDescriptor {
    /// Whether this element may directly contain a child with the given
    /// type bits (transparency not considered).
    #[inline]
    pub fn contains(&self, child_types: ElementGroups) -> bool {
        self.contents.intersects(child_types)
    }
}

struct Def {
    name: &'static str,
    types: ElementGroups,
    contents: ElementGroups,
    transparent: ElementGroups,
    resumable: bool,
    child: Option<&'static str>,
    scopes: Scopes,
    void: bool,
}

impl Default for Def {
    fn default() -> Self {
        Def {
            name: "",
            types: ElementGroups::empty(),
            contents: ElementGroups::empty(),
            transparent: ElementGroups::empty(),
            resumable: false,
            child: None,
            scopes: Scopes::COMMON,
            void: false,
        }
    }
}

pub struct ElementTable {
    descriptors: Vec<ElementDescriptor>,
    by_name: HashMap<&'static str, ElementIdx>,
    text_idx: ElementIdx,
}

impl ElementTable {
    #[inline]
    pub fn get(&self, name: &str) -> Option<ElementIdx> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn descriptor(&self, idx: ElementIdx) -> &ElementDescriptor {
        &self.descriptors[idx]
    }

    /// The synthetic descriptor used for text events.
    #[inline]
    pub fn text(&self) -> &ElementDescriptor {
        &self.descriptors[self.text_idx]
    }

    fn construct() -> Self {
        use self::ElementGroups as G;

        let inline = G::INLINE | G::INLINE_MINUS_A;

        let formatting = |name| Def {
            name,
            types: inline,
            contents: G::PHRASING,
            resumable: true,
            ..Def::default()
        };

        let phrase = |name| Def {
            name,
            types: inline,
            contents: G::PHRASING,
            ..Def::default()
        };

        let block = |name| Def {
            name,
            types: G::BLOCK,
            contents: G::FLOW,
            ..Def::default()
        };

        let heading = |name| Def {
            name,
            types: G::BLOCK,
            contents: G::PHRASING,
            ..Def::default()
        };

        let inline_void = |name| Def {
            name,
            types: inline,
            void: true,
            ..Def::default()
        };

        let list = |name| Def {
            name,
            types: G::BLOCK,
            contents: G::LI,
            child: Some("li"),
            scopes: Scopes::COMMON | Scopes::LIST_ITEM,
            ..Def::default()
        };

        let row_group = |name| Def {
            name,
            types: G::TABLE_CONTENT,
            contents: G::TR,
            child: Some("tr"),
            scopes: Scopes::COMMON | Scopes::TABLE,
            ..Def::default()
        };

        let head_void = |name| Def {
            name,
            types: G::HEAD_CONTENT,
            void: true,
            ..Def::default()
        };

        let defs = vec![
            // -- Formatting elements subject to adoption-agency resumption.
            Def {
                name: "a",
                types: G::INLINE,
                contents: G::PHRASING_MINUS_A,
                transparent: G::BLOCK,
                resumable: true,
                ..Def::default()
            },
            formatting("b"),
            formatting("big"),
            formatting("code"),
            formatting("em"),
            formatting("font"),
            formatting("i"),
            formatting("nobr"),
            formatting("s"),
            formatting("small"),
            formatting("strike"),
            formatting("strong"),
            formatting("tt"),
            formatting("u"),
            // -- Other phrase-level inline elements.
            phrase("abbr"),
            phrase("acronym"),
            phrase("bdi"),
            phrase("bdo"),
            phrase("cite"),
            phrase("data"),
            phrase("dfn"),
            phrase("kbd"),
            phrase("label"),
            phrase("mark"),
            phrase("meter"),
            phrase("output"),
            phrase("progress"),
            phrase("q"),
            phrase("rb"),
            phrase("rp"),
            phrase("rt"),
            phrase("rtc"),
            phrase("ruby"),
            phrase("samp"),
            phrase("span"),
            phrase("sub"),
            phrase("sup"),
            phrase("time"),
            phrase("var"),
            Def {
                name: "button",
                types: inline,
                contents: G::PHRASING,
                scopes: Scopes::COMMON | Scopes::BUTTON,
                ..Def::default()
            },
            Def {
                name: "canvas",
                types: inline,
                contents: G::PHRASING,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "map",
                types: inline,
                contents: G::PHRASING | G::AREA,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "select",
                types: inline,
                contents: G::OPTIONS,
                child: Some("option"),
                ..Def::default()
            },
            Def {
                name: "datalist",
                types: inline,
                contents: G::PHRASING | G::OPTIONS,
                ..Def::default()
            },
            Def {
                name: "optgroup",
                types: G::OPTIONS,
                contents: G::OPTION,
                ..Def::default()
            },
            Def {
                name: "option",
                types: G::OPTIONS | G::OPTION,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "textarea",
                types: inline,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "iframe",
                types: inline,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "object",
                types: inline,
                contents: G::FLOW | G::PARAM,
                transparent: G::BLOCK,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "applet",
                types: inline,
                contents: G::FLOW | G::PARAM,
                transparent: G::BLOCK,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "marquee",
                types: inline,
                contents: G::FLOW,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "audio",
                types: inline,
                contents: G::PHRASING | G::PARAM,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "video",
                types: inline,
                contents: G::PHRASING | G::PARAM,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "picture",
                types: inline,
                contents: G::PHRASING | G::PARAM,
                ..Def::default()
            },
            inline_void("br"),
            inline_void("embed"),
            inline_void("img"),
            inline_void("input"),
            inline_void("keygen"),
            inline_void("wbr"),
            Def {
                name: "area",
                types: G::AREA,
                void: true,
                ..Def::default()
            },
            Def {
                name: "param",
                types: G::PARAM,
                void: true,
                ..Def::default()
            },
            Def {
                name: "source",
                types: G::PARAM,
                void: true,
                ..Def::default()
            },
            Def {
                name: "track",
                types: G::PARAM,
                void: true,
                ..Def::default()
            },
            // -- Mixed (block-and-inline) elements.
            Def {
                name: "ins",
                types: G::MIXED,
                contents: G::PHRASING,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "del",
                types: G::MIXED,
                contents: G::PHRASING,
                transparent: G::BLOCK,
                ..Def::default()
            },
            Def {
                name: "script",
                types: G::HEAD_CONTENT | G::MIXED,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "comment",
                types: G::MIXED,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            // -- Block-level elements.
            block("article"),
            block("aside"),
            block("blockquote"),
            block("center"),
            block("details"),
            block("dialog"),
            block("div"),
            block("figcaption"),
            block("figure"),
            block("footer"),
            block("header"),
            block("hgroup"),
            block("main"),
            block("nav"),
            block("noframes"),
            block("noscript"),
            block("section"),
            heading("h1"),
            heading("h2"),
            heading("h3"),
            heading("h4"),
            heading("h5"),
            heading("h6"),
            heading("summary"),
            Def {
                name: "p",
                types: G::BLOCK | G::P,
                contents: G::PHRASING,
                ..Def::default()
            },
            Def {
                name: "address",
                types: G::BLOCK,
                contents: G::PHRASING | G::P,
                ..Def::default()
            },
            Def {
                name: "pre",
                types: G::BLOCK,
                contents: G::PHRASING,
                ..Def::default()
            },
            Def {
                name: "listing",
                types: G::BLOCK,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "xmp",
                types: G::BLOCK,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "plaintext",
                types: G::BLOCK,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "hr",
                types: G::BLOCK,
                void: true,
                ..Def::default()
            },
            list("dir"),
            list("menu"),
            list("ol"),
            list("ul"),
            Def {
                name: "li",
                types: G::LI,
                contents: G::FLOW,
                ..Def::default()
            },
            Def {
                name: "dl",
                types: G::BLOCK,
                contents: G::DL_PART,
                child: Some("dd"),
                scopes: Scopes::COMMON | Scopes::LIST_ITEM,
                ..Def::default()
            },
            Def {
                name: "dt",
                types: G::DL_PART,
                contents: G::PHRASING,
                ..Def::default()
            },
            Def {
                name: "dd",
                types: G::DL_PART,
                contents: G::FLOW,
                ..Def::default()
            },
            Def {
                name: "form",
                types: G::FORM,
                contents: G::FLOW_MINUS_FORM,
                ..Def::default()
            },
            Def {
                name: "fieldset",
                types: G::BLOCK,
                contents: G::FLOW | G::LEGEND,
                ..Def::default()
            },
            Def {
                name: "legend",
                types: G::LEGEND,
                contents: G::PHRASING,
                ..Def::default()
            },
            // -- Tables.
            Def {
                name: "table",
                types: G::BLOCK | G::TABLE,
                contents: G::TABLE_CONTENT,
                child: Some("tr"),
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "caption",
                types: G::TABLE_CONTENT,
                contents: G::PHRASING,
                scopes: Scopes::COMMON | Scopes::TABLE,
                ..Def::default()
            },
            Def {
                name: "colgroup",
                types: G::TABLE_CONTENT,
                contents: G::COL,
                child: Some("col"),
                scopes: Scopes::COMMON | Scopes::TABLE,
                ..Def::default()
            },
            Def {
                name: "col",
                types: G::TABLE_CONTENT | G::COL,
                scopes: Scopes::COMMON | Scopes::TABLE,
                void: true,
                ..Def::default()
            },
            row_group("tbody"),
            row_group("tfoot"),
            row_group("thead"),
            Def {
                name: "tr",
                types: G::TABLE_CONTENT | G::TR,
                contents: G::TD,
                child: Some("td"),
                scopes: Scopes::COMMON | Scopes::TABLE,
                ..Def::default()
            },
            Def {
                name: "td",
                types: G::TD,
                contents: G::FLOW,
                scopes: Scopes::COMMON | Scopes::TABLE,
                ..Def::default()
            },
            Def {
                name: "th",
                types: G::TD,
                contents: G::FLOW,
                scopes: Scopes::COMMON | Scopes::TABLE,
                ..Def::default()
            },
            // -- Document structure.
            Def {
                name: "html",
                types: G::TOP_CONTENT,
                contents: G::TOP_CONTENT,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "head",
                types: G::TOP_CONTENT,
                contents: G::HEAD_CONTENT,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "body",
                types: G::TOP_CONTENT,
                contents: G::FLOW,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "frameset",
                types: G::TOP_CONTENT,
                contents: G::TOP_CONTENT | G::BLOCK,
                scopes: Scopes::ALL,
                ..Def::default()
            },
            Def {
                name: "frame",
                types: G::TOP_CONTENT,
                void: true,
                ..Def::default()
            },
            Def {
                name: "title",
                types: G::HEAD_CONTENT,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            Def {
                name: "style",
                types: G::HEAD_CONTENT,
                contents: G::CHARACTER_DATA,
                ..Def::default()
            },
            head_void("base"),
            head_void("basefont"),
            head_void("link"),
            head_void("meta"),
        ];

        let mut by_name = HashMap::with_capacity(defs.len() + 1);

        for (idx, def) in defs.iter().enumerate() {
            let previous = by_name.insert(def.name, idx);

            assert!(previous.is_none(), "duplicate element definition");
        }

        let mut descriptors = Vec::with_capacity(defs.len() + 1);

        for def in &defs {
            let child = def.child.map(|name| {
                *by_name
                    .get(name)
                    .expect("implied child should be a defined element")
            });

            descriptors.push(ElementDescriptor {
                name: def.name,
                types: def.types,
                contents: def.contents,
                transparent_to_contents: def.transparent,
                resumable: def.resumable,
                block_container_child: child,
                in_scopes: def.scopes,
                blocked_by_scopes: Scopes::ALL - def.scopes,
                is_void: def.void,
            });
        }

        // NOTE: synthetic descriptor representing text content; it is not
        // reachable by name and is used by the balancer for text events.
        let text_idx = descriptors.len();

        descriptors.push(ElementDescriptor {
            name: "#text",
            types: ElementGroups::CHARACTER_DATA,
            contents: ElementGroups::empty(),
            transparent_to_contents: ElementGroups::empty(),
            resumable: false,
            block_container_child: None,
            in_scopes: Scopes::COMMON,
            blocked_by_scopes: Scopes::ALL - Scopes::COMMON,
            is_void: true,
        });

        ElementTable {
            descriptors,
            by_name,
            text_idx,
        }
    }
}

lazy_static! {
    pub static ref ELEMENTS: ElementTable = ElementTable::construct();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str) -> &'static ElementDescriptor {
        ELEMENTS.descriptor(ELEMENTS.get(name).unwrap())
    }

    #[test]
    fn basic_containment() {
        assert!(desc("div").contains(desc("p").types));
        assert!(desc("p").contains(desc("b").types));
        assert!(!desc("p").contains(desc("div").types));
        assert!(!desc("ul").contains(desc("p").types));
        assert!(desc("ul").contains(desc("li").types));
    }

    #[test]
    fn a_cannot_nest() {
        assert!(desc("b").contains(desc("a").types));
        assert!(!desc("a").contains(desc("a").types));
        assert!(desc("a").contains(desc("b").types));
    }

    #[test]
    fn form_cannot_nest() {
        assert!(desc("div").contains(desc("form").types));
        assert!(!desc("form").contains(desc("form").types));
        assert!(desc("form").contains(desc("div").types));
    }

    #[test]
    fn table_chain() {
        let table = desc("table");
        let tr = desc("tr");
        let td = desc("td");

        assert!(table.contains(tr.types));
        assert!(!table.contains(td.types));
        assert!(tr.contains(td.types));

        let implied = ELEMENTS.descriptor(table.block_container_child.unwrap());
        assert_eq!(implied.name, "tr");
    }

    #[test]
    fn scope_complement() {
        let li = desc("li");

        assert_eq!(li.in_scopes, Scopes::COMMON);
        assert_eq!(
            li.blocked_by_scopes,
            Scopes::BUTTON | Scopes::LIST_ITEM | Scopes::TABLE
        );

        let table = desc("table");
        assert!(table.blocked_by_scopes.is_empty());
    }

    #[test]
    fn voids() {
        assert!(desc("br").is_void);
        assert!(desc("input").is_void);
        assert!(desc("hr").is_void);
        assert!(!desc("div").is_void);
    }

    #[test]
    fn text_descriptor() {
        assert_eq!(ELEMENTS.text().types, ElementGroups::CHARACTER_DATA);
        assert!(ELEMENTS.get("#text").is_none());
    }
}
