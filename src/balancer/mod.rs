//! The tag balancer: a pass-through stream filter that turns an
//! arbitrarily ill-nested event sequence into a balanced, well-nested one
//! consistent with the element containment table.
//!
//! The balancer keeps a real open-element stack (unlike a full tree
//! builder it holds no nodes, only descriptors) plus a resume queue of
//! formatting elements that were implicitly closed and may be reopened
//! once the content model permits, which models the HTML5 adoption
//! agency.

use crate::events::{Attr, HtmlStreamReceiver};
use crate::html::{is_header_name, ElementGroups, ElementIdx, Scopes, ELEMENTS};
use failure::Fail;
use std::collections::VecDeque;

#[derive(Fail, Debug, PartialEq)]
pub enum NestingLimitError {
    #[fail(display = "Nesting limit must be a positive integer.")]
    Zero,
    #[fail(
        display = "Nesting limit of {} is below the current open-element depth of {}.",
        limit, depth
    )]
    BelowCurrentDepth { limit: usize, depth: usize },
}

struct OpenElement {
    element: ElementIdx,
    /// False for elements opened past the nesting limit: they are
    /// tracked for balance but produce no output events.
    emitted: bool,
    /// Original attributes, kept only for resumable elements so a resume
    /// reopens the element as written.
    attrs: Vec<Attr>,
}

struct ResumeEntry {
    element: ElementIdx,
    attrs: Vec<Attr>,
}

enum CloseTarget {
    Found(usize),
    Blocked,
    Absent,
}

pub struct TagBalancer<R: HtmlStreamReceiver> {
    receiver: R,
    stack: Vec<OpenElement>,
    resume_queue: VecDeque<ResumeEntry>,
    nesting_limit: usize,
}

impl<R: HtmlStreamReceiver> TagBalancer<R> {
    pub fn new(receiver: R) -> Self {
        TagBalancer {
            receiver,
            stack: Vec::new(),
            resume_queue: VecDeque::new(),
            nesting_limit: usize::max_value(),
        }
    }

    pub fn with_nesting_limit(receiver: R, limit: usize) -> Result<Self, NestingLimitError> {
        let mut balancer = TagBalancer::new(receiver);

        balancer.set_nesting_limit(limit)?;

        Ok(balancer)
    }

    /// Changes the nesting limit. Fails synchronously when the stack is
    /// already deeper than the new limit; this is the only way the
    /// balancer can fail.
    pub fn set_nesting_limit(&mut self, limit: usize) -> Result<(), NestingLimitError> {
        if limit == 0 {
            return Err(NestingLimitError::Zero);
        }

        if self.stack.len() > limit {
            return Err(NestingLimitError::BelowCurrentDepth {
                limit,
                depth: self.stack.len(),
            });
        }

        self.nesting_limit = limit;

        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.receiver
    }

    /// Whether the current stack admits a child with the given type bits,
    /// taking transparency into account: a transparent top defers to its
    /// ancestors, and an exhausted stack admits everything.
    fn admits(&self, child_types: ElementGroups) -> bool {
        for open in self.stack.iter().rev() {
            let desc = ELEMENTS.descriptor(open.element);

            if desc.contents.intersects(child_types) {
                return true;
            }

            if !desc.transparent_to_contents.intersects(child_types) {
                return false;
            }
        }

        true
    }

    /// Reopens queued formatting elements, front first, while the stack
    /// admits them and they admit the incoming child.
    fn drain_resume_queue(&mut self, child_types: ElementGroups) {
        while let Some(front) = self.resume_queue.front() {
            let desc = ELEMENTS.descriptor(front.element);

            if self.admits(desc.types) && desc.contains(child_types) {
                let entry = self.resume_queue.pop_front().unwrap();

                self.emit_open(entry.element, entry.attrs);
            } else {
                break;
            }
        }
    }

    /// Opens implied children or pops incompatible elements until the
    /// stack admits the child. Popped resumable elements queue for
    /// resumption, outermost first, so their relative nesting survives a
    /// later resume.
    fn make_room_for(&mut self, child_types: ElementGroups) {
        let mut popped_resumable = Vec::new();

        loop {
            if self.stack.is_empty() || self.admits(child_types) {
                break;
            }

            let top = ELEMENTS.descriptor(self.stack.last().unwrap().element);

            if let Some(implied) = top.block_container_child {
                let implied_desc = ELEMENTS.descriptor(implied);

                if implied_desc.contains(child_types) && top.contains(implied_desc.types) {
                    self.emit_open(implied, Vec::new());
                    continue;
                }
            }

            if let Some(entry) = self.pop_top() {
                popped_resumable.push(entry);
            }
        }

        for entry in popped_resumable.into_iter().rev() {
            self.resume_queue.push_back(entry);
        }
    }

    /// Emits an open event and pushes non-void elements. Opens past the
    /// nesting limit are tracked but produce no output.
    fn emit_open(&mut self, idx: ElementIdx, attrs: Vec<Attr>) {
        let desc = ELEMENTS.descriptor(idx);
        let suppressed = self.stack.len() >= self.nesting_limit;

        if desc.is_void {
            if !suppressed {
                self.receiver.open_tag(desc.name, attrs);
            }

            return;
        }

        let kept_attrs = if desc.resumable {
            attrs.clone()
        } else {
            Vec::new()
        };

        if !suppressed {
            self.receiver.open_tag(desc.name, attrs);
        }

        self.stack.push(OpenElement {
            element: idx,
            emitted: !suppressed,
            attrs: kept_attrs,
        });
    }

    /// Pops and closes the top element; returns it as a resume entry if
    /// it is an emitted resumable element.
    fn pop_top(&mut self) -> Option<ResumeEntry> {
        let top = self.stack.pop()?;
        let desc = ELEMENTS.descriptor(top.element);

        if top.emitted {
            self.receiver.close_tag(desc.name);

            if desc.resumable {
                return Some(ResumeEntry {
                    element: top.element,
                    attrs: top.attrs,
                });
            }
        }

        None
    }

    /// Locates the stack instance a close tag refers to, applying the
    /// in-scope predicate: intervening elements whose scopes overlap the
    /// target's blocked set trap the search.
    fn find_close_target(&self, idx: ElementIdx, header: bool) -> CloseTarget {
        let target = ELEMENTS.descriptor(idx);
        let mut blockers = Scopes::empty();

        for (i, open) in self.stack.iter().enumerate().rev() {
            let desc = ELEMENTS.descriptor(open.element);

            let matches = if header {
                is_header_name(desc.name)
            } else {
                open.element == idx
            };

            if matches {
                if blockers.intersects(target.blocked_by_scopes) {
                    return CloseTarget::Blocked;
                }

                return CloseTarget::Found(i);
            }

            blockers |= desc.in_scopes;
        }

        CloseTarget::Absent
    }
}

impl<R: HtmlStreamReceiver> HtmlStreamReceiver for TagBalancer<R> {
    fn open_document(&mut self) {
        self.stack.clear();
        self.resume_queue.clear();
        self.receiver.open_document();
    }

    fn open_tag(&mut self, name: &str, attrs: Vec<Attr>) {
        let idx = match ELEMENTS.get(name) {
            Some(idx) => idx,
            None => {
                // Unknown element: no containment data. Emitted as-is and
                // treated as void for stack purposes.
                self.receiver.open_tag(name, attrs);
                return;
            }
        };

        let child_types = ELEMENTS.descriptor(idx).types;

        self.drain_resume_queue(child_types);
        self.make_room_for(child_types);
        self.emit_open(idx, attrs);
    }

    fn close_tag(&mut self, name: &str) {
        let idx = match ELEMENTS.get(name) {
            Some(idx) => idx,
            None => {
                // Unknown close tags are forwarded verbatim.
                self.receiver.close_tag(name);
                return;
            }
        };

        let header = is_header_name(name);

        match self.find_close_target(idx, header) {
            CloseTarget::Found(i) => {
                let mut popped_resumable = Vec::new();

                while self.stack.len() > i + 1 {
                    if let Some(entry) = self.pop_top() {
                        popped_resumable.push(entry);
                    }
                }

                // The target itself closes for good and never resumes.
                if let Some(target) = self.stack.pop() {
                    if target.emitted {
                        self.receiver
                            .close_tag(ELEMENTS.descriptor(target.element).name);
                    }
                }

                for entry in popped_resumable.into_iter().rev() {
                    self.resume_queue.push_back(entry);
                }
            }
            CloseTarget::Blocked => {
                // Out of scope: silently dropped.
            }
            CloseTarget::Absent => {
                // A close for a formatting element that only lives in the
                // resume queue cancels the queued resume, mirroring the
                // adoption agency's formatting-list removal.
                if ELEMENTS.descriptor(idx).resumable {
                    if let Some(pos) = self
                        .resume_queue
                        .iter()
                        .rposition(|entry| entry.element == idx)
                    {
                        self.resume_queue.remove(pos);
                    }
                }
            }
        }
    }

    fn text(&mut self, chars: &str) {
        // Pure inter-element whitespace flows through without touching
        // the content model.
        if crate::base::strings::is_all_html_ws(chars) {
            self.receiver.text(chars);
            return;
        }

        let text_types = ELEMENTS.text().types;

        self.drain_resume_queue(text_types);
        self.make_room_for(text_types);
        self.receiver.text(chars);
    }

    /// Unwinds the stack, outermost close last.
    fn close_document(&mut self) {
        while !self.stack.is_empty() {
            self.pop_top();
        }

        self.resume_queue.clear();
        self.receiver.close_document();
    }
}
