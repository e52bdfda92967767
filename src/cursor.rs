use crate::document::{Document, Mask, StyledPath};
use crate::elements;
use crate::error::{ErrorMode, Result, SvgError};
use crate::paint::Gradient;
use crate::path::Path;
use crate::style::{PathStyle, StyleScope, style_pairs};
use crate::tokens::Token;
use crate::units::{Axis, resolve_length};

/// An element captured inside `<defs>`, replayed by `<use>`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Definition {
    Element {
        tag: String,
        id: String,
        attrs: Vec<(String, String)>,
    },
    /// Closes the innermost replayed `<g>`.
    EndGroup,
}

impl Definition {
    fn id(&self) -> &str {
        match self {
            Definition::Element { id, .. } => id,
            Definition::EndGroup => "",
        }
    }
}

/// Parse state for one document.
pub(crate) struct Cursor {
    mode: ErrorMode,
    max_use_depth: usize,
    pub(crate) doc: Document,
    /// Never empty: the bottom frame is the default style.
    styles: Vec<PathStyle>,
    /// Geometry produced by the running element handler.
    pub(crate) path: Path,
    /// Coordinate offset of the `<use>` elements being replayed.
    pub(crate) offset: (f64, f64),
    use_depth: usize,
    pub(crate) gradient: Option<Gradient>,
    pub(crate) mask: Option<Mask>,
    pub(crate) in_title: bool,
    pub(crate) in_desc: bool,
    pub(crate) in_grad: bool,
    pub(crate) in_defs: bool,
    pub(crate) in_mask: bool,
    pending_defs: Vec<Definition>,
    seen_element: bool,
}

impl Cursor {
    pub(crate) fn new(mode: ErrorMode, max_use_depth: usize) -> Self {
        Self {
            mode,
            max_use_depth,
            doc: Document::default(),
            styles: vec![PathStyle::default()],
            path: Path::new(),
            offset: (0.0, 0.0),
            use_depth: 0,
            gradient: None,
            mask: None,
            in_title: false,
            in_desc: false,
            in_grad: false,
            in_defs: false,
            in_mask: false,
            pending_defs: Vec::new(),
            seen_element: false,
        }
    }

    pub(crate) fn run(mut self, tokens: Vec<Token>) -> Result<Document> {
        for token in tokens {
            match token {
                Token::Start { name, attrs } => self.start_element(&name, attrs)?,
                Token::End { name } => self.end_element(&name),
                Token::Text(text) => self.text(&text),
            }
        }
        if !self.seen_element {
            return Err(SvgError::EmptyDocument);
        }
        log::debug!(
            "parsed {} paths, {} masks, {} gradients, {} definitions",
            self.doc.paths.len(),
            self.doc.masks.len(),
            self.doc.gradients.len(),
            self.doc.defs.len()
        );
        Ok(self.doc)
    }

    pub(crate) fn style(&self) -> &PathStyle {
        // the stack always holds the default frame
        &self.styles[self.styles.len() - 1]
    }

    pub(crate) fn length(&self, raw: &str, axis: Axis) -> Result<f64> {
        resolve_length(raw, axis, &self.doc.view_box)
    }

    /// Applies the error mode to a mode-governed error. Anything else is
    /// returned unchanged.
    pub(crate) fn tolerate(&mut self, err: SvgError) -> Result<()> {
        if err.is_always_fatal() {
            return Err(err);
        }
        match self.mode {
            ErrorMode::Strict => Err(err),
            ErrorMode::Warn => {
                log::warn!("{}", err);
                self.doc.warnings.push(err.to_string());
                Ok(())
            }
            ErrorMode::Ignore => Ok(()),
        }
    }

    fn push_style(&mut self, attrs: &[(String, String)]) -> Result<()> {
        let mut style = self.style().clone();
        for (name, value) in style_pairs(attrs) {
            let scope = StyleScope {
                view_box: self.doc.view_box,
                gradients: &self.doc.gradients,
            };
            if let Err(err) = style.apply(&scope, &name, &value) {
                self.tolerate(err)?;
            }
        }
        self.styles.push(style);
        Ok(())
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn start_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> Result<()> {
        self.seen_element = true;
        self.push_style(&attrs)?;

        let executes = elements::is_gradient(tag) || tag == "mask" || self.in_grad || self.in_mask;
        if self.in_defs && !executes {
            self.buffer_definition(tag, attrs);
            return Ok(());
        }
        self.dispatch(tag, &attrs)
    }

    fn buffer_definition(&mut self, tag: &str, attrs: Vec<(String, String)>) {
        let id = attrs
            .iter()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        if !id.is_empty() && !self.pending_defs.is_empty() {
            self.flush_definitions();
        }
        log::trace!("buffering <{}> id='{}'", tag, id);
        self.pending_defs.push(Definition::Element {
            tag: tag.to_string(),
            id,
            attrs,
        });
    }

    fn flush_definitions(&mut self) {
        let batch = std::mem::take(&mut self.pending_defs);
        if let Some(first) = batch.first() {
            let key = first.id().to_string();
            log::debug!("defined '{}' ({} entries)", key, batch.len());
            self.doc.defs.insert(key, batch);
        }
    }

    /// Runs the handler for `tag`, then emits whatever path it produced.
    fn dispatch(&mut self, tag: &str, attrs: &[(String, String)]) -> Result<()> {
        match elements::handler(tag) {
            Some(handler) => handler(self, attrs)?,
            None => self.tolerate(SvgError::UnrecognizedElement(tag.to_string()))?,
        }
        self.flush_path();
        Ok(())
    }

    fn flush_path(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let styled = StyledPath {
            path: self.path.take(),
            style: self.style().clone(),
        };
        if self.in_mask {
            if let Some(mask) = self.mask.as_mut() {
                mask.paths.push(styled);
            }
        } else {
            self.doc.paths.push(styled);
        }
    }

    fn end_element(&mut self, tag: &str) {
        self.pop_style();
        match tag {
            // only groups that were buffered get a marker
            "g" if self.in_defs && !self.in_mask && !self.in_grad => {
                self.pending_defs.push(Definition::EndGroup)
            }
            "mask" => {
                if let Some(mask) = self.mask.take() {
                    self.doc.masks.insert(mask.id.clone(), mask);
                }
                self.in_mask = false;
            }
            "title" => self.in_title = false,
            "desc" => self.in_desc = false,
            "defs" => {
                self.flush_definitions();
                self.in_defs = false;
            }
            t if elements::is_gradient(t) => {
                self.finish_gradient();
                self.in_grad = false;
            }
            _ => {}
        }
    }

    fn finish_gradient(&mut self) {
        let Some(mut grad) = self.gradient.take() else {
            return;
        };
        if grad.stops.is_empty() {
            if let Some(parent) = grad.href.as_deref().and_then(|h| self.doc.gradients.get(h)) {
                grad.stops = parent.stops.clone();
            }
        }
        if grad.id.is_empty() {
            log::debug!("dropping gradient without id");
            return;
        }
        self.doc.gradients.insert(grad.id.clone(), grad);
    }

    fn text(&mut self, text: &str) {
        if self.in_title {
            if let Some(last) = self.doc.titles.last_mut() {
                last.push_str(text);
            }
        }
        if self.in_desc {
            if let Some(last) = self.doc.descriptions.last_mut() {
                last.push_str(text);
            }
        }
    }

    /// Replays the definition batch `id` at an extra offset of `(x, y)`.
    pub(crate) fn replay(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let Some(batch) = self.doc.defs.get(id).cloned() else {
            return Err(SvgError::structural(format!(
                "href id '{}' in use statement was not found in defs",
                id
            )));
        };
        if self.use_depth >= self.max_use_depth {
            return Err(SvgError::structural(format!(
                "use nesting deeper than {} while replaying '{}'",
                self.max_use_depth, id
            )));
        }

        log::trace!("replaying '{}' at ({}, {})", id, x, y);
        let saved_offset = self.offset;
        let depth = self.styles.len();
        self.offset = (saved_offset.0 + x, saved_offset.1 + y);
        self.use_depth += 1;

        let result = self.replay_batch(&batch, depth);

        self.use_depth -= 1;
        self.offset = saved_offset;
        self.styles.truncate(depth);
        result
    }

    fn replay_batch(&mut self, batch: &[Definition], depth: usize) -> Result<()> {
        for def in batch {
            match def {
                Definition::EndGroup => {
                    if self.styles.len() > depth {
                        self.styles.pop();
                    }
                }
                Definition::Element { tag, attrs, .. } => {
                    self.push_style(attrs)?;
                    self.dispatch(tag, attrs)?;
                    if tag != "g" {
                        self.pop_style();
                    }
                }
            }
        }
        Ok(())
    }
}
