//! System font discovery for label rendering.
//!
//! Labels name a font family; resolution happens lazily through `fontdb` and
//! the decoded `FontArc` is cached per family so repeated layout passes do
//! not re-read font files.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use fontdb::{Database, Family, Query, Source};

/// Family tried when a label does not name one explicitly.
pub const DEFAULT_FONT: &str = "DejaVu Sans";

pub struct FontLibrary {
    db: Database,
    cache: RefCell<HashMap<String, FontArc>>,
}

impl FontLibrary {
    #[must_use]
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        Self {
            db,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Build a library over an explicit font directory instead of the system
    /// font paths. Used by tests and by kiosks that ship their own fonts.
    #[must_use]
    pub fn with_fonts_dir(path: &std::path::Path) -> Self {
        let mut db = Database::new();
        db.load_fonts_dir(path);
        Self {
            db,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a family name to a decoded font, falling back to any sans
    /// serif face and finally to any face at all.
    pub fn resolve(&self, family: &str) -> Result<FontArc> {
        if let Some(font) = self.cache.borrow().get(family) {
            return Ok(font.clone());
        }

        let families = [Family::Name(family), Family::SansSerif];
        let mut resolved = None;
        if let Some(id) = self.db.query(&Query {
            families: &families,
            ..Default::default()
        }) {
            resolved = load_face(&self.db, id)?;
        }

        if resolved.is_none() {
            for face in self.db.faces() {
                if let Some(font) = load_face(&self.db, face.id)? {
                    resolved = Some(font);
                    break;
                }
            }
        }

        let font = resolved
            .ok_or_else(|| crate::error::Error::FontUnavailable(family.to_string()))?;
        self.cache
            .borrow_mut()
            .insert(family.to_string(), font.clone());
        Ok(font)
    }

    /// Whether any face at all is available. Headless test hosts may have
    /// none; callers can skip font-dependent work in that case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let face = db.face(id).context("missing font face in database")?;
    let font = match &face.source {
        Source::Binary(data) => {
            let bytes = data.as_ref().as_ref().to_vec();
            Some(FontArc::try_from_vec(bytes).context("failed to decode font face")?)
        }
        Source::File(path) => {
            let data = fs::read(path)
                .with_context(|| format!("failed to read font at {}", path.display()))?;
            Some(FontArc::try_from_vec(data).context("failed to decode font face")?)
        }
        Source::SharedFile(_, data) => {
            let bytes = data.as_ref().as_ref().to_vec();
            Some(FontArc::try_from_vec(bytes).context("failed to decode font face")?)
        }
    };
    Ok(font)
}
