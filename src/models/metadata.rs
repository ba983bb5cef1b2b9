use serde::Serialize;

/// Descriptive metadata recovered for a document
///
/// Filled from a search record or an OAI-PMH EAD record, whichever the
/// resolver reached. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    /// OAI-PMH identifier or search record id
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub unitid: Option<String>,
    pub date: Option<String>,
    pub repository: Option<String>,
    pub description: Option<String>,
    pub hierarchy: Vec<String>,
    pub note: Option<String>,
    pub datestamp: Option<String>,
    pub iiif_manifest: Option<String>,
    pub iiif_image: Option<String>,
    /// Viewer (text) link
    pub nad_link: Option<String>,
}

impl DocumentMetadata {
    /// Label/value pairs of the populated fields, in display order
    pub fn display_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Title", &self.title),
            ("Unit ID", &self.unitid),
            ("Date", &self.date),
            ("Repository", &self.repository),
            ("Description", &self.description),
            ("Note", &self.note),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
