//! The read-only context magic-variable patterns resolve against
//! (`spec.md` §4.C10).

use rde_protocol::InvoiceDocument;
use rde_schema::MetadataDocument;

/// Everything a `${...}` pattern may draw from. Borrowed, not owned: the
/// substitution pass runs once per tile against the shared `invoice_org`
/// and `metadata.json`, neither of which the engine mutates.
pub struct MagicContext<'a> {
    /// Raw file name of the tile's first input file.
    pub filename: Option<&'a str>,
    pub invoice_org: &'a InvoiceDocument,
    pub metadata: Option<&'a MetadataDocument>,
}

impl<'a> MagicContext<'a> {
    pub fn new(
        filename: Option<&'a str>,
        invoice_org: &'a InvoiceDocument,
        metadata: Option<&'a MetadataDocument>,
    ) -> Self {
        Self {
            filename,
            invoice_org,
            metadata,
        }
    }
}
