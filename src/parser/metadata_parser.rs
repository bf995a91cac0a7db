//! Per-frame metadata schema from `MetaFormat/MetaBlock`

use crate::error::{FormatError, Result};
use crate::types::footer::Element;
use crate::types::metadata::{MetaFamily, MetaField, MetaType};
use tracing::debug;

pub const META_BLOCK_PATH: &[&str] = &["SpeFormat", "MetaFormat", "MetaBlock"];

/// Ordered metadata fields, one per distinct (tag, variant) in document
/// order.
///
/// `TimeStamp` and `GateTracking` entries are named by their `event` and
/// `component` attributes; any other tag names a single field, and a
/// repeated tag collapses onto the entry already recorded. Every field must
/// declare a `type`.
pub fn parse_metadata_schema(footer: &Element) -> Result<Vec<MetaField>> {
    let block = footer.select_one(META_BLOCK_PATH)?;
    let block_path = META_BLOCK_PATH.join("/");

    let mut fields: Vec<MetaField> = Vec::new();
    for child in &block.children {
        let at = format!("{block_path}/{}", child.name);
        let family = MetaFamily::from_tag(&child.name);
        let name = match family {
            Some(family) => child
                .attr(family.disambiguator())
                .ok_or_else(|| FormatError::missing(format!("{at}@{}", family.disambiguator())))?
                .to_string(),
            None => child.name.clone(),
        };

        if fields
            .iter()
            .any(|field| field.tag == child.name && field.name == name)
        {
            continue;
        }

        let declared = child
            .attr("type")
            .ok_or_else(|| FormatError::missing(format!("{at}@type")))?;
        fields.push(
            MetaField::builder()
                .name(name)
                .tag(child.name.as_str())
                .maybe_family(family)
                .kind(MetaType::from_declared(declared))
                .build(),
        );
    }

    debug!(
        fields = ?fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        "resolved metadata schema"
    );
    Ok(fields)
}

/// Bytes one metadata record occupies.
pub fn record_size(schema: &[MetaField]) -> usize {
    schema.iter().map(|field| field.kind.size_bytes()).sum()
}
