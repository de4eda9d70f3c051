//! Office Open XML helpers shared by the workbook, styles and relationship parts.
use crate::error::DecodeError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Loads worksheet relationships, mapping relationship IDs to part paths.
///
/// A missing relationships part yields an empty map.
pub(super) fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<HashMap<String, String>, DecodeError> {
    let mut relationships: HashMap<String, String> = HashMap::new();
    let mut reader = match zip.xml_reader(path)? {
        Some(reader) => reader,
        None => return Ok(relationships),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheets; chartsheets and dialog sheets hold no cells
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps each cell style (`xf`) to the cell type implied by its number format.
pub(super) fn load_number_formats(
    format_indexes: Vec<String>,
    custom_formats: HashMap<String, CellType>,
    is_1904: bool,
) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Resolves a relationship target to a path inside the archive.
pub(crate) fn to_zip_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_owned()
    } else if path.starts_with("xl/") {
        path
    } else {
        let mut parts: Vec<&str> = vec!["xl"];
        for segment in path.split('/') {
            match segment {
                "" | "." => (),
                ".." => {
                    parts.pop();
                }
                segment => parts.push(segment),
            }
        }
        parts.join("/")
    }
}
