//! Flattening of a parsed feed into records
//!
//! The traversal contract is fixed:
//!
//! - entries are the outermost elements named after the first configured
//!   candidate that occurs below the document element;
//! - inside an entry, attribute `a` of the node at path `p` becomes `p.@a`,
//!   a leaf child `c` becomes `p.c`, siblings sharing a name are indexed as
//!   `c[0]`, `c[1]`, ..., and text beside child elements becomes `p.#text`;
//! - a record id comes from the first configured id field holding a value,
//!   otherwise `{entry}-{position}` in document order.
//!
//! Any composed name produced twice within one entry is a shape error.

use crate::feed::document::{RawDocument, XmlNode};
use crate::types::{FieldValue, Record, Snapshot};
use crate::{FeedCacheError, Result};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Settings that drive flattening
#[derive(Debug, Clone)]
pub struct FlattenSettings {
    /// Candidate entry element names, tried in order
    pub entry_elements: Vec<String>,
    /// Field names carrying a natural id, tried in order
    pub id_fields: Vec<String>,
    /// Maximum number of records kept
    pub max_records: usize,
}

/// Find the catalogue entries of a document
///
/// Returns the matched element name with its outermost occurrences in
/// document order.
pub fn locate_entries<'a>(
    root: &'a XmlNode,
    candidates: &'a [String],
) -> Result<(&'a str, Vec<&'a XmlNode>)> {
    for candidate in candidates.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let mut found = Vec::new();
        for child in &root.children {
            collect_named(child, candidate, &mut found);
        }
        if !found.is_empty() {
            return Ok((candidate, found));
        }
    }

    Err(FeedCacheError::shape(format!(
        "no entry element found below <{}>; expected one of: {}",
        root.name,
        candidates.join(", ")
    )))
}

fn collect_named<'a>(node: &'a XmlNode, name: &str, found: &mut Vec<&'a XmlNode>) {
    if node.name == name {
        found.push(node);
        return;
    }
    for child in &node.children {
        collect_named(child, name, found);
    }
}

/// Flatten one entry element into primitive fields
pub fn flatten_entry(entry: &XmlNode) -> Result<IndexMap<String, FieldValue>> {
    let mut fields = IndexMap::new();
    flatten_node(entry, "", &mut fields)?;
    Ok(fields)
}

fn flatten_node(
    node: &XmlNode,
    path: &str,
    fields: &mut IndexMap<String, FieldValue>,
) -> Result<()> {
    for (key, value) in &node.attributes {
        insert(fields, join(path, &format!("@{}", key)), value)?;
    }

    if node.children.is_empty() {
        if path.is_empty() {
            if !node.text.is_empty() {
                insert(fields, "#text".to_string(), &node.text)?;
            }
        } else if !node.text.is_empty() || node.attributes.is_empty() {
            insert(fields, path.to_string(), &node.text)?;
        }
        return Ok(());
    }

    if !node.text.is_empty() {
        insert(fields, join(path, "#text"), &node.text)?;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in &node.children {
        *counts.entry(child.name.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for child in &node.children {
        let name = child.name.as_str();
        let segment = if counts.get(name).copied().unwrap_or(0) > 1 {
            let index = seen.entry(name).or_default();
            let segment = format!("{}[{}]", name, index);
            *index += 1;
            segment
        } else {
            name.to_string()
        };
        flatten_node(child, &join(path, &segment), fields)?;
    }

    Ok(())
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn insert(fields: &mut IndexMap<String, FieldValue>, name: String, text: &str) -> Result<()> {
    if fields.contains_key(&name) {
        return Err(FeedCacheError::shape(format!(
            "ambiguous field name '{}' within one entry",
            name
        )));
    }
    fields.insert(name, FieldValue::infer(text));
    Ok(())
}

/// Turn a parsed document into a snapshot
pub fn build_snapshot(
    document: &RawDocument,
    settings: &FlattenSettings,
    source: &str,
) -> Result<Snapshot> {
    let (entry_name, entries) = locate_entries(document.root(), &settings.entry_elements)?;
    let total_entries = entries.len();

    if total_entries > settings.max_records {
        warn!(
            "Feed has {} <{}> entries; keeping the first {}",
            total_entries, entry_name, settings.max_records
        );
    }

    let mut used: HashSet<String> = HashSet::with_capacity(total_entries.min(settings.max_records));
    let mut records = Vec::with_capacity(total_entries.min(settings.max_records));

    for (position, entry) in entries.into_iter().enumerate().take(settings.max_records) {
        let fields = flatten_entry(entry)?;
        let positional = format!("{}-{}", entry_name, position);

        let natural = settings
            .id_fields
            .iter()
            .filter_map(|name| fields.get(name))
            .map(|value| value.to_string().trim().to_string())
            .find(|value| !value.is_empty());

        let base = match natural {
            Some(id) if !used.contains(&id) => id,
            Some(id) => {
                debug!(
                    "Duplicate id '{}' at <{}> position {}; using positional id",
                    id, entry_name, position
                );
                positional
            }
            None => positional,
        };

        let id = unique_id(base, &used);
        used.insert(id.clone());
        records.push(Record::new(id, entry_name, fields));
    }

    Ok(Snapshot::new(records, total_entries, source))
}

fn unique_id(base: String, used: &HashSet<String>) -> String {
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}~{}", base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn settings(max_records: usize) -> FlattenSettings {
        FlattenSettings {
            entry_elements: vec!["product".to_string(), "item".to_string()],
            id_fields: vec!["id".to_string(), "@id".to_string()],
            max_records,
        }
    }

    fn snapshot(xml: &str, max_records: usize) -> Result<Snapshot> {
        let document = RawDocument::parse(xml)?;
        build_snapshot(&document, &settings(max_records), "test")
    }

    #[test]
    fn test_flatten_composes_field_names() {
        let doc = RawDocument::parse(
            r#"<p sku="A1">
                 <name>Rioja</name>
                 <price currency="EUR">12.5</price>
                 <image src="a.jpg"/>
                 <tag>red</tag><tag>dry</tag>
                 <region><country>ES</country><area>La Rioja</area></region>
                 <note/>
               </p>"#,
        )
        .unwrap();

        let fields = flatten_entry(doc.root()).unwrap();
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "@sku",
                "name",
                "price.@currency",
                "price",
                "image.@src",
                "tag[0]",
                "tag[1]",
                "region.country",
                "region.area",
                "note",
            ]
        );
        assert_eq!(fields["price"], FieldValue::Float(12.5));
        assert_eq!(fields["note"], FieldValue::Text(String::new()));
    }

    #[test]
    fn test_flatten_indexes_repeated_substructures() {
        let doc = RawDocument::parse(
            "<p><v><size>S</size></v><v><size>M</size></v>text</p>",
        )
        .unwrap();
        let fields = flatten_entry(doc.root()).unwrap();
        assert_eq!(fields["#text"].to_string(), "text");
        assert_eq!(fields["v[0].size"].to_string(), "S");
        assert_eq!(fields["v[1].size"].to_string(), "M");
    }

    #[test]
    fn test_flatten_rejects_ambiguous_names() {
        let doc = RawDocument::parse("<p><a.b>1</a.b><a><b>2</b></a></p>").unwrap();
        assert_matches!(flatten_entry(doc.root()), Err(FeedCacheError::Shape { .. }));
    }

    #[test]
    fn test_natural_and_synthesized_ids() {
        let snap = snapshot(
            r#"<catalog>
                 <product><id>42</id><name>Rioja Reserva</name></product>
                 <product id="7"><name>Albariño</name></product>
                 <product><name>Unnamed</name></product>
               </catalog>"#,
            10,
        )
        .unwrap();

        let ids: Vec<&str> = snap.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "7", "product-2"]);
        assert_eq!(snap.records()[0].entry, "product");
    }

    #[test]
    fn test_duplicate_natural_ids_fall_back_to_position() {
        let snap = snapshot(
            "<c><product><id>1</id></product><product><id>1</id></product></c>",
            10,
        )
        .unwrap();
        let ids: Vec<&str> = snap.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "product-1"]);
    }

    #[test]
    fn test_positional_collision_gets_suffix() {
        let snap = snapshot(
            "<c><product><id>product-1</id></product><product/></c>",
            10,
        )
        .unwrap();
        let ids: Vec<&str> = snap.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["product-1", "product-1~2"]);
    }

    #[test]
    fn test_ids_are_stable_across_reparse() {
        let xml = "<c><product><name>a</name></product><product><name>b</name></product></c>";
        let first = snapshot(xml, 10).unwrap();
        let second = snapshot(xml, 10).unwrap();
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_ingest_cap_keeps_earliest_entries() {
        let snap = snapshot(
            "<c><product><id>a</id></product><product><id>b</id></product><product><id>c</id></product></c>",
            2,
        )
        .unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.total_entries(), 3);
        assert!(snap.is_truncated());
        assert_eq!(snap.records()[0].id, "a");
        assert_eq!(snap.records()[1].id, "b");
    }

    #[test]
    fn test_candidate_order_and_nested_entries() {
        // `product` is tried first; nested <product> belongs to its outer entry.
        let snap = snapshot(
            "<rss><channel><item><t>x</t></item><product><product><t>y</t></product></product></channel></rss>",
            10,
        )
        .unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.records()[0].fields["product.t"].to_string(), "y");

        let snap = snapshot("<rss><channel><item/><item/></channel></rss>", 10).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.records()[0].entry, "item");
    }

    #[test]
    fn test_missing_entries_is_shape_error() {
        assert_matches!(
            snapshot("<catalog><thing/></catalog>", 10),
            Err(FeedCacheError::Shape { .. })
        );
        // The document element itself never counts as an entry.
        assert_matches!(
            snapshot("<product><id>1</id></product>", 10),
            Err(FeedCacheError::Shape { .. })
        );
    }

    #[test]
    fn test_fields_are_primitive() {
        let snap = snapshot(
            "<c><product a='1'><x><y><z>deep</z></y></x><flag>true</flag></product></c>",
            10,
        )
        .unwrap();
        let record = &snap.records()[0];
        assert_eq!(record.fields["x.y.z"].to_string(), "deep");
        assert_eq!(record.fields["flag"], FieldValue::Bool(true));
        assert_eq!(record.fields["@a"], FieldValue::Integer(1));
        let json = serde_json::to_value(&record.fields).unwrap();
        assert!(json
            .as_object()
            .unwrap()
            .values()
            .all(|v| !v.is_object() && !v.is_array()));
    }
}
