//! Mutation records → attribute / class events.

use fos_dom::{DOMTokenList, DomTree, MutationRecord, MutationType};

use crate::{
    AddAttributeDetail, ChangeAttributeDetail, ClassNameDetail, DeleteAttributeDetail, EventDetail,
    JsonValue,
};

/// Classify one attribute mutation against the element's current value.
///
/// Yields at most one of added / changed / deleted, followed, for `class`,
/// by class-added and class-deleted events carrying the token diff.
pub fn normalize_mutation(record: &MutationRecord, dom: &DomTree) -> Vec<EventDetail> {
    let mut details = Vec::new();
    let Some(name) = record.attribute_name.as_deref() else {
        return details;
    };
    if record.mutation_type != MutationType::Attributes {
        return details;
    }

    let value = dom.get_attribute(record.target, name);
    let old_value = record.old_value.as_deref();

    match (old_value, value) {
        (_, None) => details.push(EventDetail::DeleteAttribute(DeleteAttributeDetail {
            entry: record.clone(),
            attribute_name: name.to_string(),
            old_value: old_value.map(str::to_string),
            old_value_json: JsonValue::decode(old_value),
        })),
        (None, Some(value)) => details.push(EventDetail::AddAttribute(AddAttributeDetail {
            entry: record.clone(),
            attribute_name: name.to_string(),
            value: value.to_string(),
            value_json: JsonValue::decode(Some(value)),
        })),
        (Some(old), Some(value)) if old != value => {
            details.push(EventDetail::ChangeAttribute(ChangeAttributeDetail {
                entry: record.clone(),
                attribute_name: name.to_string(),
                value: value.to_string(),
                old_value: old.to_string(),
                value_json: JsonValue::decode(Some(value)),
                old_value_json: JsonValue::decode(Some(old)),
            }))
        }
        (Some(_), Some(_)) => {}
    }

    if name == "class" {
        let old_classes = DOMTokenList::from_string(old_value.unwrap_or(""));
        let current_classes = DOMTokenList::from_string(value.unwrap_or(""));
        let added = current_classes.difference(&old_classes);
        let removed = old_classes.difference(&current_classes);

        let class_detail = |changed: Vec<String>| ClassNameDetail {
            entry: record.clone(),
            changed_class_list: changed,
            old_class_list: old_classes.to_vec(),
            current_class_list: current_classes.to_vec(),
            value: value.unwrap_or("").to_string(),
        };
        if !added.is_empty() {
            details.push(EventDetail::AddClassName(class_detail(added)));
        }
        if !removed.is_empty() {
            details.push(EventDetail::DeleteClassName(class_detail(removed)));
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventName;
    use serde_json::json;

    fn names(details: &[EventDetail]) -> Vec<EventName> {
        details.iter().map(EventDetail::event_name).collect()
    }

    fn single_record(dom: &mut DomTree) -> MutationRecord {
        let mut records = dom.take_mutations();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    fn element() -> (DomTree, fos_dom::NodeId) {
        let mut dom = DomTree::new();
        let node = dom.append_element(dom.root(), "div").unwrap();
        dom.take_mutations();
        (dom, node)
    }

    #[test]
    fn test_added_attribute() {
        let (mut dom, node) = element();
        dom.set_attribute(node, "data-count", "3").unwrap();
        let record = single_record(&mut dom);

        let details = normalize_mutation(&record, &dom);
        assert_eq!(names(&details), vec![EventName::AddAttribute]);
        let EventDetail::AddAttribute(detail) = &details[0] else {
            panic!("expected add detail");
        };
        assert_eq!(detail.value_json, JsonValue::Parsed(json!(3)));
        assert_eq!(detail.attribute_name, "data-count");
    }

    #[test]
    fn test_changed_attribute() {
        let (mut dom, node) = element();
        dom.set_attribute(node, "data-x", "\"a\"").unwrap();
        dom.take_mutations();
        dom.set_attribute(node, "data-x", "\"b\"").unwrap();
        let record = single_record(&mut dom);

        let details = normalize_mutation(&record, &dom);
        assert_eq!(names(&details), vec![EventName::ChangeAttribute]);
        let EventDetail::ChangeAttribute(detail) = &details[0] else {
            panic!("expected change detail");
        };
        assert_eq!(detail.value_json, JsonValue::Parsed(json!("b")));
        assert_eq!(detail.old_value_json, JsonValue::Parsed(json!("a")));
    }

    #[test]
    fn test_unchanged_value_yields_nothing() {
        let (mut dom, node) = element();
        dom.set_attribute(node, "title", "same").unwrap();
        dom.take_mutations();
        dom.set_attribute(node, "title", "same").unwrap();
        let record = single_record(&mut dom);

        assert!(normalize_mutation(&record, &dom).is_empty());
    }

    #[test]
    fn test_deleted_attribute_with_bad_json() {
        let (mut dom, node) = element();
        dom.set_attribute(node, "title", "{broken").unwrap();
        dom.take_mutations();
        dom.remove_attribute(node, "title").unwrap();
        let record = single_record(&mut dom);

        let details = normalize_mutation(&record, &dom);
        assert_eq!(names(&details), vec![EventName::DeleteAttribute]);
        let EventDetail::DeleteAttribute(detail) = &details[0] else {
            panic!("expected delete detail");
        };
        assert_eq!(detail.old_value.as_deref(), Some("{broken"));
        assert!(detail.old_value_json.is_empty());
    }

    #[test]
    fn test_class_diff() {
        let (mut dom, node) = element();
        dom.set_attribute(node, "class", "a b").unwrap();
        dom.take_mutations();
        dom.set_attribute(node, "class", "a c").unwrap();
        let record = single_record(&mut dom);

        let details = normalize_mutation(&record, &dom);
        assert_eq!(
            names(&details),
            vec![EventName::ChangeAttribute, EventName::AddClassName, EventName::DeleteClassName]
        );
        let (EventDetail::AddClassName(added), EventDetail::DeleteClassName(removed)) =
            (&details[1], &details[2])
        else {
            panic!("expected class details");
        };
        assert_eq!(added.changed_class_list, vec!["c".to_string()]);
        assert_eq!(removed.changed_class_list, vec!["b".to_string()]);
        assert_eq!(added.entry, removed.entry);
        assert_eq!(added.current_class_list, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_child_list_records_are_ignored() {
        let (mut dom, node) = element();
        dom.append_element(node, "span").unwrap();
        let record = single_record(&mut dom);
        assert!(normalize_mutation(&record, &dom).is_empty());
    }
}
