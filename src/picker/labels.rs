//! Picker label building and reversal.
//!
//! Forms are shown as `"<id> - <description>"`; reversing a chosen label
//! re-locates the record in the previously fetched list by exact id match
//! (string-compared). Server return order is preserved.

use crate::catalog::{FormRecord, GlobalEvent};

/// Separator between id and description in a form label.
const LABEL_SEPARATOR: &str = " - ";

/// Build the picker label for one form.
pub fn form_label(form: &FormRecord) -> String {
    format!(
        "{}{}{}",
        form.document_id, LABEL_SEPARATOR, form.document_description
    )
}

/// Build labels for a form list, in the list's order.
pub fn form_labels(forms: &[FormRecord]) -> Vec<String> {
    forms.iter().map(form_label).collect()
}

/// Extract the id portion of a form label.
pub fn label_id(label: &str) -> Option<&str> {
    label.split_once(LABEL_SEPARATOR).map(|(id, _)| id)
}

/// Map a chosen label back to its form record.
pub fn find_form<'a>(forms: &'a [FormRecord], label: &str) -> Option<&'a FormRecord> {
    let id = label_id(label)?;
    forms.iter().find(|form| form.document_id.to_string() == id)
}

/// Build the picker labels for a global event list (the bare event ids).
pub fn event_labels(events: &[GlobalEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| event.key.event_id.clone())
        .collect()
}

/// Map a chosen event label back to its record.
pub fn find_event<'a>(events: &'a [GlobalEvent], label: &str) -> Option<&'a GlobalEvent> {
    events.iter().find(|event| event.key.event_id == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GlobalEventKey;

    fn form(id: u64, description: &str) -> FormRecord {
        FormRecord {
            document_id: id,
            document_description: description.to_string(),
            dataset_name: format!("ds_{}", description),
            version: 1000,
        }
    }

    #[test]
    fn test_label_round_trip() {
        let forms = vec![form(7, "Orders"), form(42, "Invoice")];
        let label = form_label(&forms[1]);
        assert_eq!(label, "42 - Invoice");
        assert_eq!(label_id(&label), Some("42"));

        let found = find_form(&forms, &label).unwrap();
        assert_eq!(found.document_id, 42);
    }

    #[test]
    fn test_description_may_contain_separator() {
        let forms = vec![form(9, "A - B")];
        let label = form_label(&forms[0]);
        assert_eq!(label, "9 - A - B");
        // Splitting at the first separator keeps the id intact.
        assert_eq!(label_id(&label), Some("9"));
        assert!(find_form(&forms, &label).is_some());
    }

    #[test]
    fn test_unknown_label_finds_nothing() {
        let forms = vec![form(1, "One")];
        assert!(find_form(&forms, "2 - Two").is_none());
        assert!(find_form(&forms, "no separator").is_none());
    }

    #[test]
    fn test_event_labels() {
        let events = vec![GlobalEvent {
            key: GlobalEventKey {
                company_id: 1,
                event_id: "displayCentralTasks".to_string(),
            },
            script: "function x() {}".to_string(),
        }];
        assert_eq!(event_labels(&events), vec!["displayCentralTasks"]);
        assert!(find_event(&events, "displayCentralTasks").is_some());
        assert!(find_event(&events, "other").is_none());
    }
}
