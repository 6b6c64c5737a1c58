//! Property tests for filtering and partial updates.

use proptest::prelude::*;
use tickets_lib::{InMemoryStore, NewTicket, TicketFilter, TicketPatch};

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn arb_new_ticket() -> impl Strategy<Value = NewTicket> {
    (
        prop::sample::select(vec!["apitest", "other"]),
        arb_word(),
        arb_word(),
        prop::sample::select(vec!["alice", "bob", "carol"]),
        prop::option::of(arb_word()),
    )
        .prop_map(|(project, title, text, creator, assignee)| NewTicket {
            project: project.to_string(),
            issue_title: title,
            issue_text: text,
            created_by: creator.to_string(),
            assigned_to: assignee.unwrap_or_default(),
            status_text: String::new(),
        })
}

/// Which single field a patch touches.
#[derive(Debug, Clone, Copy)]
enum PatchField {
    Title,
    Text,
    CreatedBy,
    AssignedTo,
    StatusText,
    Open,
}

fn arb_patch_field() -> impl Strategy<Value = PatchField> {
    prop::sample::select(vec![
        PatchField::Title,
        PatchField::Text,
        PatchField::CreatedBy,
        PatchField::AssignedTo,
        PatchField::StatusText,
        PatchField::Open,
    ])
}

proptest! {
    #[test]
    fn project_filter_includes_and_field_filter_excludes(
        tickets in prop::collection::vec(arb_new_ticket(), 1..12),
        creator in prop::sample::select(vec!["alice", "bob", "carol"]),
    ) {
        let mut store = InMemoryStore::new();
        let created: Vec<_> = tickets
            .into_iter()
            .map(|t| store.insert(t).unwrap())
            .collect();

        for ticket in &created {
            let listed = store.find(&TicketFilter::project(ticket.project.clone()));
            prop_assert!(listed.iter().any(|t| t.id == ticket.id));
        }

        let filtered = store.find(&TicketFilter::project("apitest").with_field("created_by", creator));
        for ticket in &filtered {
            prop_assert_eq!(ticket.created_by.as_str(), creator);
            prop_assert_eq!(ticket.project.as_str(), "apitest");
        }

        let expected = created
            .iter()
            .filter(|t| t.project == "apitest" && t.created_by == creator)
            .count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn single_field_patch_changes_only_that_field(
        new in arb_new_ticket(),
        field in arb_patch_field(),
        value in arb_word(),
    ) {
        let mut store = InMemoryStore::new();
        let before = store.insert(new).unwrap();

        let patch = match field {
            PatchField::Title => TicketPatch { issue_title: Some(value.clone()), ..Default::default() },
            PatchField::Text => TicketPatch { issue_text: Some(value.clone()), ..Default::default() },
            PatchField::CreatedBy => TicketPatch { created_by: Some(value.clone()), ..Default::default() },
            PatchField::AssignedTo => TicketPatch { assigned_to: Some(value.clone()), ..Default::default() },
            PatchField::StatusText => TicketPatch { status_text: Some(value.clone()), ..Default::default() },
            PatchField::Open => TicketPatch { open: Some(false), ..Default::default() },
        };

        let filter = TicketFilter::scoped(before.project.clone(), before.id.clone());
        let after = store.update_one(&filter, &patch).unwrap().unwrap();

        let mut expected = before.clone();
        patch.apply_to(&mut expected);
        expected.updated_on = after.updated_on;

        prop_assert_eq!(&after, &expected);
        prop_assert!(after.updated_on >= before.updated_on);
        prop_assert_eq!(after.created_on, before.created_on);
    }
}
