//! Integration tests for customs-store
//!
//! These tests drive the full customer, folder and milestone cycle through
//! the `CustomsStore` trait against an in-memory database.

use chrono::{NaiveDate, TimeZone, Utc};
use customs_domain::traits::CustomsStore;
use customs_domain::{
    Capability, Customer, CustomerQuery, CustomerSort, CustomerUpdate, CustomsError,
    DeclarationFiling, DocumentRef, ErrorKind, Folder, FolderId, FolderQuery, FolderSort,
    FolderStatus, Liquidation, NewCustomer, NewExpense, NewFolder, PageRequest, PersonFields,
    PersonPatch, Receipt, ReleaseOrder, SortDirection,
};
use customs_store::SqliteStore;

fn store() -> SqliteStore {
    SqliteStore::new(":memory:").unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn customer(nif: &str, phone: &str, email: &str) -> Customer {
    NewCustomer {
        regulatory_id: nif.to_string(),
        person: PersonFields {
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            address: None,
        },
        credential: String::new(),
    }
    .into_customer(Utc::now())
}

fn onboard(store: &mut SqliteStore, nif: &str, phone: &str, email: &str) -> Customer {
    let customer = customer(nif, phone, email);
    store
        .insert_customer(&customer, "sha256$salt$digest", &[Capability::CreateFolder, Capability::ViewFolder])
        .unwrap();
    customer
}

fn folder(store: &mut SqliteStore, number: &str, customer: &Customer) -> Folder {
    let folder = NewFolder {
        number: number.to_string(),
        weight: 1250.5,
        harbor: "Dakar".to_string(),
        container_number: Some(format!("MSCU-{}", number)),
        customer_id: customer.id,
    }
    .into_folder(Utc::now());
    store.insert_folder(&folder).unwrap();
    folder
}

fn filing(number: &str) -> DeclarationFiling {
    DeclarationFiling {
        number: number.to_string(),
        date: day(1),
        destination_office: "Dakar Port".to_string(),
        verifier: "V-12".to_string(),
        document_ref: Some(DocumentRef::new("decl.pdf")),
    }
}

fn liquidation(bulletin: &str) -> Liquidation {
    Liquidation {
        bulletin: bulletin.to_string(),
        date: day(2),
        document_ref: None,
    }
}

fn receipt(number: &str) -> Receipt {
    Receipt {
        number: number.to_string(),
        date: day(3),
        document_ref: None,
    }
}

fn release(number: &str) -> ReleaseOrder {
    ReleaseOrder {
        number: number.to_string(),
        date: day(4),
        document_ref: Some(DocumentRef::new("bon.pdf")),
    }
}

fn status_of(store: &SqliteStore, id: FolderId) -> FolderStatus {
    store.get_folder(id).unwrap().unwrap().status
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_insert_and_get_customer() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");

    let loaded = store.get_customer(customer.id).unwrap().unwrap();
    assert_eq!(loaded.regulatory_id, "C-001");
    assert_eq!(loaded.person, customer.person);
    assert!(loaded.active);

    let grants = store.granted_capabilities(customer.person.id).unwrap();
    assert_eq!(grants, vec![Capability::CreateFolder, Capability::ViewFolder]);
    assert_eq!(
        store.credential_hash(customer.person.id).unwrap().as_deref(),
        Some("sha256$salt$digest")
    );
}

#[test]
fn test_duplicate_identity_fields_conflict() {
    let mut store = store();
    onboard(&mut store, "C-001", "+221770000001", "awa@example.com");

    let err = store
        .insert_customer(&customer("C-001", "+221770000002", "other@example.com"), "h", &[])
        .unwrap_err();
    assert_eq!(err, CustomsError::conflict("regulatory_id", "C-001"));

    let err = store
        .insert_customer(&customer("C-002", "+221770000001", "other@example.com"), "h", &[])
        .unwrap_err();
    assert_eq!(err, CustomsError::conflict("phone", "+221770000001"));

    let err = store
        .insert_customer(&customer("C-002", "+221770000002", "AWA@example.com"), "h", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_email_uniqueness_folds_unicode_case() {
    let mut store = store();
    onboard(&mut store, "C-001", "+221770000001", "élodie@transit.sn");

    let err = store
        .insert_customer(&customer("C-002", "+221770000002", "ÉLODIE@transit.sn"), "h", &[])
        .unwrap_err();
    assert_eq!(err, CustomsError::conflict("email", "ÉLODIE@transit.sn"));

    let other = onboard(&mut store, "C-003", "+221770000003", "awa@transit.sn");
    let update = CustomerUpdate {
        person: PersonPatch {
            email: Some("Élodie@Transit.sn".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = store.update_customer(other.id, &update, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_update_customer_keeps_identity_and_grants() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");

    let update = CustomerUpdate {
        person: PersonPatch {
            first_name: Some("Aminata".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let updated = store.update_customer(customer.id, &update, None).unwrap();
    assert_eq!(updated.id, customer.id);
    assert_eq!(updated.person.id, customer.person.id);
    assert_eq!(updated.person.first_name, "Aminata");
    assert_eq!(updated.person.phone, "+221770000001");

    // Credential untouched when no new hash is supplied
    assert_eq!(
        store.credential_hash(customer.person.id).unwrap().as_deref(),
        Some("sha256$salt$digest")
    );
    assert_eq!(store.granted_capabilities(customer.person.id).unwrap().len(), 2);

    store.update_customer(customer.id, &CustomerUpdate::default(), Some("sha256$new$hash")).unwrap();
    assert_eq!(
        store.credential_hash(customer.person.id).unwrap().as_deref(),
        Some("sha256$new$hash")
    );
}

#[test]
fn test_update_customer_to_taken_value_conflicts() {
    let mut store = store();
    let a = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    onboard(&mut store, "C-002", "+221770000002", "moussa@example.com");

    let update = CustomerUpdate {
        regulatory_id: Some("C-002".to_string()),
        ..Default::default()
    };
    let err = store.update_customer(a.id, &update, None).unwrap_err();
    assert_eq!(err, CustomsError::conflict("regulatory_id", "C-002"));

    // Re-submitting its own values is not a conflict
    let update = CustomerUpdate {
        regulatory_id: Some("C-001".to_string()),
        person: PersonPatch {
            phone: Some("+221770000001".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(store.update_customer(a.id, &update, None).is_ok());
}

#[test]
fn test_update_missing_customer_is_not_found() {
    let mut store = store();
    let ghost = customer("C-404", "+1", "ghost@example.com");
    let err = store.update_customer(ghost.id, &CustomerUpdate::default(), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_folder_requires_active_customer() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    store.set_customer_active(customer.id, false).unwrap();

    let new_folder = NewFolder {
        number: "F-1".to_string(),
        weight: 10.0,
        harbor: "Dakar".to_string(),
        container_number: None,
        customer_id: customer.id,
    }
    .into_folder(Utc::now());
    let err = store.insert_folder(&new_folder).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    store.set_customer_active(customer.id, true).unwrap();
    assert!(store.insert_folder(&new_folder).is_ok());
}

#[test]
fn test_folder_number_is_unique() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    folder(&mut store, "F-2024-001", &customer);

    let duplicate = NewFolder {
        number: "F-2024-001".to_string(),
        weight: 1.0,
        harbor: "Ziguinchor".to_string(),
        container_number: None,
        customer_id: customer.id,
    }
    .into_folder(Utc::now());
    assert_eq!(
        store.insert_folder(&duplicate).unwrap_err(),
        CustomsError::conflict("number", "F-2024-001")
    );
}

#[test]
fn test_full_milestone_cycle_updates_status() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let folder = folder(&mut store, "F-2024-001", &customer);
    assert_eq!(status_of(&store, folder.id), FolderStatus::Open);
    assert!(store.get_declaration(folder.id).unwrap().is_none());

    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    store.file_declaration(folder.id, &filing("D-1"), now).unwrap();
    assert_eq!(status_of(&store, folder.id), FolderStatus::Declared);

    store.record_liquidation(folder.id, &liquidation("L-1"), now).unwrap();
    assert_eq!(status_of(&store, folder.id), FolderStatus::Liquidated);

    store.record_receipt(folder.id, &receipt("R-1"), now).unwrap();
    assert_eq!(status_of(&store, folder.id), FolderStatus::Receipted);

    let later = Utc.with_ymd_and_hms(2024, 3, 4, 16, 30, 0).unwrap();
    let declaration = store.record_release_order(folder.id, &release("B-1"), later).unwrap();
    assert_eq!(declaration.status(), FolderStatus::Released);
    assert_eq!(status_of(&store, folder.id), FolderStatus::Released);

    let loaded = store.get_declaration(folder.id).unwrap().unwrap();
    assert_eq!(loaded, declaration);
    assert_eq!(loaded.filing.document_ref, Some(DocumentRef::new("decl.pdf")));
    assert_eq!(loaded.release_order.unwrap().number, "B-1");
    assert_eq!(loaded.created_at, now);
    assert_eq!(loaded.updated_at, later);
}

#[test]
fn test_stage_before_predecessor_is_precondition() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let folder = folder(&mut store, "F-1", &customer);

    // No declaration at all
    let err = store.record_liquidation(folder.id, &liquidation("L-1"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    store.file_declaration(folder.id, &filing("D-1"), Utc::now()).unwrap();
    let err = store.record_receipt(folder.id, &receipt("R-1"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    let err = store.record_release_order(folder.id, &release("B-1"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    assert_eq!(status_of(&store, folder.id), FolderStatus::Declared);
    let declaration = store.get_declaration(folder.id).unwrap().unwrap();
    assert!(declaration.receipt.is_none());
}

#[test]
fn test_recorded_stage_is_never_rewritten() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let folder = folder(&mut store, "F-1", &customer);
    store.file_declaration(folder.id, &filing("D-1"), Utc::now()).unwrap();
    store.record_liquidation(folder.id, &liquidation("L-1"), Utc::now()).unwrap();
    store.record_receipt(folder.id, &receipt("R-1"), Utc::now()).unwrap();

    let err = store.record_receipt(folder.id, &receipt("R-2"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = store.record_liquidation(folder.id, &liquidation("L-1"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let declaration = store.get_declaration(folder.id).unwrap().unwrap();
    assert_eq!(declaration.receipt.unwrap().number, "R-1");
    assert_eq!(status_of(&store, folder.id), FolderStatus::Receipted);
}

#[test]
fn test_second_declaration_for_folder_is_rejected() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let folder = folder(&mut store, "F-1", &customer);
    store.file_declaration(folder.id, &filing("D-1"), Utc::now()).unwrap();

    let err = store.file_declaration(folder.id, &filing("D-2"), Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_unique_references_across_folders() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let first = folder(&mut store, "F-1", &customer);
    let second = folder(&mut store, "F-2", &customer);

    for f in [&first, &second] {
        let number = format!("D-{}", f.number);
        store.file_declaration(f.id, &filing(&number), Utc::now()).unwrap();
        // Bulletins are not unique
        store.record_liquidation(f.id, &liquidation("L-SHARED"), Utc::now()).unwrap();
    }

    assert_eq!(
        store.file_declaration(FolderId::new(), &filing("D-F-1"), Utc::now()).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    store.record_receipt(first.id, &receipt("R-1"), Utc::now()).unwrap();
    assert_eq!(
        store.record_receipt(second.id, &receipt("R-1"), Utc::now()).unwrap_err(),
        CustomsError::conflict("receipt_number", "R-1")
    );

    store.record_receipt(second.id, &receipt("R-2"), Utc::now()).unwrap();
    store.record_release_order(first.id, &release("B-1"), Utc::now()).unwrap();
    assert_eq!(
        store.record_release_order(second.id, &release("B-1"), Utc::now()).unwrap_err(),
        CustomsError::conflict("bon_number", "B-1")
    );
    assert_eq!(status_of(&store, second.id), FolderStatus::Receipted);
}

#[test]
fn test_declaration_number_is_unique() {
    let mut store = store();
    let customer = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let first = folder(&mut store, "F-1", &customer);
    let second = folder(&mut store, "F-2", &customer);
    store.file_declaration(first.id, &filing("D-1"), Utc::now()).unwrap();

    let err = store.file_declaration(second.id, &filing("D-1"), Utc::now()).unwrap_err();
    assert_eq!(err, CustomsError::conflict("number", "D-1"));
    assert_eq!(status_of(&store, second.id), FolderStatus::Open);
}

#[test]
fn test_query_folders_filters_and_joins() {
    let mut store = store();
    let awa = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let moussa = onboard(&mut store, "C-002", "+221770000002", "moussa@example.com");
    let f1 = folder(&mut store, "F-2024-001", &awa);
    folder(&mut store, "F-2024-002", &awa);
    folder(&mut store, "F-2024-003", &moussa);
    store.file_declaration(f1.id, &filing("D-1"), Utc::now()).unwrap();

    let page = store
        .query_folders(&FolderQuery {
            status: Some(FolderStatus::Declared),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    let row = &page.items[0];
    assert_eq!(row.folder.number, "F-2024-001");
    assert_eq!(row.customer_regulatory_id, "C-001");
    assert_eq!(row.customer_name, "Awa Diop");
    assert_eq!(row.declaration_number.as_deref(), Some("D-1"));

    let page = store
        .query_folders(&FolderQuery {
            customer_id: Some(moussa.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].folder.number, "F-2024-003");
    assert!(page.items[0].declaration_number.is_none());
}

#[test]
fn test_search_is_case_insensitive_including_non_ascii() {
    let mut store = store();
    let awa = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let folder = NewFolder {
        number: "F-9".to_string(),
        weight: 3.0,
        harbor: "Saint-Louis Évêché".to_string(),
        container_number: Some("TGHU-0001".to_string()),
        customer_id: awa.id,
    }
    .into_folder(Utc::now());
    store.insert_folder(&folder).unwrap();

    for needle in ["ÉVÊCHÉ", "évêché", "tghu", "c-001"] {
        let page = store
            .query_folders(&FolderQuery {
                search: Some(needle.to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 1, "search for {needle}");
    }

    let page = store
        .query_folders(&FolderQuery {
            search: Some("nowhere".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[test]
fn test_query_folders_pagination_and_sort() {
    let mut store = store();
    let awa = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    for i in 1..=25 {
        folder(&mut store, &format!("F-{:03}", i), &awa);
    }

    let query = FolderQuery {
        sort: FolderSort::Number,
        direction: SortDirection::Ascending,
        page: PageRequest::new(3, 10),
        ..Default::default()
    };
    let page = store.query_folders(&query).unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages(), 3);
    assert!(!page.has_next());
    let numbers: Vec<_> = page.items.iter().map(|r| r.folder.number.as_str()).collect();
    assert_eq!(numbers, vec!["F-021", "F-022", "F-023", "F-024", "F-025"]);

    let query = FolderQuery {
        sort: FolderSort::Number,
        direction: SortDirection::Descending,
        page: PageRequest::new(1, 2),
        ..Default::default()
    };
    let page = store.query_folders(&query).unwrap();
    assert_eq!(page.items[0].folder.number, "F-025");
    assert!(page.has_next());
}

#[test]
fn test_query_folders_sorted_by_status_rank() {
    let mut store = store();
    let awa = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let open = folder(&mut store, "F-A", &awa);
    let declared = folder(&mut store, "F-B", &awa);
    let liquidated = folder(&mut store, "F-C", &awa);
    store.file_declaration(declared.id, &filing("D-B"), Utc::now()).unwrap();
    store.file_declaration(liquidated.id, &filing("D-C"), Utc::now()).unwrap();
    store.record_liquidation(liquidated.id, &liquidation("L-C"), Utc::now()).unwrap();

    let page = store
        .query_folders(&FolderQuery {
            sort: FolderSort::Status,
            direction: SortDirection::Descending,
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<_> = page.items.iter().map(|r| r.folder.id).collect();
    assert_eq!(ids, vec![liquidated.id, declared.id, open.id]);
}

#[test]
fn test_query_customers() {
    let mut store = store();
    let awa = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let moussa = onboard(&mut store, "C-002", "+221770000002", "moussa@example.com");
    store
        .update_customer(
            moussa.id,
            &CustomerUpdate {
                person: PersonPatch {
                    first_name: Some("Moussa".to_string()),
                    last_name: Some("Ndiaye".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            None,
        )
        .unwrap();
    store.set_customer_active(awa.id, false).unwrap();

    let page = store
        .query_customers(&CustomerQuery {
            search: Some("NDIAYE".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, moussa.id);

    let page = store
        .query_customers(&CustomerQuery {
            active: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, awa.id);
    assert!(!page.items[0].active);

    let page = store
        .query_customers(&CustomerQuery {
            sort: CustomerSort::RegulatoryId,
            direction: SortDirection::Ascending,
            ..Default::default()
        })
        .unwrap();
    let nifs: Vec<_> = page.items.iter().map(|c| c.regulatory_id.as_str()).collect();
    assert_eq!(nifs, vec!["C-001", "C-002"]);
}

#[test]
fn test_expenses_belong_to_their_folder() {
    let mut store = store();
    let owner = onboard(&mut store, "C-001", "+221770000001", "awa@example.com");
    let a = folder(&mut store, "F-2024-001", &owner);
    let b = folder(&mut store, "F-2024-002", &owner);

    let storage = NewExpense {
        kind: "Magasinage".to_string(),
        amount: Some(150_000.0),
        description: "Port storage".to_string(),
    }
    .into_expense(a.id, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    let transport = NewExpense {
        kind: "Transport".to_string(),
        amount: None,
        description: "Truck to warehouse".to_string(),
    }
    .into_expense(a.id, Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap());
    store.insert_expense(&transport).unwrap();
    store.insert_expense(&storage).unwrap();

    let listed = store.list_expenses(a.id).unwrap();
    assert_eq!(listed, vec![storage.clone(), transport]);
    assert!(store.list_expenses(b.id).unwrap().is_empty());

    let orphan = NewExpense {
        kind: "Transport".to_string(),
        amount: Some(10.0),
        description: "Unknown folder".to_string(),
    }
    .into_expense(FolderId::new(), Utc::now());
    let err = store.insert_expense(&orphan).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
