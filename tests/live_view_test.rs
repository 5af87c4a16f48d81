mod common;

use common::fixtures;
use khidmat::live::LiveView;
use khidmat::model::complaints::{Complaint, ComplaintStatus};
use khidmat::repo::{Confirm, ListFilter};
use std::sync::Arc;

#[actix_rt::test]
async fn remote_transitions_show_up_after_sync() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let complaints = portal.complaints();

    let complaint = complaints
        .submit(&owner, fixtures::complaint_draft("Wifi down"))
        .await
        .expect("submit failed");

    let mut view: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(owner.user_id()),
    )
    .await
    .expect("activate failed");
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.rows()[0].status, ComplaintStatus::Submitted);

    // Nothing has changed since the seed fetch.
    assert!(!view.sync().await.expect("sync failed"));

    complaints
        .set_status(&admin, complaint.id, ComplaintStatus::Resolved)
        .await
        .expect("transition failed");

    assert!(view.sync().await.expect("sync failed"));
    assert_eq!(view.rows()[0].status, ComplaintStatus::Resolved);
}

#[actix_rt::test]
async fn a_batch_of_changes_coalesces_into_one_resync() {
    let portal = fixtures::portal();
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let complaints = portal.complaints();

    let mut view: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(owner.user_id()),
    )
    .await
    .expect("activate failed");
    assert!(view.rows().is_empty());

    for title in ["One", "Two", "Three"] {
        complaints
            .submit(&owner, fixtures::complaint_draft(title))
            .await
            .expect("submit failed");
    }

    // Three queued signals, one re-fetch.
    assert!(view.sync().await.expect("sync failed"));
    assert_eq!(view.rows().len(), 3);
    assert!(!view.sync().await.expect("second sync should be a no-op"));
}

#[actix_rt::test]
async fn views_are_scoped_to_their_filter() {
    let portal = fixtures::portal();
    let alice = fixtures::user_ctx(&portal, "alice").await;
    let bob = fixtures::user_ctx(&portal, "bob").await;
    let complaints = portal.complaints();

    let mut alice_view: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(alice.user_id()),
    )
    .await
    .expect("activate failed");

    complaints
        .submit(&bob, fixtures::complaint_draft("Bob's problem"))
        .await
        .expect("submit failed");

    // Bob's complaint neither signals nor appears in Alice's view.
    assert!(!alice_view.sync().await.expect("sync failed"));
    assert!(alice_view.rows().is_empty());

    complaints
        .submit(&alice, fixtures::complaint_draft("Alice's problem"))
        .await
        .expect("submit failed");
    assert!(alice_view.sync().await.expect("sync failed"));
    assert_eq!(alice_view.rows().len(), 1);
}

#[actix_rt::test]
async fn status_filtered_views_observe_departures() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let complaints = portal.complaints();

    let complaint = complaints
        .submit(&owner, fixtures::complaint_draft("Wifi down"))
        .await
        .expect("submit failed");

    // An open-queue view: every complaint still awaiting triage.
    let mut queue: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::all().with_status(ComplaintStatus::Submitted.as_str()),
    )
    .await
    .expect("activate failed");
    assert_eq!(queue.rows().len(), 1);

    // Resolving moves the row out of the filtered set; the view must be
    // signalled even though the updated row no longer matches.
    complaints
        .set_status(&admin, complaint.id, ComplaintStatus::Resolved)
        .await
        .expect("transition failed");

    assert!(queue.sync().await.expect("sync failed"));
    assert!(queue.rows().is_empty());
}

#[actix_rt::test]
async fn changed_waits_for_the_next_mutation() {
    let portal = fixtures::portal();
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let complaints = portal.complaints();

    let mut view: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(owner.user_id()),
    )
    .await
    .expect("activate failed");

    complaints
        .submit(&owner, fixtures::complaint_draft("Queued before the wait"))
        .await
        .expect("submit failed");

    let rows = view
        .changed()
        .await
        .expect("changed failed")
        .expect("store side went away");
    assert_eq!(rows.len(), 1);
}

#[actix_rt::test]
async fn deactivating_one_view_leaves_the_others_live() {
    let portal = fixtures::portal();
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let complaints = portal.complaints();

    let first: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(owner.user_id()),
    )
    .await
    .expect("activate failed");
    let mut second: LiveView<Complaint> = LiveView::activate(
        Arc::clone(&portal.store),
        ListFilter::owned_by(owner.user_id()),
    )
    .await
    .expect("activate failed");

    first.deactivate();

    let complaint = complaints
        .submit(&owner, fixtures::complaint_draft("Still watching"))
        .await
        .expect("submit failed");

    assert!(second.sync().await.expect("sync failed"));
    assert_eq!(second.rows().len(), 1);

    // Deletions signal too.
    complaints
        .delete(&owner, complaint.id, Confirm::confirmed())
        .await
        .expect("delete failed");
    assert!(second.sync().await.expect("sync failed"));
    assert!(second.rows().is_empty());
}
