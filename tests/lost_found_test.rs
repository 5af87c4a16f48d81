mod common;

use common::fixtures;
use khidmat::error::PortalError;
use khidmat::model::lost_found::{ItemKind, ItemStatus};
use khidmat::notify;
use khidmat::repo::ListFilter;

#[actix_rt::test]
async fn posting_uploads_the_photo_and_opens_the_case() {
    let portal = fixtures::portal();
    let ctx = fixtures::user_ctx(&portal, "finder").await;
    let items = portal.lost_found();

    let item = items
        .post(
            &ctx,
            fixtures::item_draft("Black wallet", ItemKind::Found),
            fixtures::image(32 * 1024),
        )
        .await
        .expect("post failed");

    assert_eq!(item.status, ItemStatus::Pending);
    assert_eq!(item.kind, ItemKind::Found);

    let key = item.image_key.as_deref().expect("image key missing");
    assert!(key.starts_with(&ctx.user_id().to_string()));
    assert!(key.ends_with(".png"));
    assert_eq!(portal.blob.object_size(key), Some(32 * 1024));

    let url = items.image_url(&item).expect("no image url");
    assert_eq!(url, format!("{}/{}", portal.config.storage.public_url, key));
}

#[actix_rt::test]
async fn oversized_photos_are_rejected_before_anything_is_written() {
    let portal = fixtures::portal();
    let ctx = fixtures::user_ctx(&portal, "finder").await;
    let items = portal.lost_found();

    let err = items
        .post(
            &ctx,
            fixtures::item_draft("Huge scan", ItemKind::Lost),
            fixtures::image(portal.config.storage.max_image_bytes + 1),
        )
        .await
        .expect_err("oversized upload should fail");
    assert!(matches!(err, PortalError::Validation(_)));

    let listed = items.list(&ListFilter::all()).await.expect("list failed");
    assert!(listed.is_empty(), "no row should exist after a failed upload");
}

#[actix_rt::test]
async fn edit_keeps_the_photo_unless_a_replacement_is_supplied() {
    let portal = fixtures::portal();
    let ctx = fixtures::user_ctx(&portal, "owner").await;
    let items = portal.lost_found();

    let item = items
        .post(
            &ctx,
            fixtures::item_draft("Blue umbrella", ItemKind::Lost),
            fixtures::image(1024),
        )
        .await
        .expect("post failed");
    let original_key = item.image_key.clone().expect("image key missing");

    let edited = items
        .edit(
            &ctx,
            item.id,
            fixtures::item_draft("Blue umbrella with stickers", ItemKind::Lost),
            None,
        )
        .await
        .expect("edit failed");
    assert_eq!(edited.image_key.as_deref(), Some(original_key.as_str()));

    let replaced = items
        .edit(
            &ctx,
            item.id,
            fixtures::item_draft("Blue umbrella with stickers", ItemKind::Lost),
            Some(fixtures::image(2048)),
        )
        .await
        .expect("edit with photo failed");
    let new_key = replaced.image_key.expect("image key missing");
    assert_ne!(new_key, original_key);
    assert_eq!(portal.blob.object_size(&new_key), Some(2048));
}

#[actix_rt::test]
async fn owner_edits_are_locked_once_the_case_is_closed() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let items = portal.lost_found();

    let item = items
        .post(
            &owner,
            fixtures::item_draft("Set of keys", ItemKind::Found),
            fixtures::image(512),
        )
        .await
        .expect("post failed");

    items
        .set_status(&admin, item.id, ItemStatus::Found)
        .await
        .expect("transition failed");

    let err = items
        .edit(
            &owner,
            item.id,
            fixtures::item_draft("Set of keys (3)", ItemKind::Found),
            None,
        )
        .await
        .expect_err("owner edit should be locked");
    assert!(matches!(err, PortalError::Forbidden(_)));
}

#[actix_rt::test]
async fn case_state_is_reversible_and_each_transition_notifies() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "owner").await;
    let items = portal.lost_found();

    let item = items
        .post(
            &owner,
            fixtures::item_draft("Calculator", ItemKind::Lost),
            fixtures::image(512),
        )
        .await
        .expect("post failed");

    let closed = items
        .set_status(&admin, item.id, ItemStatus::Found)
        .await
        .expect("close failed");
    assert_eq!(closed.status, ItemStatus::Found);

    let reopened = items
        .set_status(&admin, item.id, ItemStatus::Pending)
        .await
        .expect("reopen failed");
    assert_eq!(reopened.status, ItemStatus::Pending);

    let inbox = notify::for_recipient(&portal.store, &owner)
        .await
        .expect("inbox fetch failed");
    assert_eq!(inbox.len(), 2);
    assert_eq!(
        inbox[0].message,
        "Your lost & found item \"Calculator\" is now Pending"
    );
    assert_eq!(
        inbox[1].message,
        "Your lost & found item \"Calculator\" is now Found"
    );
}
