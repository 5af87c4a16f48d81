mod common;

use common::fixtures;
use khidmat::error::PortalError;
use khidmat::model::volunteers::{Campus, VolunteerStatus};
use khidmat::notify;
use khidmat::repo::volunteers::VolunteerDraft;
use serde_json::json;

#[actix_rt::test]
async fn registration_uploads_the_profile_photo_and_starts_pending() {
    let portal = fixtures::portal();
    let ctx = fixtures::user_ctx(&portal, "helper").await;
    let volunteers = portal.volunteers();

    let volunteer = volunteers
        .register(
            &ctx,
            fixtures::volunteer_draft("Ration drive"),
            fixtures::image(4096),
        )
        .await
        .expect("register failed");

    assert_eq!(volunteer.status, VolunteerStatus::Pending);
    assert_eq!(volunteer.owner_id, ctx.user_id());
    assert_eq!(volunteer.campus, Campus::Gulshan);

    let key = volunteer
        .profile_image_key
        .as_deref()
        .expect("profile image key missing");
    assert_eq!(portal.blob.object_size(key), Some(4096));
    assert!(volunteers.profile_image_url(&volunteer).is_some());
}

#[actix_rt::test]
async fn invalid_drafts_name_the_offending_fields() {
    let portal = fixtures::portal();
    let ctx = fixtures::user_ctx(&portal, "hasty").await;

    let err = portal
        .volunteers()
        .register(
            &ctx,
            VolunteerDraft {
                full_name: " ".to_string(),
                roll_no: "SMIT-1".to_string(),
                campus: Campus::Saddar,
                event: "Tree plantation".to_string(),
                availability: "mornings".to_string(),
                hours_available: 0,
            },
            fixtures::image(1024),
        )
        .await
        .expect_err("invalid draft should fail");

    match err {
        PortalError::Validation(msg) => {
            assert!(msg.contains("full_name"), "message was: {}", msg);
            assert!(msg.contains("hours_available"), "message was: {}", msg);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[actix_rt::test]
async fn campuses_serialize_to_their_display_names() {
    assert_eq!(
        serde_json::to_value(Campus::KorangiMain).unwrap(),
        json!("Main Campus - Korangi")
    );

    for campus in Campus::ALL {
        let value = serde_json::to_value(campus).unwrap();
        assert_eq!(value, json!(campus.as_str()));
        let back: Campus = serde_json::from_value(value).unwrap();
        assert_eq!(back, campus);
    }
}

#[actix_rt::test]
async fn approval_decisions_are_reversible_and_each_notifies() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "helper").await;
    let volunteers = portal.volunteers();

    let volunteer = volunteers
        .register(
            &owner,
            fixtures::volunteer_draft("Blood camp"),
            fixtures::image(1024),
        )
        .await
        .expect("register failed");

    let approved = volunteers
        .set_status(&admin, volunteer.id, VolunteerStatus::Approved)
        .await
        .expect("approve failed");
    assert_eq!(approved.status, VolunteerStatus::Approved);

    let rejected = volunteers
        .set_status(&admin, volunteer.id, VolunteerStatus::Rejected)
        .await
        .expect("flip failed");
    assert_eq!(rejected.status, VolunteerStatus::Rejected);

    let inbox = notify::for_recipient(&portal.store, &owner)
        .await
        .expect("inbox fetch failed");
    assert_eq!(inbox.len(), 2);
    assert_eq!(
        inbox[0].message,
        "Your volunteer registration \"Blood camp\" is now Rejected"
    );
}

#[actix_rt::test]
async fn owner_edits_are_locked_after_review() {
    let portal = fixtures::portal();
    let admin = fixtures::admin_ctx(&portal, "root").await;
    let owner = fixtures::user_ctx(&portal, "helper").await;
    let volunteers = portal.volunteers();

    let volunteer = volunteers
        .register(
            &owner,
            fixtures::volunteer_draft("Cleanup drive"),
            fixtures::image(1024),
        )
        .await
        .expect("register failed");

    // Pending: owners may still fix their details.
    let mut draft = fixtures::volunteer_draft("Cleanup drive");
    draft.hours_available = 10;
    let edited = volunteers
        .edit(&owner, volunteer.id, draft.clone(), None)
        .await
        .expect("edit failed");
    assert_eq!(edited.hours_available, 10);

    volunteers
        .set_status(&admin, volunteer.id, VolunteerStatus::Approved)
        .await
        .expect("approve failed");

    let err = volunteers
        .edit(&owner, volunteer.id, draft, None)
        .await
        .expect_err("owner edit should be locked after review");
    assert!(matches!(err, PortalError::Forbidden(_)));
}
