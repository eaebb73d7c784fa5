use deskstore::collection::UpdateOperators;
use deskstore::common::Value;
use deskstore::doc;
use deskstore::errors::ErrorKind;
use deskstore::filter::{all, field};
use deskstore_int_test::test_util::{
    cleanup, create_live_test_context, create_test_context, insert_test_contacts, run_test,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_set_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;
            let emily = field("name").eq("Emily Davis");
            let update = UpdateOperators::new().set("status", "Active");

            contacts.update_one(emily.clone(), &update)?;
            let once = contacts.find_one(emily.clone())?;
            contacts.update_one(emily.clone(), &update)?;
            let twice = contacts.find_one(emily)?;

            assert_eq!(once, twice);
            assert_eq!(contacts.count(field("status").eq("Active"))?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_to_set_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;
            let sarah = field("name").eq("Sarah Johnson");
            let update = UpdateOperators::new().add_each_to_set("tags", vec!["VIP"]);

            contacts.update_one(sarah.clone(), &update)?;
            contacts.update_one(sarah.clone(), &update)?;

            let tags = contacts.find_one(sarah)?.map(|d| d.get("tags")).transpose()?;
            assert_eq!(tags, Some(Value::from_vec(vec!["VIP", "Customer"])));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_inc_from_absent_field() {
    run_test(
        create_live_test_context,
        |ctx| {
            let templates = ctx.store().templates()?;
            let id = templates.insert(doc! { name: "Welcome Message", content: "Hello {{name}}!" })?;
            let by_id = field("id").eq(id.as_str());
            let update = UpdateOperators::new().inc("count", 1);

            for _ in 0..3 {
                assert_eq!(templates.update_one(by_id.clone(), &update)?, 1);
            }

            let stored = templates.find_one(by_id)?.map(|d| d.get("count")).transpose()?;
            assert_eq!(stored, Some(Value::from(3)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_operators_apply_in_order() {
    run_test(
        create_test_context,
        |ctx| {
            let campaigns = ctx.store().campaigns()?;
            campaigns.insert(doc! { name: "Summer Sale", recipients: 10 })?;

            // set runs before inc, so the increment applies to the new value
            let update = UpdateOperators::new()
                .inc("sent", 5)
                .set("sent", 100)
                .add_to_set("labels", "promo");
            campaigns.update_one(all(), &update)?;

            let stored = campaigns.find_one(all())?;
            let stored = stored.expect("campaign");
            assert_eq!(stored.get("sent")?, Value::from(105));
            assert_eq!(stored.get("labels")?, Value::from_vec(vec!["promo"]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_many_counts_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;
            let update = UpdateOperators::new().set("lastMessage", "Broadcast");

            assert_eq!(contacts.update_many(field("status").eq("Active"), &update)?, 2);
            assert_eq!(contacts.update_one(field("status").eq("Active"), &update)?, 1);
            assert_eq!(contacts.count(field("lastMessage").eq("Broadcast"))?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_update_changes_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;
            contacts.update_one(
                field("name").eq("Emily Davis"),
                &UpdateOperators::new().set("score", "high"),
            )?;

            // the third document cannot be incremented, so none is
            let update = UpdateOperators::new().set("touched", true).inc("score", 1);
            let err = contacts.update_many(all(), &update).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidDataType);
            assert_eq!(contacts.count(field("touched").eq(true))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_cannot_change_id() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;
            let update = UpdateOperators::new().set("id", "99").set("status", "Blocked");

            assert_eq!(contacts.update_one(field("id").eq("1"), &update)?, 1);
            let stored = contacts.find_one(field("id").eq("1"))?;
            assert_eq!(stored.map(|d| d.get("status")).transpose()?, Some(Value::from("Blocked")));
            assert!(contacts.find_one(field("id").eq("99"))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_cannot_rewrite_id_through_nested_path() {
    for create in [create_test_context, create_live_test_context] {
        run_test(
            create,
            |ctx| {
                let contacts = ctx.store().contacts()?;
                insert_test_contacts(&contacts)?;
                let update = UpdateOperators::parse(&doc! {
                    "$set": { "id.sub": 1, status: "Blocked" },
                    "$inc": { "id.n": 1 },
                })?;

                assert_eq!(contacts.update_one(field("id").eq("2"), &update)?, 1);
                let stored = contacts.find_one(field("id").eq("2"))?;
                let stored = stored.map(|d| d.get("id")).transpose()?;
                assert_eq!(stored, Some(Value::from("2")));
                assert_eq!(contacts.count(field("status").eq("Blocked"))?, 1);
                Ok(())
            },
            cleanup,
        )
    }
}

#[test]
fn test_parsed_update_document() {
    run_test(
        create_test_context,
        |ctx| {
            let campaigns = ctx.store().campaigns()?;
            campaigns.insert(doc! { id: "7", name: "Welcome Series" })?;

            let update = UpdateOperators::parse(&doc! {
                "$set": { status: "Paused" },
                "$inc": { delivered: 3 },
                "$addToSet": { channels: { "$each": ["whatsapp", "sms", "whatsapp"] } },
            })?;
            campaigns.update_one(field("id").eq("7"), &update)?;

            let stored = campaigns.find_one(field("id").eq("7"))?;
            let stored = stored.expect("campaign");
            assert_eq!(stored.get("status")?, Value::from("Paused"));
            assert_eq!(stored.get("delivered")?, Value::from(3));
            assert_eq!(stored.get("channels")?, Value::from_vec(vec!["whatsapp", "sms"]));
            Ok(())
        },
        cleanup,
    )
}
