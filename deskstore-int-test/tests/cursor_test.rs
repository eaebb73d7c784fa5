use deskstore::doc;
use deskstore::filter::{all, field};
use deskstore::SortOrder;
use deskstore_int_test::test_util::{
    cleanup, create_live_test_context, create_test_context, insert_test_contacts, is_sorted,
    run_test, strings,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_count_matches_unpaged_find() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;

            for filter in [
                all(),
                field("status").eq("Active"),
                field("status").eq("Archived"),
                field("name").regex("a")?,
                field("id").in_array(vec!["1", "3", "9"]),
            ] {
                let listed = contacts.find(filter.clone())?.to_list().len() as u64;
                assert_eq!(contacts.count(filter)?, listed);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_is_deterministic() {
    run_test(
        create_test_context,
        |ctx| {
            let messages = ctx.store().collection("messages")?;
            for i in 0..25 {
                messages.insert(doc! { text: (format!("m{}", i)), bucket: (i % 4) })?;
            }

            let page = || -> deskstore::errors::StoreResult<Vec<String>> {
                let docs = messages
                    .find(all())?
                    .sort("bucket", SortOrder::Ascending)
                    .skip(5)
                    .limit(7)
                    .to_list();
                Ok(strings(&docs, "text"))
            };
            let first = page()?;
            assert_eq!(first.len(), 7);
            assert_eq!(first, page()?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_is_stable() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;

            // equal keys keep insertion order in both directions
            let asc = contacts.find(all())?.sort("status", SortOrder::Ascending).to_list();
            assert_eq!(
                strings(&asc, "name"),
                vec!["Sarah Johnson", "Michael Chen", "Emily Davis"]
            );

            let desc = contacts.find(all())?.sort("status", SortOrder::Descending).to_list();
            assert_eq!(
                strings(&desc, "name"),
                vec!["Emily Davis", "Sarah Johnson", "Michael Chen"]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_then_skip_then_limit() {
    run_test(
        create_live_test_context,
        |ctx| {
            let campaigns = ctx.store().collection("campaigns")?;
            for recipients in [40, 10, 30, 20, 50] {
                campaigns.insert(doc! { name: (format!("c{}", recipients)), recipients: recipients })?;
            }

            // configuration order does not matter
            let page = campaigns
                .find(all())?
                .limit(2)
                .skip(1)
                .sort("recipients", SortOrder::Descending)
                .to_list();
            assert_eq!(strings(&page, "name"), vec!["c40", "c30"]);

            let counts: Vec<i64> = campaigns
                .find(all())?
                .sort("recipients", SortOrder::Ascending)
                .to_list()
                .iter()
                .filter_map(|d| d.get("recipients").ok().and_then(|v| v.as_i64().copied()))
                .collect();
            assert!(is_sorted(counts, true));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_missing_sort_field_sorts_first() {
    run_test(
        create_test_context,
        |ctx| {
            let templates = ctx.store().collection("drafts")?;
            templates.insert(doc! { name: "b", usage: 2 })?;
            templates.insert(doc! { name: "a" })?;
            templates.insert(doc! { name: "c", usage: 1 })?;

            let asc = templates.find(all())?.sort("usage", SortOrder::Ascending).to_list();
            assert_eq!(strings(&asc, "name"), vec!["a", "c", "b"]);

            let desc = templates.find(all())?.sort("usage", SortOrder::Descending).to_list();
            assert_eq!(strings(&desc, "name"), vec!["b", "c", "a"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_skip_and_limit_edges() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;

            assert!(contacts.find(all())?.skip(10).to_list().is_empty());
            assert!(contacts.find(all())?.limit(0).to_list().is_empty());

            let cursor = contacts.find(all())?.skip(1).limit(10);
            assert_eq!(cursor.matched(), 3);
            assert_eq!(cursor.len(), 2);
            assert_eq!(
                cursor.first().and_then(|d| d.id()),
                Some("2".to_string())
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_is_a_snapshot() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;

            let cursor = contacts.find(all())?;
            contacts.remove_many(field("status").eq("Active"))?;
            contacts.insert(doc! { name: "Late" })?;

            assert_eq!(cursor.to_list().len(), 3);
            assert_eq!(contacts.count(all())?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_projection_keeps_id() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            insert_test_contacts(&contacts)?;

            let projected = contacts.find(all())?.project(&["name"]).to_list();
            for document in &projected {
                assert_eq!(document.size(), 2);
                assert!(document.has_id());
                assert!(document.contains_key("name"));
            }
            Ok(())
        },
        cleanup,
    )
}
