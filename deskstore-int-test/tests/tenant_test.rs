use deskstore::collection::UpdateOperators;
use deskstore::common::Value;
use deskstore::doc;
use deskstore::errors::ErrorKind;
use deskstore::filter::{all, field};
use deskstore::tenant::{Authorizer, AuthorizerChain, Principal, TenantCollection};
use deskstore::SortOrder;
use deskstore_int_test::test_util::{
    cleanup, create_live_test_context, create_test_context, run_test, strings,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn authorizer() -> AuthorizerChain {
    AuthorizerChain::new()
        .with(|token: &str| {
            token
                .strip_prefix("Bearer ")
                .map(|user| Principal::new(user, "jwt"))
        })
        .with(|token: &str| {
            token
                .strip_prefix("clerk_")
                .map(|user| Principal::new(user, "clerk"))
        })
}

#[test]
fn test_users_see_only_their_contacts() {
    for create in [create_test_context, create_live_test_context] {
        run_test(
            create,
            |ctx| {
                let contacts = ctx.store().contacts()?;
                let auth = authorizer();
                let alice = auth.authorize("Bearer alice").expect("alice");
                let bob = auth.authorize("clerk_bob").expect("bob");
                assert_eq!(bob.source(), "clerk");

                let as_alice = TenantCollection::new(contacts.clone(), alice);
                let as_bob = TenantCollection::new(contacts.clone(), bob);

                as_alice.insert(doc! { name: "Sarah Johnson", status: "Active" })?;
                as_alice.insert(doc! { name: "Emily Davis", status: "Inactive" })?;
                as_bob.insert(doc! { name: "Michael Chen", status: "Active", user_id: "alice" })?;

                assert_eq!(contacts.count(all())?, 3);
                assert_eq!(as_alice.count(all())?, 2);
                assert_eq!(as_bob.count(all())?, 1);

                let mine = as_alice
                    .find(all())?
                    .sort("name", SortOrder::Ascending)
                    .to_list();
                assert_eq!(strings(&mine, "name"), vec!["Emily Davis", "Sarah Johnson"]);
                assert!(as_bob.find_one(field("name").eq("Sarah Johnson"))?.is_none());

                let owners = contacts.distinct("user_id", None)?;
                assert_eq!(owners.len(), 2);
                assert_eq!(as_bob.distinct("user_id", None)?, vec![Value::from("bob")]);
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_users_cannot_touch_foreign_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let contacts = ctx.store().contacts()?;
            let alice = TenantCollection::new(contacts.clone(), Principal::new("alice", "jwt"));
            let bob = TenantCollection::new(contacts.clone(), Principal::new("bob", "jwt"));
            let id = alice.insert(doc! { name: "Sarah Johnson" })?;

            let by_id = field("id").eq(id.as_str());
            let update = UpdateOperators::new().set("status", "Blocked");
            assert_eq!(bob.update_one(by_id.clone(), &update)?, 0);
            assert_eq!(bob.remove_many(by_id.clone())?, 0);
            assert_eq!(alice.update_one(by_id.clone(), &update)?, 1);

            let err = alice
                .update_one(by_id.clone(), &UpdateOperators::new().set("user_id", "bob"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);

            assert_eq!(alice.remove_one(by_id)?, 1);
            assert_eq!(contacts.count(all())?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_credentials_are_refused() {
    let auth = authorizer();
    assert!(auth.authorize("Basic YWxpY2U6").is_none());
    assert!(auth.authorize("").is_none());

    // a development fallback goes last so real tokens still win
    let dev = authorizer().with(|_: &str| Some(Principal::new("dev_user", "debug")));
    assert_eq!(dev.authorize("Bearer carol").map(|p| p.source().to_string()), Some("jwt".into()));
    assert_eq!(dev.authorize("anything").map(|p| p.user_id().to_string()), Some("dev_user".into()));
}
