mod support;

use recipebook_core::{
    AttributeAccessError, ConstraintKind, Recipe, RecipeRepository, RepoError, User,
    UserRepository,
};
use support::{
    ScopedSchema, LIZ_BIO, LIZ_IMAGE_URL, PARTY_HAM_INSTRUCTIONS, SHED_HAM_INSTRUCTIONS,
    TEST_PASSWORD_COST,
};

#[test]
fn has_attributes() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Liz").with_image_url(LIZ_IMAGE_URL).with_bio(LIZ_BIO);
    user.set_password_with_cost("whosafraidofvirginiawoolf", TEST_PASSWORD_COST)
        .unwrap();
    let mut session = ctx.session();
    session.add_user(&mut user);
    session.commit().unwrap();

    let created = ctx.users().unwrap().find_by_username("Liz").unwrap().unwrap();
    assert_eq!(created.username.as_deref(), Some("Liz"));
    assert_eq!(created.image_url.as_deref(), Some(LIZ_IMAGE_URL));
    assert_eq!(created.bio.as_deref(), Some(LIZ_BIO));

    let err = created.password_hash().unwrap_err();
    assert_eq!(
        err,
        AttributeAccessError {
            record: "User",
            attribute: "password_hash",
        }
    );
}

#[test]
fn password_is_unreadable_but_verifiable() {
    let mut user = User::new("Liz");
    user.set_password_with_cost("whosafraidofvirginiawoolf", TEST_PASSWORD_COST)
        .unwrap();

    assert!(user.has_password());
    assert!(user.password_hash().is_err());
    assert!(user.authenticate("whosafraidofvirginiawoolf"));
    assert!(!user.authenticate("catonahottinroof"));
    assert!(!format!("{user:?}").contains("$2"));
}

#[test]
fn user_without_password_never_authenticates() {
    let user = User::new("Nopass");
    assert!(!user.has_password());
    assert!(!user.authenticate(""));
}

#[test]
fn out_of_range_password_cost_is_rejected() {
    let mut user = User::new("Liz");
    assert!(user.set_password_with_cost("secret", 2).is_err());
    assert!(!user.has_password());
}

#[test]
fn stored_password_verifies_after_reload() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Liz");
    user.set_password_with_cost("whosafraidofvirginiawoolf", TEST_PASSWORD_COST)
        .unwrap();
    let mut session = ctx.session();
    session.add_user(&mut user);
    session.commit().unwrap();
    let id = user.id.unwrap();

    let users = ctx.users().unwrap();
    assert!(users.verify_password(id, "whosafraidofvirginiawoolf").unwrap());
    assert!(!users.verify_password(id, "wrong").unwrap());
    assert!(matches!(
        users.verify_password(id + 1000, "whosafraidofvirginiawoolf"),
        Err(RepoError::NotFound { table: "users", .. })
    ));
}

#[test]
fn requires_username() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::default();
    let mut session = ctx.session();
    session.add_user(&mut user);
    let err = session.commit().unwrap_err();

    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert_eq!(err.constraint().unwrap().kind, ConstraintKind::NotNull);
    assert_eq!(user.id, None);
}

#[test]
fn requires_unique_username() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user_1 = User::new("Ben");
    let mut user_2 = User::new("Ben");
    let mut session = ctx.session();
    session.add_all_users([&mut user_1, &mut user_2]);
    let err = session.commit().unwrap_err();

    assert_eq!(err.constraint().unwrap().kind, ConstraintKind::Unique);
    assert_eq!(user_1.id, None);
    assert_eq!(user_2.id, None);
    assert!(ctx.users().unwrap().find_by_username("Ben").unwrap().is_none());
}

#[test]
fn username_stays_unique_across_commits() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut first = User::new("Ben");
    let mut session = ctx.session();
    session.add_user(&mut first);
    session.commit().unwrap();

    let mut second = User::new("Ben");
    let mut session = ctx.session();
    session.add_user(&mut second);
    let err = session.commit().unwrap_err();

    assert_eq!(err.constraint().unwrap().kind, ConstraintKind::Unique);
    assert_eq!(ctx.users().unwrap().list_users().unwrap().len(), 1);
}

#[test]
fn has_list_of_recipes() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Prabhdip");
    user.add_recipe(Recipe::new("Delicious Shed Ham", SHED_HAM_INSTRUCTIONS).with_minutes(60));
    user.add_recipe(Recipe::new("Hasty Party Ham", PARTY_HAM_INSTRUCTIONS).with_minutes(30));

    let mut session = ctx.session();
    session.add_user(&mut user);
    let summary = session.commit().unwrap();
    assert_eq!(summary.users_inserted, 1);
    assert_eq!(summary.recipes_inserted, 2);

    let user_id = user.id.unwrap();
    let recipe_ids: Vec<_> = user.recipes.iter().map(|recipe| recipe.id.unwrap()).collect();
    assert_eq!(recipe_ids.len(), 2);
    assert_ne!(recipe_ids[0], recipe_ids[1]);
    assert!(user
        .recipes
        .iter()
        .all(|recipe| recipe.user_id == Some(user_id)));

    let recipes = ctx.recipes().unwrap();
    for id in &recipe_ids {
        let stored = recipes.get_recipe(*id).unwrap().unwrap();
        assert!(user.has_recipe(&stored));
        let owner = recipes.owner_of(*id).unwrap().unwrap();
        assert_eq!(owner.id, Some(user_id));
    }

    let reloaded = ctx.users().unwrap().get_user(user_id).unwrap().unwrap();
    assert_eq!(reloaded.recipes.len(), 2);
    for recipe in &user.recipes {
        assert!(reloaded.has_recipe(recipe));
    }
}

#[test]
fn invalid_owned_recipe_rolls_back_owner() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Prabhdip");
    user.add_recipe(Recipe::new("Short Ham", "too short"));
    let mut session = ctx.session();
    session.add_user(&mut user);
    assert!(session.commit().unwrap_err().is_constraint_violation());

    assert_eq!(user.id, None);
    assert_eq!(user.recipes[0].user_id, None);
    assert!(ctx.users().unwrap().list_users().unwrap().is_empty());
}

#[test]
fn new_recipe_on_committed_user_is_inserted_on_next_commit() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Prabhdip");
    user.add_recipe(Recipe::new("Delicious Shed Ham", SHED_HAM_INSTRUCTIONS));
    let mut session = ctx.session();
    session.add_user(&mut user);
    session.commit().unwrap();

    user.add_recipe(Recipe::new("Hasty Party Ham", PARTY_HAM_INSTRUCTIONS));
    let mut session = ctx.session();
    session.add_user(&mut user);
    let summary = session.commit().unwrap();
    assert_eq!(summary.users_inserted, 0);
    assert_eq!(summary.recipes_inserted, 1);

    let owned = ctx.users().unwrap().recipes_for_user(user.id.unwrap()).unwrap();
    assert_eq!(owned.len(), 2);
}

#[test]
fn committed_recipe_moved_to_user_is_owned_in_storage() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut recipe = Recipe::new("Loose Ham", SHED_HAM_INSTRUCTIONS);
    let mut session = ctx.session();
    session.add_recipe(&mut recipe);
    session.commit().unwrap();
    let recipe_id = recipe.id.unwrap();

    let mut user = User::new("Prabhdip");
    user.add_recipe(recipe);
    let mut session = ctx.session();
    session.add_user(&mut user);
    let summary = session.commit().unwrap();
    assert_eq!(summary.users_inserted, 1);
    assert_eq!(summary.recipes_inserted, 0);
    assert_eq!(summary.recipes_reassigned, 1);

    let user_id = user.id.unwrap();
    assert_eq!(user.recipes[0].id, Some(recipe_id));
    assert_eq!(user.recipes[0].user_id, Some(user_id));

    let owner = ctx.recipes().unwrap().owner_of(recipe_id).unwrap().unwrap();
    assert_eq!(owner.id, Some(user_id));
    let owned = ctx.users().unwrap().recipes_for_user(user_id).unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, Some(recipe_id));
}

#[test]
fn recipe_moved_between_users_follows_new_owner() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut first = User::new("Prabhdip");
    first.add_recipe(Recipe::new("Delicious Shed Ham", SHED_HAM_INSTRUCTIONS));
    let mut session = ctx.session();
    session.add_user(&mut first);
    session.commit().unwrap();

    let moved = first.recipes.remove(0);
    let recipe_id = moved.id.unwrap();
    let mut second = User::new("Liz");
    second.add_recipe(moved);
    let mut session = ctx.session();
    session.add_user(&mut second);
    let summary = session.commit().unwrap();
    assert_eq!(summary.recipes_reassigned, 1);

    let users = ctx.users().unwrap();
    assert!(users.recipes_for_user(first.id.unwrap()).unwrap().is_empty());
    assert_eq!(users.recipes_for_user(second.id.unwrap()).unwrap().len(), 1);
    let owner = ctx.recipes().unwrap().owner_of(recipe_id).unwrap().unwrap();
    assert_eq!(owner.username.as_deref(), Some("Liz"));

    let mut session = ctx.session();
    session.add_user(&mut second);
    let summary = session.commit().unwrap();
    assert_eq!(summary.recipes_reassigned, 0);
}

#[test]
fn owner_of_unowned_recipe_is_none() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut recipe = Recipe::new("Loose Ham", SHED_HAM_INSTRUCTIONS);
    let mut session = ctx.session();
    session.add_recipe(&mut recipe);
    session.commit().unwrap();

    let recipes = ctx.recipes().unwrap();
    assert!(recipes.owner_of(recipe.id.unwrap()).unwrap().is_none());
    assert!(matches!(
        recipes.owner_of(9999),
        Err(RepoError::NotFound { table: "recipes", id: 9999 })
    ));
}

#[test]
fn rollback_discards_pending_records() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let mut user = User::new("Ghost");
    let mut session = ctx.session();
    session.add_user(&mut user);
    session.rollback();

    assert_eq!(user.id, None);
    assert!(ctx.users().unwrap().list_users().unwrap().is_empty());
}

#[test]
fn serialization_never_exposes_password() {
    let mut user = User::new("Liz").with_bio(LIZ_BIO);
    user.set_password_with_cost("whosafraidofvirginiawoolf", TEST_PASSWORD_COST)
        .unwrap();
    user.add_recipe(Recipe::new("Delicious Shed Ham", SHED_HAM_INSTRUCTIONS));

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["username"], "Liz");
    assert_eq!(json["recipes"][0]["title"], "Delicious Shed Ham");
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
    assert!(!json.to_string().contains("$2"));
}
