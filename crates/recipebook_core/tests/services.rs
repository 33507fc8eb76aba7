mod support;

use recipebook_core::{
    AccountServiceError, AppConfig, AppContext, Recipe, RecipeServiceError, RepoError,
    SignUpRequest,
};
use support::{ScopedSchema, LIZ_BIO, PARTY_HAM_INSTRUCTIONS, SHED_HAM_INSTRUCTIONS};

fn liz_sign_up() -> SignUpRequest {
    SignUpRequest {
        username: "Liz".to_string(),
        password: "whosafraidofvirginiawoolf".to_string(),
        image_url: None,
        bio: Some(LIZ_BIO.to_string()),
    }
}

#[test]
fn sign_up_then_authenticate() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let created = ctx.accounts().sign_up(liz_sign_up()).unwrap();
    assert!(created.id.is_some());
    assert!(created.password_hash().is_err());

    let accounts = ctx.accounts();
    let authenticated = accounts
        .authenticate("Liz", "whosafraidofvirginiawoolf")
        .unwrap();
    assert_eq!(authenticated.id, created.id);
    assert_eq!(authenticated.bio.as_deref(), Some(LIZ_BIO));
}

#[test]
fn authenticate_rejects_wrong_password_and_unknown_user() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();
    ctx.accounts().sign_up(liz_sign_up()).unwrap();

    let accounts = ctx.accounts();
    assert!(matches!(
        accounts.authenticate("Liz", "catonahottinroof"),
        Err(AccountServiceError::InvalidCredentials)
    ));
    assert!(matches!(
        accounts.authenticate("Richard", "whosafraidofvirginiawoolf"),
        Err(AccountServiceError::InvalidCredentials)
    ));
}

#[test]
fn sign_up_reports_taken_username() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();
    ctx.accounts().sign_up(liz_sign_up()).unwrap();

    let err = ctx.accounts().sign_up(liz_sign_up()).unwrap_err();
    assert!(matches!(err, AccountServiceError::UsernameTaken(ref name) if name == "Liz"));
}

#[test]
fn sign_up_without_username_is_a_constraint_violation() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let request = SignUpRequest {
        username: String::new(),
        ..liz_sign_up()
    };
    match ctx.accounts().sign_up(request) {
        Err(AccountServiceError::Repo(err)) => assert!(err.is_constraint_violation()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn testing_config_uses_cheap_password_cost() {
    let ctx = AppContext::new(AppConfig::testing()).unwrap();
    assert_eq!(ctx.config().password_cost, 4);
    assert!(ctx.config().testing);
}

#[test]
fn publish_and_list_recipes_for_owner() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();
    let owner = ctx.accounts().sign_up(liz_sign_up()).unwrap();
    let owner_id = owner.id.unwrap();

    let published = ctx
        .recipe_service()
        .publish(
            owner_id,
            Recipe::new("Delicious Shed Ham", SHED_HAM_INSTRUCTIONS).with_minutes(60),
        )
        .unwrap();
    assert!(published.id.is_some());
    assert_eq!(published.user_id, Some(owner_id));

    ctx.recipe_service()
        .publish(owner_id, Recipe::new("Hasty Party Ham", PARTY_HAM_INSTRUCTIONS))
        .unwrap();

    let listed = ctx.recipe_service().list_for(owner_id).unwrap();
    let titles: Vec<_> = listed
        .iter()
        .filter_map(|recipe| recipe.title.as_deref())
        .collect();
    assert_eq!(titles, vec!["Delicious Shed Ham", "Hasty Party Ham"]);
}

#[test]
fn publish_for_unknown_owner_fails() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();

    let err = ctx
        .recipe_service()
        .publish(77, Recipe::new("Orphan Ham", SHED_HAM_INSTRUCTIONS))
        .unwrap_err();
    assert!(matches!(err, RecipeServiceError::UserNotFound(77)));

    let err = ctx.recipe_service().list_for(77).unwrap_err();
    assert!(matches!(err, RecipeServiceError::UserNotFound(77)));
}

#[test]
fn publish_still_enforces_recipe_rules() {
    let mut schema = ScopedSchema::in_memory();
    let ctx = schema.fresh();
    let owner = ctx.accounts().sign_up(liz_sign_up()).unwrap();

    let err = ctx
        .recipe_service()
        .publish(owner.id.unwrap(), Recipe::new("Short Ham", "short"))
        .unwrap_err();
    assert!(matches!(
        err,
        RecipeServiceError::Repo(RepoError::Constraint(_))
    ));
}
