//! Integration tests for proposal persistence.
//!
//! Exercises the repository layer against a real database:
//! - Approval group and article name copied at creation
//! - Conditional writes that only touch pending rows
//! - Append-once snapshots and cascade delete
//! - Role-scoped listing in SQL
//! - Standing check constraints

use knowmaint_core::policy::Actor;
use knowmaint_core::proposal::{resolve_decision, ProposalStatus, ProposalTarget, ProposalType};
use knowmaint_core::roles::UserRole;
use knowmaint_core::types::DbId;
use knowmaint_core::visibility::{ProposalFilter, ReviewScope};
use knowmaint_db::models::article::{CreateArticle, UpdateArticle};
use knowmaint_db::models::group::CreateGroup;
use knowmaint_db::models::proposal::{CreateProposal, Proposal, UpdateProposal};
use knowmaint_db::models::proposal_before::CreateProposalBefore;
use knowmaint_db::models::user::{CreateUser, User};
use knowmaint_db::repositories::{
    ArticleRepo, GroupRepo, ProposalBeforeRepo, ProposalRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_group(pool: &PgPool, name: &str) -> DbId {
    GroupRepo::create(
        pool,
        &CreateGroup {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_user(pool: &PgPool, username: &str, role: UserRole, group_id: Option<DbId>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
            group_id,
        },
    )
    .await
    .unwrap()
}

async fn new_article(pool: &PgPool, code: &str, group_id: DbId) {
    ArticleRepo::create(
        pool,
        &CreateArticle {
            code: code.to_string(),
            name: format!("Article {code}"),
            approval_group_id: group_id,
        },
    )
    .await
    .unwrap();
}

fn new_proposal(article_code: &str, title: &str) -> CreateProposal {
    CreateProposal {
        article_id: article_code.to_string(),
        proposal_type: ProposalType::Modify,
        title: title.to_string(),
        info_category_id: None,
        keywords: Some("vpn,remote".to_string()),
        importance: Some(true),
        published_start: None,
        published_end: None,
        target: Some(ProposalTarget::Internal),
        question: Some("How do I connect?".to_string()),
        answer: Some("Use the new client.".to_string()),
        add_comments: None,
        reason: "Outdated instructions".to_string(),
        before: None,
    }
}

async fn file(pool: &PgPool, user: &User, article_code: &str, title: &str) -> Proposal {
    ProposalRepo::create(pool, user.id, &new_proposal(article_code, title))
        .await
        .unwrap()
        .expect("article should exist")
}

fn db_error_code(err: &sqlx::Error) -> String {
    err.as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_copies_article_name_and_group(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;

    let proposal = file(&pool, &author, "KB-001", "Update VPN steps").await;

    assert_eq!(proposal.user_id, author.id);
    assert_eq!(proposal.article_id, "KB-001");
    assert_eq!(proposal.article_name, "Article KB-001");
    assert_eq!(proposal.approval_group_id, group);
    assert_eq!(proposal.status, ProposalStatus::Pending);
    assert_eq!(proposal.target, Some(ProposalTarget::Internal));
    assert!(proposal.approved_by.is_none());
    assert!(proposal.approved_at.is_none());
    assert!(proposal.rejection_reason.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_against_unknown_article_writes_nothing(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;

    let mut input = new_proposal("KB-404", "Ghost");
    input.before = Some(CreateProposalBefore::default());
    let result = ProposalRepo::create(&pool, author.id, &input).await.unwrap();
    assert!(result.is_none());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM proposals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    let (snapshots,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM proposals_before")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(snapshots, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approval_group_is_not_recomputed(pool: PgPool) {
    let first = new_group(&pool, "First").await;
    let second = new_group(&pool, "Second").await;
    let author = new_user(&pool, "alice", UserRole::General, None).await;
    new_article(&pool, "KB-001", first).await;
    let proposal = file(&pool, &author, "KB-001", "Title").await;

    ArticleRepo::update(
        &pool,
        "KB-001",
        &UpdateArticle {
            code: Some("KB-100".to_string()),
            name: None,
            approval_group_id: Some(second),
        },
    )
    .await
    .unwrap()
    .unwrap();

    let reloaded = ProposalRepo::find_by_id(&pool, proposal.id).await.unwrap().unwrap();
    assert_eq!(reloaded.article_id, "KB-100", "code change cascades");
    assert_eq!(reloaded.approval_group_id, first, "group stays as filed");
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_snapshot_is_append_once(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;

    let mut input = new_proposal("KB-001", "New title");
    input.before = Some(CreateProposalBefore {
        title_before: Some("Old title".to_string()),
        target_before: Some(ProposalTarget::External),
        ..Default::default()
    });
    let proposal = ProposalRepo::create(&pool, author.id, &input)
        .await
        .unwrap()
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let second = ProposalBeforeRepo::insert_if_absent(
        &mut tx,
        proposal.id,
        &CreateProposalBefore {
            title_before: Some("Replacement".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    assert!(second.is_none(), "existing snapshot must not be replaced");

    let snapshot = ProposalBeforeRepo::find_by_proposal(&pool, proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.title_before.as_deref(), Some("Old title"));
    assert_eq!(snapshot.target_before, Some(ProposalTarget::External));

    let rewrite = sqlx::query("UPDATE proposals_before SET title_before = 'x' WHERE proposal_id = $1")
        .bind(proposal.id)
        .execute(&pool)
        .await;
    assert!(rewrite.is_err(), "snapshot rows are immutable");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_cascades_to_snapshot(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;

    let mut input = new_proposal("KB-001", "Title");
    input.before = Some(CreateProposalBefore::default());
    let proposal = ProposalRepo::create(&pool, author.id, &input)
        .await
        .unwrap()
        .unwrap();

    assert!(ProposalRepo::delete(&pool, proposal.id).await.unwrap());
    assert!(ProposalBeforeRepo::find_by_proposal(&pool, proposal.id)
        .await
        .unwrap()
        .is_none());
    assert!(!ProposalRepo::delete(&pool, proposal.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Decisions and edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_decision_only_applies_once(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    let sv = new_user(&pool, "sv", UserRole::Supervisor, Some(group)).await;
    new_article(&pool, "KB-001", group).await;
    let proposal = file(&pool, &author, "KB-001", "Title").await;

    let approve = resolve_decision(ProposalStatus::Approved, None).unwrap();
    let mut tx = pool.begin().await.unwrap();
    let locked = ProposalRepo::lock_for_update(&mut tx, proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(locked.status, ProposalStatus::Pending);
    let decided = ProposalRepo::apply_decision(&mut tx, proposal.id, sv.id, &approve)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(decided.status, ProposalStatus::Approved);
    assert_eq!(decided.approved_by, Some(sv.id));
    assert!(decided.approved_at.is_some());
    assert!(decided.rejection_reason.is_none());

    let reject = resolve_decision(ProposalStatus::Rejected, Some("late")).unwrap();
    let mut tx = pool.begin().await.unwrap();
    let again = ProposalRepo::apply_decision(&mut tx, proposal.id, sv.id, &reject)
        .await
        .unwrap();
    assert!(again.is_none(), "terminal rows are not rewritten");

    let edit = ProposalRepo::update_content(
        &mut tx,
        proposal.id,
        &UpdateProposal {
            title: Some("Too late".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(edit.is_none(), "content edits need a pending row");
    tx.rollback().await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_content_is_partial(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;
    let proposal = file(&pool, &author, "KB-001", "Title").await;

    let mut tx = pool.begin().await.unwrap();
    let updated = ProposalRepo::update_content(
        &mut tx,
        proposal.id,
        &UpdateProposal {
            title: Some("Better title".to_string()),
            importance: Some(Some(false)),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.title, "Better title");
    assert_eq!(updated.importance, Some(false));
    assert_eq!(updated.keywords, proposal.keywords);
    assert_eq!(updated.reason, proposal.reason);
    assert_eq!(updated.status, ProposalStatus::Pending);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_content_clears_nullable_fields(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;
    let proposal = file(&pool, &author, "KB-001", "Title").await;
    assert!(proposal.keywords.is_some());

    let mut tx = pool.begin().await.unwrap();
    let updated = ProposalRepo::update_content(
        &mut tx,
        proposal.id,
        &UpdateProposal {
            keywords: Some(None),
            target: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.keywords, None);
    assert_eq!(updated.target, None);
    assert_eq!(updated.question, proposal.question, "omitted fields are kept");
    assert_eq!(updated.importance, Some(true));
    assert_eq!(updated.title, proposal.title);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rejected_without_reason_violates_check(pool: PgPool) {
    let group = new_group(&pool, "Network").await;
    let author = new_user(&pool, "alice", UserRole::General, Some(group)).await;
    new_article(&pool, "KB-001", group).await;
    let proposal = file(&pool, &author, "KB-001", "Title").await;

    for reason in [None, Some("   ")] {
        let err = sqlx::query(
            "UPDATE proposals SET status = 'rejected', rejection_reason = $2 WHERE id = $1",
        )
        .bind(proposal.id)
        .bind(reason)
        .execute(&pool)
        .await
        .unwrap_err();
        assert_eq!(db_error_code(&err), "23514");
    }

    let err = sqlx::query(
        "UPDATE proposals SET published_start = '2024-05-02', published_end = '2024-05-01' \
         WHERE id = $1",
    )
    .bind(proposal.id)
    .execute(&pool)
    .await
    .unwrap_err();
    assert_eq!(db_error_code(&err), "23514");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_applies_role_scope(pool: PgPool) {
    let network = new_group(&pool, "Network").await;
    let billing = new_group(&pool, "Billing").await;
    let alice = new_user(&pool, "alice", UserRole::General, Some(network)).await;
    let bob = new_user(&pool, "bob", UserRole::General, Some(billing)).await;
    let sv = new_user(&pool, "sv", UserRole::Supervisor, Some(network)).await;
    let admin = new_user(&pool, "admin", UserRole::Admin, None).await;
    new_article(&pool, "NET-1", network).await;
    new_article(&pool, "BIL-1", billing).await;

    let a1 = file(&pool, &alice, "NET-1", "a1").await;
    let a2 = file(&pool, &alice, "BIL-1", "a2").await;
    let b1 = file(&pool, &bob, "BIL-1", "b1").await;
    let s1 = file(&pool, &sv, "NET-1", "s1").await;
    let s2 = file(&pool, &sv, "BIL-1", "s2").await;

    let ids = |rows: Vec<Proposal>| rows.into_iter().map(|p| p.id).collect::<Vec<_>>();

    let general = ProposalFilter::new(&alice.actor(), None);
    assert_eq!(ids(ProposalRepo::list(&pool, &general).await.unwrap()), vec![a1.id, a2.id]);

    // Group rows plus own rows, each once, in creation order.
    let supervisor = ProposalFilter::new(&sv.actor(), None);
    assert_eq!(
        ids(ProposalRepo::list(&pool, &supervisor).await.unwrap()),
        vec![a1.id, s1.id, s2.id]
    );

    let everyone = ProposalFilter::new(&admin.actor(), None);
    assert_eq!(
        ids(ProposalRepo::list(&pool, &everyone).await.unwrap()),
        vec![a1.id, a2.id, b1.id, s1.id, s2.id]
    );

    let groupless_sv = Actor {
        user_id: sv.id,
        role: UserRole::Supervisor,
        group_id: None,
    };
    assert_eq!(
        ids(ProposalRepo::list(&pool, &ProposalFilter::new(&groupless_sv, None)).await.unwrap()),
        vec![s1.id, s2.id]
    );

    // Decide one and check the status filter narrows within the scope.
    let approve = resolve_decision(ProposalStatus::Approved, None).unwrap();
    let mut tx = pool.begin().await.unwrap();
    ProposalRepo::apply_decision(&mut tx, a1.id, admin.id, &approve)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    let pending_only = ProposalFilter::new(&sv.actor(), Some(ProposalStatus::Pending));
    assert_eq!(
        ids(ProposalRepo::list(&pool, &pending_only).await.unwrap()),
        vec![s1.id, s2.id]
    );

    assert_eq!(
        ids(ProposalRepo::list_pending(&pool, ReviewScope::Group(Some(network))).await.unwrap()),
        vec![s1.id]
    );
    assert_eq!(
        ids(ProposalRepo::list_pending(&pool, ReviewScope::All).await.unwrap()),
        vec![a2.id, b1.id, s1.id, s2.id]
    );
    assert!(ProposalRepo::list_pending(&pool, ReviewScope::Group(None))
        .await
        .unwrap()
        .is_empty());
}
