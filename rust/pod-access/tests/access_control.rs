use anyhow::Result;
use pod_access::acp::{AcrDocument, Policy, PolicyResource};
use pod_access::wac::{AclDocument, AclRule};
use pod_access::{
    ACP_PUBLIC_AGENT, AUTHENTICATED_AGENT, AccessControl, AccessControlError, AccessControlType,
    AccessMode, AccessModes, AcpRevision, Agent, MemoryStore, PUBLIC_AGENT, ResourceHandle,
    resolve,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use url::Url;

fn url(value: &str) -> Url {
    Url::parse(value).unwrap()
}

fn modes(list: &[AccessMode]) -> AccessModes {
    list.iter().copied().collect()
}

const ALICE: &str = "https://alice.example/profile/card#me";
const BOB: &str = "https://bob.example/profile/card#me";

fn policies_container() -> Url {
    url("https://pod.example/policies/")
}

/// A WAC pod where only the root container has an ACL, granting Alice full
/// control and the public read access to everything below it.
async fn wac_pod(user_access: AccessModes) -> (MemoryStore, ResourceHandle) {
    let store = MemoryStore::default();
    let root = url("https://pod.example/");
    let alice = Agent::from(ALICE);

    store
        .insert_resource(ResourceHandle::new(root.clone()).with_acl(url("https://pod.example/.acl")))
        .await;
    store
        .insert_resource(
            ResourceHandle::new(url("https://pod.example/docs/"))
                .with_acl(url("https://pod.example/docs/.acl")),
        )
        .await;
    store
        .insert_acl(
            url("https://pod.example/.acl"),
            AclDocument {
                rules: vec![
                    AclRule::new(
                        "#owner",
                        modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Control]),
                    )
                    .access_to(root.clone())
                    .default_for(root.clone())
                    .agent(&alice),
                    AclRule::new("#public", modes(&[AccessMode::Read]))
                        .default_for(root.clone())
                        .agent(&Agent::from(PUBLIC_AGENT)),
                ],
            },
        )
        .await;

    let file = ResourceHandle::new(url("https://pod.example/docs/file"))
        .with_acl(url("https://pod.example/docs/file.acl"))
        .with_user_access(user_access);
    store.insert_resource(file.clone()).await;

    (store, file)
}

/// An ACP pod whose root hands public read access down to its members
/// through a shared policy.
async fn acp_pod(revisions: &[AcpRevision]) -> (MemoryStore, ResourceHandle) {
    let store = MemoryStore::default();
    let shared = url("https://pod.example/shared/policies.ttl");
    let public_read = url("https://pod.example/shared/policies.ttl#public-read");

    store
        .insert_resource(
            ResourceHandle::new(url("https://pod.example/"))
                .with_acr(url("https://pod.example/?ext=acr"), [AcpRevision::V4]),
        )
        .await;
    store
        .insert_resource(ResourceHandle::new(url("https://pod.example/docs/")))
        .await;
    store
        .insert_acr(
            url("https://pod.example/?ext=acr"),
            AcrDocument {
                policies: BTreeSet::new(),
                member_policies: BTreeSet::from([public_read.clone()]),
            },
        )
        .await;
    store
        .insert_policies(
            shared,
            PolicyResource {
                policies: vec![Policy {
                    url: public_read,
                    allow: modes(&[AccessMode::Read]),
                    agents: BTreeSet::from([ACP_PUBLIC_AGENT.to_string()]),
                }],
            },
        )
        .await;

    let file = ResourceHandle::new(url("https://pod.example/docs/file")).with_acr(
        url("https://pod.example/docs/file?ext=acr"),
        revisions.iter().copied(),
    );
    store.insert_resource(file.clone()).await;

    (store, file)
}

#[tokio::test]
async fn wac_lists_inherited_defaults_with_sentinels_first() -> Result<()> {
    let (store, file) = wac_pod(AccessModes::none()).await;
    let strategy = resolve(&file, &policies_container(), store, false, None)?;

    let permissions = strategy.list_permissions().await?;

    assert_eq!(
        permissions
            .iter()
            .map(|permission| (permission.web_id(), permission.inherited))
            .collect::<Vec<_>>(),
        vec![(PUBLIC_AGENT, true), (ALICE, true)]
    );
    assert_eq!(permissions[0].origin, url("https://pod.example/.acl"));
    Ok(())
}

#[tokio::test]
async fn wac_grant_creates_the_acl_from_inherited_defaults() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Control])).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    let granted = strategy
        .grant_access(&Agent::from(BOB), modes(&[AccessMode::Read]))
        .await?;
    assert!(!granted.inherited);

    let permissions = strategy.list_permissions().await?;
    assert_eq!(
        permissions
            .iter()
            .map(|permission| (permission.web_id(), permission.inherited))
            .collect::<Vec<_>>(),
        vec![(PUBLIC_AGENT, false), (ALICE, false), (BOB, false)]
    );
    assert!(store.acl(&url("https://pod.example/docs/file.acl")).await.is_some());
    Ok(())
}

#[tokio::test]
async fn wac_grant_without_control_cannot_create_an_acl() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Read, AccessMode::Write])).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    let result = strategy
        .grant_access(&Agent::from(BOB), modes(&[AccessMode::Read]))
        .await;

    assert!(matches!(result, Err(AccessControlError::NoControlAccess { .. })));
    assert_eq!(store.writes().await, 0);
    Ok(())
}

#[tokio::test]
async fn wac_grant_replaces_modes_and_is_idempotent() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Control])).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;
    let bob = Agent::from(BOB);

    strategy
        .grant_access(&bob, modes(&[AccessMode::Read, AccessMode::Write]))
        .await?;
    strategy.grant_access(&bob, modes(&[AccessMode::Read])).await?;
    let writes = store.writes().await;

    let again = strategy.grant_access(&bob, modes(&[AccessMode::Read])).await?;
    assert_eq!(store.writes().await, writes);
    assert_eq!(again.modes, modes(&[AccessMode::Read]));

    let bobs = strategy
        .list_permissions()
        .await?
        .into_iter()
        .find(|permission| permission.agent == bob)
        .map(|permission| permission.modes);
    assert_eq!(bobs, Some(modes(&[AccessMode::Read])));
    Ok(())
}

#[tokio::test]
async fn wac_refuses_to_revoke_inherited_access() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Control])).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    let result = strategy.revoke_access(&Agent::from(ALICE)).await;

    match result {
        Err(AccessControlError::InheritedPermissionRevoke { agent, origin }) => {
            assert_eq!(agent, ALICE);
            assert_eq!(origin, url("https://pod.example/.acl"));
        }
        other => panic!("expected an inherited revoke error, got {other:?}"),
    }
    assert_eq!(store.writes().await, 0);
    Ok(())
}

#[tokio::test]
async fn wac_revokes_direct_access() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Control])).await;
    let mut strategy = resolve(&file, &policies_container(), store, false, None)?;
    let bob = Agent::from(BOB);

    strategy.grant_access(&bob, modes(&[AccessMode::Append])).await?;
    strategy.revoke_access(&bob).await?;

    let permissions = strategy.list_permissions().await?;
    assert!(permissions.iter().all(|permission| permission.agent != bob));
    Ok(())
}

#[tokio::test]
async fn wac_maps_authenticated_class_onto_its_sentinel() -> Result<()> {
    let (store, file) = wac_pod(modes(&[AccessMode::Control])).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    strategy
        .grant_access(&Agent::from(AUTHENTICATED_AGENT), modes(&[AccessMode::Read]))
        .await?;

    let acl = store
        .acl(&url("https://pod.example/docs/file.acl"))
        .await
        .unwrap_or_default();
    assert!(
        acl.rules
            .iter()
            .any(|rule| rule.agent_classes.contains(AUTHENTICATED_AGENT))
    );
    let listed = strategy.list_permissions().await?;
    assert_eq!(listed[1].web_id(), AUTHENTICATED_AGENT);
    assert_eq!(listed[1].agent.label(), Some("Anyone signed in"));
    Ok(())
}

#[tokio::test]
async fn acp_lists_member_policies_as_inherited() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V4]).await;
    let strategy = resolve(&file, &policies_container(), store, false, None)?;
    assert_eq!(strategy.access_control_type(), AccessControlType::Acp);

    let permissions = strategy.list_permissions().await?;

    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].web_id(), PUBLIC_AGENT);
    assert!(permissions[0].inherited);
    assert_eq!(permissions[0].origin, url("https://pod.example/?ext=acr"));
    Ok(())
}

#[tokio::test]
async fn acp_grant_writes_own_policies_once() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V3, AcpRevision::V4]).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;
    let bob = Agent::from(BOB);

    strategy
        .grant_access(&bob, modes(&[AccessMode::Read, AccessMode::Append]))
        .await?;
    let writes = store.writes().await;
    assert_eq!(writes, 2);

    strategy
        .grant_access(&bob, modes(&[AccessMode::Read, AccessMode::Append]))
        .await?;
    assert_eq!(store.writes().await, writes);

    let document = store
        .policies(&url("https://pod.example/policies/docs/file.ttl"))
        .await
        .unwrap_or_default();
    assert_eq!(
        document.policies[0].url,
        url("https://pod.example/policies/docs/file.ttl#read-append")
    );

    let acr = store
        .acr(&url("https://pod.example/docs/file?ext=acr"))
        .await
        .unwrap_or_default();
    assert!(acr.policies.contains(&document.policies[0].url));

    let permissions = strategy.list_permissions().await?;
    assert_eq!(
        permissions
            .iter()
            .map(|permission| (permission.web_id(), permission.inherited))
            .collect::<Vec<_>>(),
        vec![(PUBLIC_AGENT, true), (BOB, false)]
    );
    Ok(())
}

#[tokio::test]
async fn acp_leaves_foreign_policies_alone() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V4]).await;
    let foreign = url("https://pod.example/shared/policies.ttl#public-read");
    store
        .insert_acr(
            url("https://pod.example/docs/file?ext=acr"),
            AcrDocument {
                policies: BTreeSet::from([foreign.clone()]),
                member_policies: BTreeSet::new(),
            },
        )
        .await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    strategy
        .grant_access(&Agent::from(BOB), modes(&[AccessMode::Read]))
        .await?;
    strategy.revoke_access(&Agent::from(BOB)).await?;

    let acr = store
        .acr(&url("https://pod.example/docs/file?ext=acr"))
        .await
        .unwrap_or_default();
    assert_eq!(acr.policies, BTreeSet::from([foreign]));

    let permissions = strategy.list_permissions().await?;
    assert_eq!(permissions.len(), 1);
    assert!(!permissions[0].inherited);
    Ok(())
}

/// Gives Bob read and write on the file through a policy kept in a shared
/// resource the strategy does not manage.
async fn share_with_bob(store: &MemoryStore) -> Url {
    let bob_rw = url("https://pod.example/shared/team.ttl#bob-rw");
    store
        .insert_policies(
            url("https://pod.example/shared/team.ttl"),
            PolicyResource {
                policies: vec![Policy {
                    url: bob_rw.clone(),
                    allow: modes(&[AccessMode::Read, AccessMode::Write]),
                    agents: BTreeSet::from([BOB.to_string()]),
                }],
            },
        )
        .await;
    store
        .insert_acr(
            url("https://pod.example/docs/file?ext=acr"),
            AcrDocument {
                policies: BTreeSet::from([bob_rw.clone()]),
                member_policies: BTreeSet::new(),
            },
        )
        .await;
    bob_rw
}

#[tokio::test]
async fn acp_refuses_to_revoke_access_held_through_an_unmanaged_policy() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V4]).await;
    let bob_rw = share_with_bob(&store).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;
    let writes = store.writes().await;

    let result = strategy.revoke_access(&Agent::from(BOB)).await;

    match result {
        Err(AccessControlError::UnmanagedPolicy { agent, policy }) => {
            assert_eq!(agent, BOB);
            assert_eq!(policy, bob_rw);
        }
        other => panic!("expected an unmanaged policy error, got {other:?}"),
    }
    assert_eq!(store.writes().await, writes);

    let bob = strategy
        .list_permissions()
        .await?
        .into_iter()
        .find(|permission| permission.web_id() == BOB)
        .expect("bob keeps his access");
    assert_eq!(bob.modes, modes(&[AccessMode::Read, AccessMode::Write]));
    assert!(!bob.inherited);
    Ok(())
}

#[tokio::test]
async fn acp_grant_cannot_narrow_access_held_through_an_unmanaged_policy() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V4]).await;
    share_with_bob(&store).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;
    let bob = Agent::from(BOB);
    let writes = store.writes().await;

    let narrowed = strategy
        .grant_access(&bob, modes(&[AccessMode::Read]))
        .await;
    assert!(matches!(
        narrowed,
        Err(AccessControlError::UnmanagedPolicy { .. })
    ));
    assert_eq!(store.writes().await, writes);

    let granted = strategy
        .grant_access(&bob, modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Append]))
        .await?;
    let listed = strategy
        .list_permissions()
        .await?
        .into_iter()
        .find(|permission| permission.agent == bob)
        .expect("bob is listed");
    assert_eq!(granted, listed);
    assert_eq!(
        granted.modes,
        modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Append])
    );
    Ok(())
}

#[tokio::test]
async fn acp_refuses_to_revoke_member_policy_access() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V4]).await;
    let mut strategy = resolve(&file, &policies_container(), store.clone(), false, None)?;

    let result = strategy.revoke_access(&Agent::from(PUBLIC_AGENT)).await;

    assert!(matches!(
        result,
        Err(AccessControlError::InheritedPermissionRevoke { .. })
    ));
    assert_eq!(store.writes().await, 0);
    Ok(())
}

#[tokio::test]
async fn acp_legacy_revisions_are_listed_but_not_changed() -> Result<()> {
    let (store, file) = acp_pod(&[AcpRevision::V1, AcpRevision::V2]).await;

    assert!(resolve(&file, &policies_container(), store.clone(), false, None).is_err());

    let mut strategy = resolve(&file, &policies_container(), store.clone(), true, None)?;
    assert!(strategy.read_only());
    assert_eq!(strategy.list_permissions().await?.len(), 1);

    let result = strategy
        .grant_access(&Agent::from(BOB), modes(&[AccessMode::Read]))
        .await;
    match result {
        Err(AccessControlError::ProtocolRevisionMismatch {
            revision, required, ..
        }) => {
            assert_eq!(revision, AcpRevision::V2);
            assert_eq!(required, AcpRevision::LATEST);
        }
        other => panic!("expected a revision mismatch, got {other:?}"),
    }
    assert_eq!(store.writes().await, 0);
    Ok(())
}
