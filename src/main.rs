use kinship::application_port::*;
use kinship::domain_model::*;
use kinship::engine::FriendshipEngine;
use kinship::logger::*;
use kinship::settings::*;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap()?;

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let engine = match cli.command {
        Command::Demo => FriendshipEngine::in_memory([
            Account::new("U1", "Ada Lovelace"),
            Account::new("U2", "Grace Hopper"),
            Account::new("U3", "Alan Turing"),
        ]),
        _ => FriendshipEngine::try_new(&project_settings).await?,
    };
    if cli.command.is_mutation() && project_settings.store.backend == StoreBackend::Memory {
        warn!("memory backend: this change is dropped when the process exits");
    }

    let result = run(&engine, cli.command).await;
    engine.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

async fn run(engine: &FriendshipEngine, command: Command) -> anyhow::Result<Value> {
    let friendships = &engine.friendship_service;
    let queries = &engine.query_service;

    let value = match command {
        Command::Send { acting, target } => {
            serde_json::to_value(friendships.send_request(&acting.into(), &target.into()).await?)?
        }
        Command::Accept { acting, target } => serde_json::to_value(
            friendships
                .accept_request(&acting.into(), &target.into())
                .await?,
        )?,
        Command::Reject { acting, target } => {
            friendships
                .reject_request(&acting.into(), &target.into())
                .await?;
            json!({ "rejected": true })
        }
        Command::Cancel { acting, target } => {
            friendships
                .cancel_invitation(&acting.into(), &target.into())
                .await?;
            json!({ "cancelled": true })
        }
        Command::Unfriend { acting, target } => {
            friendships.unfriend(&acting.into(), &target.into()).await?;
            json!({ "unfriended": true })
        }
        Command::Status { viewer, target } => {
            json!({ "status": friendships.resolve_status(&viewer.into(), &target.into()).await? })
        }
        Command::Friends { account } => {
            serde_json::to_value(queries.friends(&account.into()).await?)?
        }
        Command::NonFriends { account } => {
            serde_json::to_value(queries.non_friends(&account.into()).await?)?
        }
        Command::Requests { account } => {
            serde_json::to_value(queries.friend_requests(&account.into()).await?)?
        }
        Command::Search {
            account,
            partial_name,
        } => serde_json::to_value(
            queries
                .search_friends_by_name(&account.into(), &partial_name)
                .await?,
        )?,
        Command::Demo => demo(engine).await?,
    };

    Ok(value)
}

/// U1 befriends U2 the regular way, then U1 and U3 invite each other at once.
async fn demo(engine: &FriendshipEngine) -> anyhow::Result<Value> {
    let friendships = &engine.friendship_service;
    let queries = &engine.query_service;
    let (u1, u2, u3) = (AccountId::from("U1"), AccountId::from("U2"), AccountId::from("U3"));

    friendships.send_request(&u1, &u2).await?;
    let after_send = friendships.resolve_status(&u1, &u2).await?;

    friendships.accept_request(&u2, &u1).await?;
    let after_accept = friendships.resolve_status(&u1, &u2).await?;
    let non_friends = queries.non_friends(&u1).await?;

    let (from_u3, from_u1) = futures_util::future::join(
        friendships.send_request(&u3, &u1),
        friendships.send_request(&u1, &u3),
    )
    .await;
    info!(
        u3_to_u1 = ?from_u3.as_ref().map(|o| o.edge().status),
        u1_to_u3 = ?from_u1.as_ref().map(|o| o.edge().status),
        "crossed invites settled"
    );
    from_u3?;
    from_u1?;

    Ok(json!({
        "after_send": after_send,
        "after_accept": after_accept,
        "non_friends_of_u1": non_friends,
        "crossed_status": friendships.resolve_status(&u1, &u3).await?,
        "friends_of_u1": queries.friends(&u1).await?,
        "requests_of_u1": queries.friend_requests(&u1).await?,
    }))
}
