use sqlx::{FromRow, SqliteConnection};

use crate::dto::{
    player_dto::{Player, Role},
    team_dto::{Team, TeamSummary},
};
use crate::error::{AppError, AppResult};
use crate::store::{AuctionStore, auctions, teams};

const DOMESTIC_COUNTRY: &str = "India";

/// Idempotent set-insert. Fails if the player already sits in another squad.
pub async fn add_to_squad(conn: &mut SqliteConnection, team_id: i64, player_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO squad_members (team_id, player_id)
        VALUES (?, ?)
        ON CONFLICT(team_id, player_id) DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(player_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Idempotent set-remove.
pub async fn remove_from_squad(conn: &mut SqliteConnection, team_id: i64, player_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM squad_members WHERE team_id = ? AND player_id = ?")
        .bind(team_id)
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// The team whose squad currently holds the player.
pub async fn team_of(conn: &mut SqliteConnection, player_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT team_id FROM squad_members WHERE player_id = ?")
        .bind(player_id)
        .fetch_optional(conn)
        .await
}

pub async fn squad_ids(conn: &mut SqliteConnection, team_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT player_id FROM squad_members WHERE team_id = ? ORDER BY player_id")
        .bind(team_id)
        .fetch_all(conn)
        .await
}

pub async fn squad_players(conn: &mut SqliteConnection, team_id: i64) -> Result<Vec<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>(
        r#"
        SELECT p.* FROM players p
        JOIN squad_members sm ON sm.player_id = p.id
        WHERE sm.team_id = ?
        ORDER BY p.player_number
        "#,
    )
    .bind(team_id)
    .fetch_all(conn)
    .await
}

/// Loads a team with its squad filled in.
pub async fn load_team(conn: &mut SqliteConnection, team_id: i64) -> AppResult<Team> {
    let mut team = teams::find(&mut *conn, team_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("team {team_id} does not exist")))?;
    team.squad = squad_ids(conn, team_id).await?;
    Ok(team)
}

#[derive(Debug, Clone, FromRow)]
pub struct SquadMember {
    pub team_id: i64,
    pub role: Role,
    pub country: String,
    pub selling_price: f64,
}

fn is_overseas(country: &str) -> bool {
    let country = country.trim();
    !country.is_empty() && !country.eq_ignore_ascii_case(DOMESTIC_COUNTRY)
}

pub fn summarize<'a, I>(team: &Team, starting_purse: f64, members: I) -> TeamSummary
where
    I: IntoIterator<Item = &'a SquadMember>,
{
    let mut summary = TeamSummary {
        team_id: team.id,
        team_name: team.name.clone(),
        team_image: team.image.clone(),
        purse_remaining: starting_purse,
        batter: 0,
        bowler: 0,
        all_rounder: 0,
        wicket_keeper: 0,
        overseas: 0,
    };

    for member in members {
        match member.role {
            Role::Batter => summary.batter += 1,
            Role::Bowler => summary.bowler += 1,
            Role::AllRounder => summary.all_rounder += 1,
            Role::WicketKeeper => summary.wicket_keeper += 1,
        }
        if is_overseas(&member.country) {
            summary.overseas += 1;
        }
        summary.purse_remaining -= member.selling_price;
    }

    summary
}

/// Purse and composition of every team in the auction, recomputed from the
/// squads in one consistent read.
pub async fn team_summaries(store: &AuctionStore, auction_id: i64) -> AppResult<Vec<TeamSummary>> {
    store
        .transaction(move |conn| {
            Box::pin(async move {
                let auction = auctions::find(&mut *conn, auction_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("auction {auction_id} does not exist")))?;
                let teams = teams::list_for_auction(&mut *conn, auction_id).await?;
                let members = sqlx::query_as::<_, SquadMember>(
                    r#"
                    SELECT sm.team_id, p.role, p.country, p.selling_price
                    FROM squad_members sm
                    JOIN players p ON p.id = sm.player_id
                    JOIN teams t ON t.id = sm.team_id
                    WHERE t.auction_id = ?
                    "#,
                )
                .bind(auction_id)
                .fetch_all(&mut *conn)
                .await?;

                Ok(teams
                    .iter()
                    .map(|team| summarize(team, auction.purse, members.iter().filter(|m| m.team_id == team.id)))
                    .collect())
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    fn member(role: Role, country: &str, selling_price: f64) -> SquadMember {
        SquadMember { team_id: 1, role, country: country.to_string(), selling_price }
    }

    #[tokio::test]
    async fn summary_derives_purse_and_composition() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;
        let team = testing::seed_team(&store, auction.id, "T1").await;

        let members = vec![
            member(Role::Batter, "India", 250.0),
            member(Role::Bowler, "Australia", 100.0),
            member(Role::WicketKeeper, "india", 50.0),
            member(Role::AllRounder, "", 0.5),
        ];
        let summary = summarize(&team, auction.purse, &members);

        assert_eq!(summary.purse_remaining, 599.5);
        assert_eq!((summary.batter, summary.bowler, summary.all_rounder, summary.wicket_keeper), (1, 1, 1, 1));
        assert_eq!(summary.overseas, 1);
    }

    #[tokio::test]
    async fn squad_primitives_are_idempotent() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;
        let team = testing::seed_team(&store, auction.id, "T1").await;
        let player = testing::seed_player(&store, auction.id, 1, Role::Batter, "India").await;
        let mut conn = store.pool().acquire().await.unwrap();

        add_to_squad(&mut conn, team.id, player.id).await.unwrap();
        add_to_squad(&mut conn, team.id, player.id).await.unwrap();
        assert_eq!(squad_ids(&mut conn, team.id).await.unwrap(), vec![player.id]);

        remove_from_squad(&mut conn, team.id, player.id).await.unwrap();
        remove_from_squad(&mut conn, team.id, player.id).await.unwrap();
        assert!(squad_ids(&mut conn, team.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_player_cannot_join_two_squads() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;
        let first = testing::seed_team(&store, auction.id, "T1").await;
        let second = testing::seed_team(&store, auction.id, "T2").await;
        let player = testing::seed_player(&store, auction.id, 1, Role::Bowler, "India").await;
        let mut conn = store.pool().acquire().await.unwrap();

        add_to_squad(&mut conn, first.id, player.id).await.unwrap();
        let err = add_to_squad(&mut conn, second.id, player.id).await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
        assert_eq!(team_of(&mut conn, player.id).await.unwrap(), Some(first.id));
    }

    #[tokio::test]
    async fn summaries_cover_empty_teams() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;
        testing::seed_team(&store, auction.id, "T1").await;

        let summaries = team_summaries(&store, auction.id).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].purse_remaining, 1000.0);

        let missing = team_summaries(&store, auction.id + 100).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
