use async_trait::async_trait;
use everdice_domain::{CampaignId, Character, CharacterId, HitPoints};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{from_json, parse_id, parse_timestamp, to_json};
use crate::infrastructure::ports::{CharacterRepo, RepoError};

const SELECT_COLUMNS: &str = "SELECT id, campaign_id, name, race, class, background, level, \
     abilities_json, hp_current, hp_max, armor_class, created_at, updated_at FROM characters";

pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_character(row: &SqliteRow) -> Result<Character, RepoError> {
    let id: String = row.get("id");
    let campaign_id: Option<String> = row.get("campaign_id");
    let level: i64 = row.get("level");
    let abilities_json: String = row.get("abilities_json");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Character {
        id: parse_id(&id)?,
        campaign_id: campaign_id.as_deref().map(parse_id::<CampaignId>).transpose()?,
        name: row.get("name"),
        race: row.get("race"),
        class: row.get("class"),
        background: row.get("background"),
        level: u8::try_from(level)
            .map_err(|_| RepoError::serialization(format!("Invalid level {}", level)))?,
        abilities: from_json(&abilities_json)?,
        hit_points: HitPoints {
            current: row.get("hp_current"),
            max: row.get("hp_max"),
        },
        armor_class: row.get("armor_class"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("character.get", e))?;

        row.as_ref().map(row_to_character).transpose()
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO characters (
                id, campaign_id, name, race, class, background, level, abilities_json,
                hp_current, hp_max, armor_class, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                campaign_id = excluded.campaign_id,
                name = excluded.name,
                race = excluded.race,
                class = excluded.class,
                background = excluded.background,
                level = excluded.level,
                abilities_json = excluded.abilities_json,
                hp_current = excluded.hp_current,
                hp_max = excluded.hp_max,
                armor_class = excluded.armor_class,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.campaign_id.map(|id| id.to_string()))
        .bind(&character.name)
        .bind(&character.race)
        .bind(&character.class)
        .bind(&character.background)
        .bind(i64::from(character.level))
        .bind(to_json(&character.abilities)?)
        .bind(character.hit_points.current)
        .bind(character.hit_points.max)
        .bind(character.armor_class)
        .bind(character.created_at.to_rfc3339())
        .bind(character.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.save", e))?;

        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("character.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("character.list", e))?;

        rows.iter().map(row_to_character).collect()
    }

    async fn list_in_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(&format!(
            "{} WHERE campaign_id = ? ORDER BY name",
            SELECT_COLUMNS
        ))
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.list_in_campaign", e))?;

        rows.iter().map(row_to_character).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::CampaignRepo;
    use crate::infrastructure::sqlite::test_support::{fixed_now, seed_campaign, test_pool};
    use crate::infrastructure::sqlite::SqliteCampaignRepo;

    #[tokio::test]
    async fn save_and_get_round_trip() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteCharacterRepo::new(pool);

        let mut thorin = Character::new("Thorin", "Dwarf", "Fighter", fixed_now());
        thorin.abilities.strength = 17;
        thorin.hit_points = HitPoints { current: 9, max: 12 };
        thorin.background = Some("Soldier".into());
        repo.save(&thorin).await.unwrap();

        let loaded = repo.get(thorin.id).await.unwrap().unwrap();
        assert_eq!(loaded, thorin);
        assert!(repo.get(CharacterId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_in_campaign_only_returns_members() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "The Lost Mine").await;
        let repo = SqliteCharacterRepo::new(pool);

        let mut member = Character::new("Mira", "Elf", "Wizard", fixed_now());
        member.campaign_id = Some(campaign.id);
        let loner = Character::new("Brom", "Human", "Rogue", fixed_now());
        repo.save(&member).await.unwrap();
        repo.save(&loner).await.unwrap();

        let members = repo.list_in_campaign(campaign.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Mira");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleting_campaign_releases_characters() {
        let (_dir, pool) = test_pool().await;
        let campaign = seed_campaign(&pool, "Short-lived").await;
        let repo = SqliteCharacterRepo::new(pool.clone());

        let mut member = Character::new("Mira", "Elf", "Wizard", fixed_now());
        member.campaign_id = Some(campaign.id);
        repo.save(&member).await.unwrap();

        SqliteCampaignRepo::new(pool).delete(campaign.id).await.unwrap();

        let loaded = repo.get(member.id).await.unwrap().unwrap();
        assert!(loaded.campaign_id.is_none());
    }

    #[tokio::test]
    async fn delete_missing_character_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteCharacterRepo::new(pool);
        let err = repo.delete(CharacterId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
