use crate::models::GuildMembership;
use crate::services::IdentityResolver;

#[derive(Debug, Clone, PartialEq)]
pub struct GuildRow {
    pub id: String,
    pub name: String,
    pub icon_url: Option<String>,
    pub member_count: u64,
    pub voice_member_count: u64,
}

impl GuildRow {
    pub fn counts_label(&self) -> String {
        format!(
            "Members count: {} ; Voice online: {}",
            self.member_count, self.voice_member_count
        )
    }
}

/// Flattens the fetched list into rows, keeping server order.
pub fn guild_rows(guilds: Vec<GuildMembership>, identity: &dyn IdentityResolver) -> Vec<GuildRow> {
    guilds
        .into_iter()
        .map(|guild| GuildRow {
            icon_url: identity.guild_icon_url(&guild.id, guild.icon.as_deref()),
            id: guild.id,
            name: guild.name,
            member_count: guild.member_count,
            voice_member_count: guild.voice_member_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CdnIdentityResolver;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_keep_order_and_counts() {
        let rows = guild_rows(
            vec![
                GuildMembership {
                    id: "2".into(),
                    icon: None,
                    name: "Second".into(),
                    member_count: 20,
                    voice_member_count: 3,
                },
                GuildMembership {
                    id: "1".into(),
                    icon: Some("abc".into()),
                    name: "First".into(),
                    member_count: 10,
                    voice_member_count: 0,
                },
            ],
            &CdnIdentityResolver,
        );

        assert_eq!(
            rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>(),
            vec!["Second", "First"]
        );
        assert_eq!(rows[0].icon_url, None);
        assert_eq!(
            rows[1].icon_url.as_deref(),
            Some("https://cdn.discordapp.com/icons/1/abc.png")
        );
        assert_eq!(rows[0].counts_label(), "Members count: 20 ; Voice online: 3");
    }
}
