use crate::platform::{EmbedContent, Reply};

pub fn render(prefix: &str) -> Reply {
    Reply::Embed(EmbedContent {
        title: "Witnet Bot Commands".to_string(),
        author: None,
        fields: vec![
            (
                format!("{prefix}price"),
                "See the current price per WIT and the 24h change.".to_string(),
            ),
            (
                format!("{prefix}links"),
                "See the list of official links in Witnet community.".to_string(),
            ),
        ],
        footer: None,
    })
}
