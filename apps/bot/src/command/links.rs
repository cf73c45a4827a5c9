use crate::platform::{EmbedAuthor, EmbedContent, Reply};

const LINKS: &[(&str, &str)] = &[
    ("Website", "[witnet.io](https://witnet.io/)"),
    ("Wallet", "[sheikah](https://sheikah.app/)"),
    ("Explorer", "[witnet.network](https://witnet.network/)"),
    ("Twitter", "[@witnet.io](https://twitter.com/witnet_io)"),
    ("Reddit", "[r/witnet](https://www.reddit.com/r/witnet/)"),
    ("Telegram", "[witnetio](https://t.me/witnetio)"),
    (
        "Whitepaper",
        "[witnet-whitepaper.pdf](https://witnet.io/witnet-whitepaper.pdf)",
    ),
];

pub fn render() -> Reply {
    Reply::Embed(EmbedContent {
        title: "Official Links".to_string(),
        author: Some(EmbedAuthor {
            name: "Witnet Network".to_string(),
            icon_url: "https://avatars.githubusercontent.com/u/33759927?s=280&v=4".to_string(),
            url: "https://witnet.io/".to_string(),
        }),
        fields: LINKS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        footer: Some("The next generation crypto Oracle.".to_string()),
    })
}
