//! Static image references used before and after the character search.

pub const GLOBAL_DEFAULT_AVATAR: &str = "https://cdn.myanimelist.net/images/questionmark_23.gif";

const KNOWN_CHARACTERS: &[(&str, &str)] = &[
    ("Naruto", "https://cdn.myanimelist.net/images/characters/2/284121.jpg"),
    ("Naruto Uzumaki", "https://cdn.myanimelist.net/images/characters/2/284121.jpg"),
    ("Sasuke Uchiha", "https://cdn.myanimelist.net/images/characters/9/131317.jpg"),
    ("Kakashi Hatake", "https://cdn.myanimelist.net/images/characters/7/284129.jpg"),
    ("Sakura Haruno", "https://cdn.myanimelist.net/images/characters/9/69275.jpg"),
    ("Itachi Uchiha", "https://cdn.myanimelist.net/images/characters/9/284122.jpg"),
    ("Shikamaru Nara", "https://cdn.myanimelist.net/images/characters/13/74397.jpg"),
    ("Hinata Hyuga", "https://cdn.myanimelist.net/images/characters/10/284123.jpg"),
    ("Gaara", "https://cdn.myanimelist.net/images/characters/5/72466.jpg"),
    ("Rock Lee", "https://cdn.myanimelist.net/images/characters/11/66437.jpg"),
    ("Jiraiya", "https://cdn.myanimelist.net/images/characters/4/73829.jpg"),
    ("Tanjiro Kamado", "https://cdn.myanimelist.net/images/characters/6/386735.jpg"),
    ("Nezuko Kamado", "https://cdn.myanimelist.net/images/characters/2/378254.jpg"),
    ("Zenitsu Agatsuma", "https://cdn.myanimelist.net/images/characters/10/459689.jpg"),
    ("Inosuke Hashibira", "https://cdn.myanimelist.net/images/characters/13/377902.jpg"),
    ("Giyu Tomioka", "https://cdn.myanimelist.net/images/characters/4/390295.jpg"),
    ("Kyojuro Rengoku", "https://cdn.myanimelist.net/images/characters/11/412463.jpg"),
    ("Shinobu Kocho", "https://cdn.myanimelist.net/images/characters/3/389957.jpg"),
];

const SERIES_DEFAULTS: &[(&str, &str)] = &[
    ("Naruto", "https://cdn.myanimelist.net/images/anime/13/17405.jpg"),
    ("Demon Slayer", "https://cdn.myanimelist.net/images/anime/1286/99889.jpg"),
];

/// Exact, case-sensitive lookup by character name.
pub fn known_character_image(character_name: &str) -> Option<&'static str> {
    KNOWN_CHARACTERS
        .iter()
        .find(|(name, _)| *name == character_name)
        .map(|(_, url)| *url)
}

pub fn series_default_image(anime: &str) -> Option<&'static str> {
    SERIES_DEFAULTS
        .iter()
        .find(|(series, _)| *series == anime)
        .map(|(_, url)| *url)
}
