use crate::models::ContentCategory;

/// One entry in the curated static catalog
///
/// The last line of defense: hand-maintained, embedded in the binary, served
/// only when every network tier is unavailable.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub title: &'static str,
    pub year: Option<i32>,
    /// Genre for screen/music entries, cuisine for restaurants
    pub tag: &'static str,
    pub artist: Option<&'static str>,
    pub location: Option<&'static str>,
}

const fn screen(title: &'static str, year: i32, tag: &'static str) -> CatalogEntry {
    CatalogEntry {
        title,
        year: Some(year),
        tag,
        artist: None,
        location: None,
    }
}

const fn track(title: &'static str, artist: &'static str, tag: &'static str) -> CatalogEntry {
    CatalogEntry {
        title,
        year: None,
        tag,
        artist: Some(artist),
        location: None,
    }
}

const fn spot(title: &'static str, tag: &'static str, location: &'static str) -> CatalogEntry {
    CatalogEntry {
        title,
        year: None,
        tag,
        artist: None,
        location: Some(location),
    }
}

const MOVIES: &[CatalogEntry] = &[
    screen("The Shawshank Redemption", 1994, "drama"),
    screen("The Godfather", 1972, "drama"),
    screen("Pulp Fiction", 1994, "thriller"),
    screen("Spirited Away", 2001, "animation"),
    screen("Parasite", 2019, "thriller"),
    screen("The Dark Knight", 2008, "action"),
    screen("Blade Runner 2049", 2017, "sci-fi"),
    screen("Casablanca", 1942, "romance"),
    screen("Get Out", 2017, "horror"),
    screen("The Grand Budapest Hotel", 2014, "comedy"),
    screen("Interstellar", 2014, "sci-fi"),
    screen("Whiplash", 2014, "drama"),
];

const TV_SHOWS: &[CatalogEntry] = &[
    screen("Breaking Bad", 2008, "drama"),
    screen("The Wire", 2002, "drama"),
    screen("Fleabag", 2016, "comedy"),
    screen("Chernobyl", 2019, "drama"),
    screen("Severance", 2022, "sci-fi"),
    screen("Planet Earth II", 2016, "documentary"),
    screen("The Sopranos", 1999, "drama"),
    screen("Succession", 2018, "drama"),
    screen("Dark", 2017, "sci-fi"),
    screen("Ted Lasso", 2020, "comedy"),
];

const TRACKS: &[CatalogEntry] = &[
    track("Bohemian Rhapsody", "Queen", "rock"),
    track("So What", "Miles Davis", "jazz"),
    track("Juicy", "The Notorious B.I.G.", "hip-hop"),
    track("Clair de Lune", "Claude Debussy", "classical"),
    track("Blinding Lights", "The Weeknd", "pop"),
    track("Strobe", "deadmau5", "electronic"),
    track("Jolene", "Dolly Parton", "country"),
    track("Superstition", "Stevie Wonder", "r&b"),
    track("Master of Puppets", "Metallica", "metal"),
    track("Holocene", "Bon Iver", "indie"),
];

const RESTAURANTS: &[CatalogEntry] = &[
    spot("Lilia", "italian", "Brooklyn, NY"),
    spot("Cosme", "mexican", "New York, NY"),
    spot("Nom Wah Tea Parlor", "chinese", "New York, NY"),
    spot("Sushi Nakazawa", "japanese", "New York, NY"),
    spot("Dhamaka", "indian", "New York, NY"),
    spot("Uncle Boons", "thai", "New York, NY"),
    spot("Gramercy Tavern", "american", "New York, NY"),
    spot("Le Bernardin", "french", "New York, NY"),
    spot("Miznon", "mediterranean", "New York, NY"),
    spot("Atomix", "korean", "New York, NY"),
];

/// The curated list for a category
pub fn curated_entries(category: ContentCategory) -> &'static [CatalogEntry] {
    match category {
        ContentCategory::Movie => MOVIES,
        ContentCategory::TvShow => TV_SHOWS,
        ContentCategory::Music => TRACKS,
        ContentCategory::Restaurant => RESTAURANTS,
    }
}
