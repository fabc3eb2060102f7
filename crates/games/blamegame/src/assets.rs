//! Translations and theme tokens.

use runtime::{ThemeExtensions, Translations};

const EN: &[(&str, &str)] = &[
    ("intro.title", "The Blame Game"),
    ("intro.hint", "Type `start` when everyone is ready."),
    ("setup.title", "Who is playing?"),
    ("setup.players", "Players"),
    ("setup.need_more", "Add at least two players, then type `begin`."),
    ("setup.ready", "Type `begin` to start."),
    ("playing.title", "Round {round} of {rounds}"),
    ("playing.reader", "{reader} reads the next mishap. Whose fault was it?"),
    ("playing.hint", "Type `next` for the next round."),
    ("summary.title", "That's everyone's fault!"),
    ("summary.rounds", "Rounds played: {rounds}"),
    ("summary.hint", "Type `restart` to play again."),
];

const DE: &[(&str, &str)] = &[
    ("intro.title", "Das Schuldspiel"),
    ("intro.hint", "Tippe `start`, wenn alle bereit sind."),
    ("setup.title", "Wer spielt mit?"),
    ("setup.players", "Mitspieler"),
    ("setup.need_more", "Füge mindestens zwei Mitspieler hinzu und tippe dann `begin`."),
    ("setup.ready", "Tippe `begin` zum Starten."),
    ("playing.title", "Runde {round} von {rounds}"),
    ("playing.reader", "{reader} liest das nächste Missgeschick vor. Wer ist schuld?"),
    ("playing.hint", "Tippe `next` für die nächste Runde."),
    ("summary.title", "Alle sind schuld!"),
    ("summary.rounds", "Gespielte Runden: {rounds}"),
    ("summary.hint", "Tippe `restart` für eine neue Partie."),
];

pub fn translations() -> Translations {
    let mut translations = Translations::new();
    for (locale, entries) in [("en", EN), ("de", DE)] {
        for (key, text) in entries {
            translations.insert(locale, *key, *text);
        }
    }
    translations
}

pub fn theme() -> ThemeExtensions {
    ThemeExtensions::new()
        .with("color.accent", "#ff6b6b")
        .with("color.surface", "#1e1e2e")
        .with("font.display", "Fredoka")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_english_key_has_a_german_text() {
        let translations = translations();
        for (key, _) in EN {
            assert!(
                translations.lookup("de", "de", key).is_some(),
                "missing German text for {key}"
            );
        }
        assert_eq!(EN.len(), DE.len());
    }
}
