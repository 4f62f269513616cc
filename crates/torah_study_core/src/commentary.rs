//! crates/torah_study_core/src/commentary.rs
//!
//! Pure classification of a source into one of four canonical commentary
//! sets. No I/O, no state; calling twice with identical input yields an
//! identical list.

use crate::domain::CommentaryConfig;

/// A fixed commentary bucket with its keyword list and commentator roster.
struct Bucket {
    keywords: &'static [&'static str],
    commentators: &'static [&'static str],
}

const TANACH: Bucket = Bucket {
    keywords: &[
        "genesis", "exodus", "leviticus", "numbers", "deuteronomy", "bereshit", "shemot",
        "vayikra", "bamidbar", "devarim", "psalms", "tehillim", "proverbs", "mishlei",
        "isaiah", "yeshayahu", "jeremiah", "yirmiyahu", "ezekiel", "yechezkel", "samuel",
        "kings", "melachim", "joshua", "yehoshua", "judges", "shoftim", "ruth", "esther",
        "job", "iyov", "ecclesiastes", "kohelet", "song of songs", "shir hashirim",
        "lamentations", "eichah", "daniel", "ezra", "nechemiah", "chronicles", "torah",
        "chumash", "parsha", "parashat",
    ],
    commentators: &["Rashi", "Ramban", "Ibn Ezra", "Sforno"],
};

const TALMUD: Bucket = Bucket {
    keywords: &[
        "talmud", "gemara", "mishnah", "berachot", "berakhot", "shabbat", "eruvin",
        "pesachim", "shekalim", "yoma", "sukkah", "beitzah", "rosh hashanah", "taanit",
        "megillah", "moed katan", "chagigah", "yevamot", "ketubot", "nedarim", "nazir",
        "sotah", "gittin", "kiddushin", "bava kamma", "bava metzia", "bava batra",
        "sanhedrin", "makkot", "shevuot", "avodah zarah", "horayot", "zevachim",
        "menachot", "chullin", "bechorot", "arachin", "temurah", "keritot", "meilah",
        "niddah", "pirkei avot", "avot",
    ],
    commentators: &["Rashi", "Tosafot", "Maharsha", "Rif"],
};

const RAMBAM: Bucket = Bucket {
    keywords: &[
        "rambam", "maimonides", "mishneh torah", "hilchot", "hilkhot", "moreh nevuchim",
        "guide for the perplexed", "sefer hamitzvot", "yad hachazakah",
    ],
    commentators: &["Kesef Mishneh", "Maggid Mishneh", "Lechem Mishneh", "Radbaz"],
};

const SHULCHAN_ARUCH: Bucket = Bucket {
    keywords: &[
        "shulchan aruch", "orach chaim", "orach chayim", "yoreh deah", "even haezer",
        "even ha'ezer", "choshen mishpat", "kitzur shulchan aruch", "aruch hashulchan",
        "tur",
    ],
    commentators: &["Mishnah Berurah", "Shach", "Taz", "Rema"],
};

/// Classification precedence: more specific legal/codification works take
/// priority over the broad general-Torah bucket.
const PRIORITY_ORDER: [&Bucket; 4] = [&RAMBAM, &SHULCHAN_ARUCH, &TALMUD, &TANACH];

/// Buckets in declaration order, used for the final fallback scan after the
/// priority pass found nothing.
const ALL_BUCKETS: [&Bucket; 4] = [&TANACH, &TALMUD, &RAMBAM, &SHULCHAN_ARUCH];

impl Bucket {
    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|kw| haystack.contains(kw))
    }

    fn first_two(&self) -> Vec<String> {
        self.commentators
            .iter()
            .take(2)
            .map(|c| c.to_string())
            .collect()
    }
}

/// Selects the commentary pairing for a source: zero or exactly two
/// commentator names, in the matched bucket's fixed order.
pub fn select_commentaries(config: &CommentaryConfig) -> Vec<String> {
    let topic = config.topic_selected.to_lowercase();

    // Spiritual-growth topics never get commentary suggestions,
    // regardless of which source-type keywords are present.
    if topic.contains("spiritual") || topic.contains("growth") {
        return Vec::new();
    }

    let haystack = format!(
        "{} {} {}",
        config.source_title, config.source_range, config.excerpt
    )
    .to_lowercase();

    for bucket in PRIORITY_ORDER {
        if bucket.matches(&haystack) {
            return bucket.first_two();
        }
    }
    for bucket in ALL_BUCKETS {
        if bucket.matches(&haystack) {
            return bucket.first_two();
        }
    }

    // Nothing in the text matched; fall back to the requested topic itself.
    let by_topic = if topic.contains("talmud") {
        Some(&TALMUD)
    } else if topic.contains("halacha") {
        Some(&SHULCHAN_ARUCH)
    } else if topic.contains("tanach") || topic.contains("tanakh") {
        Some(&TANACH)
    } else {
        None
    };

    by_topic.map(Bucket::first_two).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(topic: &str, title: &str, range: &str, excerpt: &str) -> CommentaryConfig {
        CommentaryConfig {
            topic_selected: topic.to_string(),
            source_title: title.to_string(),
            source_range: range.to_string(),
            excerpt: excerpt.to_string(),
        }
    }

    #[test]
    fn tanach_source_gets_tanach_pair() {
        let selected = select_commentaries(&config("Torah", "Creation", "Genesis 1:1-2:3", ""));
        assert_eq!(selected, vec!["Rashi".to_string(), "Ramban".to_string()]);
    }

    #[test]
    fn talmud_source_gets_talmud_pair() {
        let selected = select_commentaries(&config("Ethics", "Daf Yomi", "Berachot 2a", ""));
        assert_eq!(selected, vec!["Rashi".to_string(), "Tosafot".to_string()]);
    }

    #[test]
    fn rambam_wins_over_tanach_when_both_match() {
        // "Mishneh Torah, Hilchot Teshuvah" also mentions a Chumash book.
        let selected = select_commentaries(&config(
            "Repentance",
            "Mishneh Torah, Hilchot Teshuvah",
            "",
            "Drawing on Devarim 30",
        ));
        assert_eq!(
            selected,
            vec!["Kesef Mishneh".to_string(), "Maggid Mishneh".to_string()]
        );
    }

    #[test]
    fn shulchan_aruch_wins_over_talmud() {
        let selected = select_commentaries(&config(
            "Halacha",
            "Shulchan Aruch, Orach Chaim 271",
            "",
            "Based on the gemara in Pesachim",
        ));
        assert_eq!(
            selected,
            vec!["Mishnah Berurah".to_string(), "Shach".to_string()]
        );
    }

    #[test]
    fn spiritual_topics_are_always_empty() {
        for topic in ["Spiritual Growth", "SPIRITUAL", "growth mindset", "Personal Growth"] {
            let selected =
                select_commentaries(&config(topic, "Genesis study", "Genesis 1:1", "talmud"));
            assert!(selected.is_empty(), "topic {:?} must select nothing", topic);
        }
    }

    #[test]
    fn topic_fallback_when_text_matches_nothing() {
        let selected = select_commentaries(&config("Daily Halacha", "Morning routine", "", ""));
        assert_eq!(
            selected,
            vec!["Mishnah Berurah".to_string(), "Shach".to_string()]
        );

        let selected = select_commentaries(&config("Intro to Tanakh", "Overview", "", ""));
        assert_eq!(selected, vec!["Rashi".to_string(), "Ramban".to_string()]);
    }

    #[test]
    fn unmatched_input_returns_empty() {
        assert!(select_commentaries(&config("History", "Second Temple era", "", "")).is_empty());
    }

    #[test]
    fn selection_is_idempotent_and_capped() {
        let cfg = config("Torah", "Weekly portion", "Shemot 3:1-4:17", "the burning bush");
        let first = select_commentaries(&cfg);
        let second = select_commentaries(&cfg);
        assert_eq!(first, second);
        assert!(first.len() == 2 || first.is_empty());
    }

    #[test]
    fn every_path_returns_zero_or_two() {
        let cases = [
            config("Torah", "Genesis 1", "", ""),
            config("x", "no match at all", "", ""),
            config("spiritual", "Genesis 1", "", ""),
            config("talmud basics", "", "", ""),
            config("Halacha", "Hilchot Shabbat", "", ""),
        ];
        for cfg in cases {
            let n = select_commentaries(&cfg).len();
            assert!(n == 0 || n == 2, "got {} entries", n);
        }
    }
}
