//! Fixed word lists driving sentiment, entity, tag and category heuristics.

use std::collections::HashSet;
use std::sync::LazyLock;

type WordSet = LazyLock<HashSet<&'static str>>;

const POSITIVE_WORDS: &[&str] = &[
    "accomplished", "amazing", "awesome", "beautiful", "best", "better", "brilliant", "calm",
    "celebrate", "cheerful", "confident", "delighted", "delightful", "enjoy", "enjoyed",
    "excellent", "excited", "exciting", "fantastic", "favorite", "fortunate", "friendly", "fun",
    "glad", "good", "grateful", "great", "happy", "healthy", "helpful", "hope", "hopeful",
    "impressive", "incredible", "inspired", "inspiring", "joy", "joyful", "kind", "laugh",
    "like", "liked", "love", "loved", "lovely", "lucky", "nice", "optimistic", "peaceful",
    "perfect", "pleased", "positive", "productive", "progress", "proud", "relaxed", "relaxing",
    "satisfied", "smile", "strong", "success", "successful", "superb", "thankful", "thrilled",
    "win", "wonderful", "won",
];

const NEGATIVE_WORDS: &[&str] = &[
    "afraid", "angry", "annoyed", "annoying", "anxious", "awful", "bad", "bored", "boring",
    "broken", "bug", "crash", "cried", "cry", "delay", "delayed", "depressed", "difficult",
    "disappointed", "disappointing", "error", "exhausted", "fail", "failed", "failure", "fear",
    "frustrated", "frustrating", "hate", "hated", "horrible", "hurt", "ill", "lonely", "lose",
    "lost", "mess", "miserable", "negative", "pain", "painful", "poor", "problem", "problems",
    "regret", "sad", "scared", "sick", "stress", "stressed", "stressful", "terrible", "tired",
    "ugly", "unhappy", "upset", "worried", "worry", "worse", "worst", "wrong",
];

const INTENSIFIERS: &[&str] = &[
    "absolutely", "deeply", "especially", "extremely", "highly", "incredibly", "really", "so",
    "super", "too", "totally", "truly", "very",
];

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "been", "before", "being", "both", "but", "by", "can", "could", "did", "do", "does",
    "down", "during", "each", "every", "few", "for", "from", "had", "has", "have", "he", "her",
    "here", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "many",
    "may", "me", "might", "more", "most", "much", "must", "my", "no", "not", "now", "of", "off",
    "on", "only", "or", "other", "our", "out", "over", "own", "same", "she", "should", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "to", "today", "tomorrow", "tonight", "up", "was", "we", "were", "what", "when",
    "where", "which", "who", "whom", "why", "will", "with", "would", "yes", "yesterday", "you",
    "your",
];

/// Words after which a noun phrase is expected.
const NOUN_CUES: &[&str] = &[
    "a", "about", "an", "any", "at", "each", "every", "for", "from", "her", "his", "in", "into",
    "its", "my", "of", "on", "our", "some", "that", "the", "their", "these", "this", "those",
    "with", "your",
];

const VERBS: &[&str] = &[
    "ate", "bought", "build", "built", "buy", "call", "called", "came", "come", "decide",
    "decided", "discuss", "discussed", "eat", "feel", "felt", "finish", "finished", "fix",
    "fixed", "forget", "forgot", "get", "go", "gone", "got", "help", "helped", "knew", "know",
    "learn", "learned", "made", "make", "meet", "met", "need", "paid", "pay", "plan", "planned",
    "ran", "read", "remember", "review", "reviewed", "run", "saw", "see", "seen", "send", "sent",
    "sleep", "slept", "start", "started", "take", "think", "thought", "took", "tried", "try",
    "visit", "visited", "want", "went", "write", "wrote",
];

/// `-ing`/`-ed` words that are not verbs.
const NOT_VERBS: &[&str] = &[
    "anything", "bed", "building", "ceiling", "evening", "everything", "feed", "morning",
    "nothing", "seed", "something", "speed", "thing", "wedding",
];

const NOUN_SUFFIXES: &[&str] = &[
    "ance", "ence", "ism", "ist", "ity", "ment", "ness", "ship", "sion", "tion",
];

const HONORIFICS: &[&str] = &["dr", "miss", "mr", "mrs", "ms", "prof", "sir"];

const FIRST_NAMES: &[&str] = &[
    "alex", "alice", "amy", "anna", "ben", "bob", "carlos", "charlie", "chris", "daniel",
    "david", "emily", "emma", "george", "grace", "hannah", "jack", "james", "jane", "jessica",
    "john", "julia", "kate", "laura", "linda", "lisa", "maria", "mark", "mary", "michael",
    "mike", "noah", "olivia", "paul", "peter", "rachel", "robert", "sam", "sarah", "sophie",
    "tom", "william",
];

const PLACES: &[&str] = &[
    "africa", "amsterdam", "asia", "athens", "australia", "barcelona", "beijing", "berlin",
    "boston", "brazil", "california", "canada", "chicago", "china", "dubai", "europe",
    "france", "germany", "hong kong", "india", "italy", "japan", "lisbon", "london",
    "los angeles", "madrid", "mexico", "new york", "paris", "prague", "rome", "san francisco",
    "seattle", "singapore", "spain", "sydney", "tokyo", "toronto", "vienna",
];

const ORGANIZATIONS: &[&str] = &[
    "amazon", "apple", "facebook", "github", "google", "ibm", "intel", "meta", "microsoft",
    "mozilla", "nasa", "netflix", "openai", "spotify", "tesla", "twitter",
];

const ORGANIZATION_SUFFIXES: &[&str] = &[
    "agency", "bank", "college", "company", "corp", "corporation", "foundation", "group", "inc",
    "institute", "labs", "llc", "ltd", "technologies", "university",
];

/// Category keyword rules. Order is significant: the first match wins.
pub(crate) const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Work",
        &[
            "boss", "client", "colleague", "deadline", "meeting", "office", "project", "report",
            "sprint", "team", "work",
        ],
    ),
    (
        "Personal",
        &[
            "birthday", "dad", "family", "friend", "friends", "home", "husband", "kids", "mom",
            "personal", "wife",
        ],
    ),
    (
        "Learning",
        &[
            "book", "class", "course", "learn", "learned", "learning", "lesson", "research",
            "study", "tutorial",
        ],
    ),
    (
        "Health",
        &[
            "diet", "doctor", "exercise", "fitness", "gym", "health", "medicine", "run",
            "sleep", "workout",
        ],
    ),
    (
        "Finance",
        &[
            "bank", "budget", "expense", "expenses", "finance", "invest", "investment", "money",
            "salary", "savings", "tax",
        ],
    ),
    (
        "Travel",
        &[
            "airport", "flight", "holiday", "hotel", "journey", "travel", "trip", "vacation",
            "visit",
        ],
    ),
];

fn set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static POSITIVE: WordSet = LazyLock::new(|| set(POSITIVE_WORDS));
static NEGATIVE: WordSet = LazyLock::new(|| set(NEGATIVE_WORDS));
static INTENSIFIER: WordSet = LazyLock::new(|| set(INTENSIFIERS));
static STOPWORD: WordSet = LazyLock::new(|| set(STOPWORDS));
static NOUN_CUE: WordSet = LazyLock::new(|| set(NOUN_CUES));
static VERB: WordSet = LazyLock::new(|| set(VERBS));
static NOT_VERB: WordSet = LazyLock::new(|| set(NOT_VERBS));
static HONORIFIC: WordSet = LazyLock::new(|| set(HONORIFICS));
static FIRST_NAME: WordSet = LazyLock::new(|| set(FIRST_NAMES));
static PLACE: WordSet = LazyLock::new(|| set(PLACES));
static ORGANIZATION: WordSet = LazyLock::new(|| set(ORGANIZATIONS));
static ORGANIZATION_SUFFIX: WordSet = LazyLock::new(|| set(ORGANIZATION_SUFFIXES));

/// Lexicon weight of a lowercase token: +1, -1 or 0.
pub fn polarity(word: &str) -> i32 {
    if POSITIVE.contains(word) {
        1
    } else if NEGATIVE.contains(word) {
        -1
    } else {
        0
    }
}

pub fn is_intensifier(word: &str) -> bool {
    INTENSIFIER.contains(word)
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORD.contains(word)
}

pub(crate) fn is_noun_cue(word: &str) -> bool {
    NOUN_CUE.contains(word)
}

pub(crate) fn is_known_verb(word: &str) -> bool {
    VERB.contains(word)
}

/// Known verb, or an inflected form recognised by suffix.
pub(crate) fn is_verb(word: &str) -> bool {
    if is_known_verb(word) {
        return true;
    }
    if NOT_VERB.contains(word) {
        return false;
    }
    (word.ends_with("ing") && word.len() >= 6) || (word.ends_with("ed") && word.len() >= 5)
}

pub(crate) fn has_noun_suffix(word: &str) -> bool {
    NOUN_SUFFIXES
        .iter()
        .any(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix))
}

pub(crate) fn is_honorific(word: &str) -> bool {
    HONORIFIC.contains(word)
}

pub(crate) fn is_first_name(word: &str) -> bool {
    FIRST_NAME.contains(word)
}

/// Matches a place name, or a phrase beginning with one ("New York City").
pub(crate) fn is_place(phrase: &str) -> bool {
    PLACE.contains(phrase)
        || PLACES.iter().any(|place| {
            phrase
                .strip_prefix(place)
                .is_some_and(|rest| rest.starts_with(' '))
        })
}

pub(crate) fn is_organization(phrase: &str) -> bool {
    ORGANIZATION.contains(phrase)
}

pub(crate) fn is_organization_suffix(word: &str) -> bool {
    ORGANIZATION_SUFFIX.contains(word)
}

/// True when a capitalised sentence-initial word should start a proper-noun run.
pub(crate) fn starts_entity(word: &str) -> bool {
    is_honorific(word)
        || is_first_name(word)
        || is_organization(word)
        || PLACE.contains(word)
        || PLACES
            .iter()
            .any(|place| place.split(' ').next() == Some(word) && place.contains(' '))
}
