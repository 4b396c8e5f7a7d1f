//! Fixed word lists used by feature extraction, text vectorization and the
//! heuristic layer.

/// Pressure / time-limit vocabulary
pub const URGENCY_WORDS: &[&str] = &[
    "urgent", "immediate", "asap", "now", "expires", "limited", "final",
];

/// Security-alarm vocabulary
pub const FEAR_WORDS: &[&str] = &[
    "suspended",
    "locked",
    "unauthorized",
    "breach",
    "alert",
    "compromised",
];

/// Credential / identity requests
pub const CREDENTIAL_WORDS: &[&str] = &[
    "password", "verify", "confirm", "login", "account", "identity",
];

/// Money movement vocabulary
pub const FINANCIAL_WORDS: &[&str] = &["payment", "invoice", "wire", "refund", "billing", "card"];

/// Free webmail providers. A corporate brand never sends from these.
pub const PUBLIC_WEBMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "protonmail.com",
    "live.com",
];

/// Official-sounding words in a sender's local part or display name
pub const OFFICIAL_SENDER_KEYWORDS: &[&str] = &["support", "security", "admin", "billing", "service"];

/// Brands commonly impersonated in phishing
pub const BRAND_KEYWORDS: &[&str] = &[
    "paypal",
    "amazon",
    "microsoft",
    "apple",
    "bank",
    "irs",
    "facebook",
    "google",
    "netflix",
    "wellsfargo",
    "chase",
];

/// Verified corporate sending domains
pub const SAFE_SENDER_DOMAINS: &[&str] = &[
    "amazon.com",
    "github.com",
    "google.com",
    "microsoft.com",
    "paypal.com",
    "stripe.com",
];

/// Link shortener hosts
pub const URL_SHORTENERS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rb.gy",
    "cutt.ly",
];

/// Call-to-action phrases
pub const CLICK_PHRASES: &[&str] = &[
    "click here",
    "click link",
    "click the link",
    "verify here",
];

/// Impersonal salutations
pub const GENERIC_GREETINGS: &[&str] = &[
    "dear customer",
    "dear user",
    "dear client",
    "dear account holder",
    "valued member",
];

/// English stop words dropped before n-gram construction
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "be", "became", "because", "become", "becomes", "becoming", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
    "due", "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "keep",
    "last", "latter", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile", "might",
    "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per",
    "perhaps", "please", "quite", "rather", "re", "same", "see", "seem", "seemed", "seeming",
    "seems", "several", "she", "should", "since", "so", "some", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "this", "those", "though", "through",
    "throughout", "thru", "thus", "to", "together", "too", "toward", "towards", "un", "under",
    "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever",
    "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein",
    "whereupon", "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
    "yours", "yourself", "yourselves",
];

/// True when `domain` is `candidate` or one of its subdomains.
pub fn domain_matches(domain: &str, candidate: &str) -> bool {
    domain == candidate
        || domain
            .strip_suffix(candidate)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// True when `domain` matches any entry of `list`.
pub fn domain_in<S: AsRef<str>>(domain: &str, list: &[S]) -> bool {
    list.iter().any(|d| domain_matches(domain, d.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_matches_exact_and_subdomain() {
        assert!(domain_matches("stripe.com", "stripe.com"));
        assert!(domain_matches("mail.stripe.com", "stripe.com"));
        assert!(!domain_matches("stripe-support.com", "stripe.com"));
        assert!(!domain_matches("notstripe.com", "stripe.com"));
    }

    #[test]
    fn test_stop_words_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }
}
