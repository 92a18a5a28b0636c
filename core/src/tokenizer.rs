use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

lazy_static! {
    // bounded repetition of unicode \w compiles to a large automaton
    static ref RE: Regex = RegexBuilder::new(r"[#@\w](['\-]?\w){2,24}")
        .size_limit(64 << 20)
        .build()
        .expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let english: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn","couldn't",
            "d","did","didn","didn't","do","does","doesn","doesn't","doing","don","don't","down","during",
            "each","few","for","from","further",
            "had","hadn","hadn't","has","hasn","hasn't","have","haven","haven't","having","he","he'd","he'll","he's","her","here","hers","herself","him","himself","his","how",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn","isn't","it","it'd","it'll","it's","its","itself",
            "just","ll","m","ma","me","mightn","mightn't","more","most","mustn","mustn't","my","myself",
            "needn","needn't","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","shan't","she","she'd","she'll","she's","should","should've","shouldn","shouldn't","so","some","such",
            "t","than","that","that'll","the","their","theirs","them","themselves","then","there","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","wasn't","we","we'd","we'll","we're","we've","were","weren","weren't","what","when","where","which","while","who","whom","why","will","with","won","won't","wouldn","wouldn't",
            "y","you","you'd","you'll","you're","you've","your","yours","yourself","yourselves",
        ];
        // boilerplate that occurs in nearly every article of the corpus
        let corpus: &[&str] = &[
            "category","references","also","external","links","may","first","see","history","people",
            "one","two","part","thumb","including","second","following","many","however","would","became",
        ];
        english.iter().chain(corpus).copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text the way the index was built: lowercase, match word-like runs
/// of 3 to 26 characters, drop stop words. Terms come back in text order.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, false)
}

/// Like [`tokenize`], optionally reducing each term to its English stem.
/// Only useful against an index that was built with stemming.
pub fn tokenize_with(text: &str, stem: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|tok| !is_stopword(tok))
        .map(|tok| if stem { STEMMER.stem(tok).into_owned() } else { tok.to_string() })
        .collect()
}
