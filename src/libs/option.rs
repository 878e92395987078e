use std::str::FromStr;

/// Split a raw aligner option string into logical tokens.
///
/// Tokens are separated by single spaces. A token ending with a
/// backslash escapes the following space, so path arguments that
/// contain spaces come back as one token with the space restored.
///
/// ```
/// let tokens = balign::tokenize(r"-bestn 10 -sa my\ dir/ref.sa");
/// assert_eq!(tokens, vec!["-bestn", "10", "-sa", "my dir/ref.sa"]);
/// ```
pub fn tokenize(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return vec![];
    }

    let mut tokens: Vec<String> = vec![];
    let mut escaped = false;
    for item in raw.split(' ') {
        let ends = item.ends_with('\\');
        let piece = if ends { &item[..item.len() - 1] } else { item };

        if escaped {
            // Continuation of a space-bearing path
            let last = tokens.last_mut().unwrap();
            last.push(' ');
            last.push_str(piece);
        } else {
            tokens.push(piece.to_string());
        }
        escaped = ends;
    }

    tokens
}

/// How multiple equally-scoring hits are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HitPolicy {
    Random,
    All,
    #[default]
    Allbest,
    Randombest,
    Leftmost,
}

impl HitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitPolicy::Random => "random",
            HitPolicy::All => "all",
            HitPolicy::Allbest => "allbest",
            HitPolicy::Randombest => "randombest",
            HitPolicy::Leftmost => "leftmost",
        }
    }
}

impl FromStr for HitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(HitPolicy::Random),
            "all" => Ok(HitPolicy::All),
            "allbest" => Ok(HitPolicy::Allbest),
            "randombest" => Ok(HitPolicy::Randombest),
            "leftmost" => Ok(HitPolicy::Leftmost),
            _ => Err(format!("Unknown hit policy: {}", s)),
        }
    }
}

/// The mutually exclusive family of CCS read handling modes. The
/// `as_str` value is the verbatim blasr flag-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcsMode {
    Useccs,
    Useccsall,
    Useccsdenovo,
}

impl CcsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CcsMode::Useccs => "useccs",
            CcsMode::Useccsall => "useccsall",
            CcsMode::Useccsdenovo => "useccsdenovo",
        }
    }
}

impl FromStr for CcsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "useccs" => Ok(CcsMode::Useccs),
            "useccsall" => Ok(CcsMode::Useccsall),
            "useccsdenovo" => Ok(CcsMode::Useccsdenovo),
            _ => Err(format!("Unknown ccs mode: {}", s)),
        }
    }
}

/// Typed alignment options, merged from the command line and from
/// whatever the user passed through `--algorithm-options`.
///
/// After a service resolved the raw options, `algorithm_options`
/// holds only the tokens the service did not recognize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignOptions {
    /// Cap on reported alignments per query, blasr `-bestn`
    pub max_hits: Option<i32>,
    /// Minimum seed length, blasr `-minMatch`
    pub min_anchor_size: Option<i32>,
    /// Worker threads, last writer wins
    pub nproc: Option<i32>,
    /// Minimum subread/read length filter
    pub min_length: Option<i32>,
    pub no_split_subreads: bool,
    pub concordant: bool,
    /// Random seed, 0 means unset at render time
    pub seed: Option<i32>,
    pub hit_policy: HitPolicy,
    pub useccs: Option<CcsMode>,
    /// Free-form aligner-native flags
    pub algorithm_options: Option<String>,
}
