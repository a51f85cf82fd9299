//! Edit-distance name matching.
//!
//! Names are compared after lowercasing and dropping underscores, so
//! `company_id`, `companyId` and `CompanyID` are all the same name.

/// Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

pub fn clean_name(name: &str) -> String {
    name.to_lowercase().replace('_', "")
}

pub fn distance(a: &str, b: &str) -> usize {
    levenshtein(&clean_name(a), &clean_name(b))
}

/// Closest candidate to `target` with its distance.
///
/// The first candidate wins ties; ties are logged at debug level.
pub fn find_closest<'a, I>(target: &str, candidates: I) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let cleaned = clean_name(target);
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let d = levenshtein(&cleaned, &clean_name(candidate));
        match best {
            Some((_, best_distance)) if d > best_distance => {}
            Some((kept, best_distance)) if d == best_distance => {
                log::debug!(
                    "event=fuzzy_tie target={} kept={} skipped={} distance={}",
                    target,
                    kept,
                    candidate,
                    d
                );
            }
            _ => best = Some((candidate, d)),
        }
    }
    best
}
