//! Slug derivation and collision resolution.

use std::collections::HashSet;

use quill_common::AppResult;

/// Turn free text into a URL slug.
///
/// ASCII letters are lowercased, digits and underscores kept, whitespace and
/// hyphen runs collapse to a single `-`, everything else is dropped. Leading
/// and trailing `-`/`_` are stripped and the result is cut to `max_len`.
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len().min(max_len));
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }

    slug.truncate(max_len);
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Candidates checked per store lookup by [`allocate_slug`].
pub const CANDIDATE_BATCH: u64 = 16;

/// The `n`th candidate for `base`: `base` itself for 0, otherwise `base-n`
/// with the base shortened so the whole slug fits in `max_len`.
#[must_use]
pub fn slug_candidate(base: &str, max_len: usize, n: u64) -> String {
    if n == 0 {
        return base.to_string();
    }
    let suffix = format!("-{n}");
    let keep = max_len.saturating_sub(suffix.len()).min(base.len());
    format!("{}{suffix}", base[..keep].trim_end_matches('-'))
}

/// Pick the first free slug among `base`, `base-1`, `base-2`, ...
///
/// `taken` answers whether a candidate is already in use. The base is
/// shortened when needed so every candidate fits in `max_len`.
#[must_use]
pub fn resolve_unique_slug(base: &str, max_len: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut n: u64 = 0;
    loop {
        let candidate = slug_candidate(base, max_len, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Like [`resolve_unique_slug`], asking the store about candidates in batches.
///
/// `taken_among` receives a batch of candidates and returns the ones already
/// in use. Each candidate is looked up exactly, so a shortened base can never
/// hand out a slug that exists.
pub async fn allocate_slug<F, Fut>(base: &str, max_len: usize, mut taken_among: F) -> AppResult<String>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = AppResult<HashSet<String>>>,
{
    let mut start: u64 = 0;
    loop {
        let batch: Vec<String> = (start..start + CANDIDATE_BATCH)
            .map(|n| slug_candidate(base, max_len, n))
            .collect();
        let taken = taken_among(batch.clone()).await?;
        if let Some(free) = batch.into_iter().find(|c| !taken.contains(c)) {
            return Ok(free);
        }
        start += CANDIDATE_BATCH;
    }
}
