use crate::digest::Digest;
use crate::error::WindowExhausted;
use crate::slug::Slug;

/// Cuts the candidate slug for `attempt` out of `digest`.
///
/// The candidate is `digest[attempt..attempt + length]`. Attempts must be
/// tried in increasing order from 0 so that every caller walks the same
/// sequence of candidates for the same URL.
pub fn slug_at(digest: &Digest, length: usize, attempt: usize) -> Result<Slug, WindowExhausted> {
    let exhausted = WindowExhausted {
        digest_len: digest.len(),
        length,
        attempt,
    };

    let end = attempt.checked_add(length).ok_or(exhausted)?;
    if length == 0 || end > digest.len() {
        return Err(exhausted);
    }

    Ok(Slug::new_unchecked(&digest.as_str()[attempt..end]))
}

/// The ordered candidate windows of a digest.
///
/// Yields `digest.len() - length + 1` slugs, attempt 0 first.
#[derive(Debug, Clone)]
pub struct SlugWindows<'a> {
    digest: &'a Digest,
    length: usize,
    attempt: usize,
}

impl<'a> SlugWindows<'a> {
    pub fn new(digest: &'a Digest, length: usize) -> Self {
        Self {
            digest,
            length,
            attempt: 0,
        }
    }

    /// Offset of the next candidate to be yielded.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// Returns the next candidate, or the exhaustion error once none remain.
    pub fn next_candidate(&mut self) -> Result<Slug, WindowExhausted> {
        let slug = slug_at(self.digest, self.length, self.attempt)?;
        self.attempt += 1;
        Ok(slug)
    }
}

impl Iterator for SlugWindows<'_> {
    type Item = Slug;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_candidate().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DIGEST_LEN;

    fn digest() -> Digest {
        Digest::of("https://github.com/darioblanco")
    }

    #[test]
    fn first_window() {
        assert_eq!(slug_at(&digest(), 6, 0).unwrap().as_str(), "64fc5e");
    }

    #[test]
    fn shifted_window() {
        assert_eq!(slug_at(&digest(), 6, 1).unwrap().as_str(), "4fc5e4");
        assert_eq!(slug_at(&digest(), 6, 26).unwrap().as_str(), "a466ff");
    }

    #[test]
    fn exhausted_past_the_end() {
        let err = slug_at(&digest(), 6, 27).unwrap_err();
        assert_eq!(
            err,
            WindowExhausted {
                digest_len: DIGEST_LEN,
                length: 6,
                attempt: 27,
            }
        );
    }

    #[test]
    fn zero_length_is_exhausted() {
        assert!(slug_at(&digest(), 0, 0).is_err());
    }

    #[test]
    fn overflowing_attempt_is_exhausted() {
        assert!(slug_at(&digest(), 6, usize::MAX).is_err());
    }

    #[test]
    fn full_length_has_one_window() {
        let digest = digest();
        let windows: Vec<_> = SlugWindows::new(&digest, DIGEST_LEN).collect();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].as_str(), digest.as_str());
    }

    #[test]
    fn window_count_is_d_minus_l_plus_one() {
        let digest = digest();
        for length in 1..=DIGEST_LEN {
            let mut windows = SlugWindows::new(&digest, length);
            let count = windows.by_ref().count();
            assert_eq!(count, DIGEST_LEN - length + 1);
            assert!(windows.next_candidate().is_err());
        }
    }

    #[test]
    fn windows_are_in_attempt_order() {
        let digest = digest();
        let mut windows = SlugWindows::new(&digest, 4);
        for attempt in 0..=(DIGEST_LEN - 4) {
            assert_eq!(windows.attempt(), attempt);
            let slug = windows.next_candidate().unwrap();
            assert_eq!(slug, slug_at(&digest, 4, attempt).unwrap());
        }
    }
}
