//! Interval complement over a media file's timeline.

/// A span of seconds within a media file, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Complement a discard list over `[0, total_duration]`.
///
/// `discard` must be sorted ascending by start and non-overlapping; the
/// skip-segment service guarantees this and it is not re-validated here.
/// The result is ascending and non-overlapping by construction. A discard
/// list covering the whole timeline yields an empty keep list; the caller
/// treats that as "nothing to keep" and skips trimming.
pub fn keep_segments(discard: &[Segment], total_duration: f64) -> Vec<Segment> {
    let (Some(first), Some(last)) = (discard.first(), discard.last()) else {
        return vec![Segment::new(0.0, total_duration)];
    };

    let mut keep = Vec::with_capacity(discard.len() + 1);

    if first.start != 0.0 {
        keep.push(Segment::new(0.0, first.start));
    }
    for pair in discard.windows(2) {
        keep.push(Segment::new(pair[0].end, pair[1].start));
    }
    if last.end < total_duration {
        keep.push(Segment::new(last.end, total_duration));
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(raw: &[(f64, f64)]) -> Vec<Segment> {
        raw.iter().map(|&(s, e)| Segment::new(s, e)).collect()
    }

    #[test]
    fn empty_discard_keeps_everything() {
        assert_eq!(keep_segments(&[], 20.0), segments(&[(0.0, 20.0)]));
    }

    #[test]
    fn interior_discard_splits_the_timeline() {
        let discard = segments(&[(5.0, 10.0)]);
        assert_eq!(
            keep_segments(&discard, 20.0),
            segments(&[(0.0, 5.0), (10.0, 20.0)])
        );
    }

    #[test]
    fn discards_touching_both_edges_leave_the_gap() {
        let discard = segments(&[(0.0, 3.0), (7.0, 20.0)]);
        assert_eq!(keep_segments(&discard, 20.0), segments(&[(3.0, 7.0)]));
    }

    #[test]
    fn leading_discard_suppresses_the_leading_keep() {
        let discard = segments(&[(0.0, 4.0)]);
        let keep = keep_segments(&discard, 20.0);
        assert_eq!(keep, segments(&[(4.0, 20.0)]));
        assert_ne!(keep[0].start, 0.0);
    }

    #[test]
    fn trailing_discard_suppresses_the_trailing_keep() {
        let discard = segments(&[(15.0, 20.0)]);
        assert_eq!(keep_segments(&discard, 20.0), segments(&[(0.0, 15.0)]));
    }

    #[test]
    fn full_span_discard_keeps_nothing() {
        let discard = segments(&[(0.0, 20.0)]);
        assert!(keep_segments(&discard, 20.0).is_empty());
    }

    #[test]
    fn keep_is_ascending_nonoverlapping_and_conserves_length() {
        let cases: &[(Vec<Segment>, f64)] = &[
            (segments(&[(5.0, 10.0)]), 20.0),
            (segments(&[(0.0, 3.0), (7.0, 20.0)]), 20.0),
            (segments(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]), 10.0),
            (segments(&[(0.0, 1.0), (1.0, 2.0)]), 2.5),
            (Vec::new(), 42.5),
        ];

        for (discard, total) in cases {
            let keep = keep_segments(discard, *total);

            for pair in keep.windows(2) {
                assert!(pair[0].end <= pair[1].start, "overlap in {keep:?}");
            }

            let kept: f64 = keep.iter().map(Segment::length).sum();
            let discarded: f64 = discard.iter().map(Segment::length).sum();
            assert!(
                (kept + discarded - total).abs() < 1e-9,
                "length not conserved for {discard:?}: kept {kept} + discarded {discarded} != {total}"
            );
        }
    }
}
