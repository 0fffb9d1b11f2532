//! Running best/second-best score tracking.
//!
//! Every committed DP cell is offered to the tracker with its genomic end
//! position. Per lane, the tracker maintains the best score with the list of
//! positions achieving it, and a second-best score whose positions must keep
//! a minimum separation of `2 * read_len` from every committed best
//! position. A candidate second-best is first parked in a *waiting* slot and
//! only committed once the scan has moved far enough past it to witness the
//! separation; a new or repeated best inside that window voids the
//! candidate.
//!
//! The `MSONLY` specialization tracks nothing but the running maximum score;
//! `MAXONLY` keeps best-score positions but no second-best state. Both are
//! observationally identical to the full tracker restricted to those
//! outputs.

use crate::simd::SimdVec;

/// Per-lane score/position bookkeeping for one pass over the graph.
///
/// Positions are 1-based genomic coordinates of the last aligned base and
/// arrive in non-decreasing order (column-major graph traversal), which is
/// what makes single-slot "last position" tracking sufficient.
#[derive(Debug)]
pub struct Tracker<V: SimdVec, const MSONLY: bool, const MAXONLY: bool> {
    /// Minimum separation between reported positions: `2 * read_len`.
    rho: u32,
    max_score: V,
    sub_score: V,
    waiting_score: V,
    max_last_pos: Vec<u32>,
    sub_last_pos: Vec<u32>,
    /// Leftmost observation of the waiting candidate; 0 means no candidate.
    waiting_pos: Vec<u32>,
    waiting_last_pos: Vec<u32>,
    max_pos: Vec<Vec<u32>>,
    sub_pos: Vec<Vec<u32>>,
}

impl<V: SimdVec, const MSONLY: bool, const MAXONLY: bool> Tracker<V, MSONLY, MAXONLY> {
    pub fn new(read_len: usize) -> Self {
        Tracker {
            rho: 2 * read_len as u32,
            max_score: V::min_value(),
            sub_score: V::min_value(),
            waiting_score: V::min_value(),
            max_last_pos: vec![0; V::LANES],
            sub_last_pos: vec![0; V::LANES],
            waiting_pos: vec![0; V::LANES],
            waiting_last_pos: vec![0; V::LANES],
            max_pos: vec![Vec::new(); V::LANES],
            sub_pos: vec![Vec::new(); V::LANES],
        }
    }

    /// Reset all state for a fresh read group.
    pub fn reset(&mut self) {
        self.max_score = V::min_value();
        self.sub_score = V::min_value();
        self.waiting_score = V::min_value();
        self.max_last_pos.fill(0);
        self.sub_last_pos.fill(0);
        self.waiting_pos.fill(0);
        self.waiting_last_pos.fill(0);
        for list in &mut self.max_pos {
            list.clear();
        }
        for list in &mut self.sub_pos {
            list.clear();
        }
    }

    /// Reset position state ahead of the reverse-complement pass.
    ///
    /// Scores carry over from the forward pass so the reverse pass only
    /// records positions that meet or beat the forward strand; any leftover
    /// waiting candidate belongs to forward coordinates and is voided.
    pub fn begin_reverse(&mut self) {
        self.waiting_score = self.sub_score;
        self.max_last_pos.fill(0);
        self.sub_last_pos.fill(0);
        self.waiting_pos.fill(0);
        self.waiting_last_pos.fill(0);
        for list in &mut self.max_pos {
            list.clear();
        }
        for list in &mut self.sub_pos {
            list.clear();
        }
    }

    /// Offer one committed cell (all lanes) at genomic position `curr_pos`.
    #[inline]
    pub fn observe(&mut self, s: V, curr_pos: u32) {
        if MSONLY {
            self.max_score = s.max(self.max_score);
            return;
        }

        let eq_max = s.cmp_eq(self.max_score);
        if eq_max.any() {
            for i in 0..V::LANES {
                if !eq_max.test_lane(i) {
                    continue;
                }
                // repeat of the best score: a new occurrence only counts
                // once it clears the previous one by rho
                if curr_pos > self.max_last_pos[i] + self.rho {
                    self.max_pos[i].push(curr_pos);
                }
                self.max_last_pos[i] = curr_pos;
                if !MAXONLY {
                    // a waiting runner-up can no longer witness its
                    // separation from this max
                    self.waiting_pos[i] = 0;
                    self.waiting_score =
                        self.waiting_score.insert(i, self.sub_score.extract(i));
                    if let Some(&last) = self.sub_pos[i].last() {
                        if last + self.rho > curr_pos {
                            self.sub_pos[i].pop();
                        }
                    }
                }
            }
        }

        let gt_max = s.cmp_gt(self.max_score);
        if gt_max.any() {
            for i in 0..V::LANES {
                if !gt_max.test_lane(i) {
                    continue;
                }
                if let Some(&last) = self.max_pos[i].last() {
                    if last + self.rho > curr_pos {
                        self.max_pos[i].pop();
                    }
                }
                if !MAXONLY {
                    if !self.max_pos[i].is_empty() {
                        // the dethroned best still has an occurrence far
                        // enough back; it becomes the runner-up wholesale
                        self.sub_score =
                            self.sub_score.insert(i, self.max_score.extract(i));
                        self.sub_last_pos[i] = self.max_last_pos[i];
                        self.sub_pos[i] = self.max_pos[i].clone();
                    } else if let Some(&last) = self.sub_pos[i].last() {
                        if last + self.rho > curr_pos {
                            self.sub_pos[i].pop();
                        }
                    }
                    self.waiting_pos[i] = 0;
                    self.waiting_score =
                        self.waiting_score.insert(i, self.sub_score.extract(i));
                }
                self.max_score = self.max_score.insert(i, s.extract(i));
                self.max_last_pos[i] = curr_pos;
                self.max_pos[i].clear();
                self.max_pos[i].push(curr_pos);
            }
        }

        if MAXONLY {
            return;
        }

        let eq_waiting = s.cmp_eq(self.waiting_score);
        if eq_waiting.any() {
            for i in 0..V::LANES {
                if eq_waiting.test_lane(i) && self.waiting_pos[i] > 0 {
                    self.waiting_last_pos[i] = curr_pos;
                }
            }
        }

        let eq_sub = s.cmp_eq(self.sub_score);
        if eq_sub.any() {
            for i in 0..V::LANES {
                if !eq_sub.test_lane(i) {
                    continue;
                }
                let clear_of_max = self.max_pos[i]
                    .last()
                    .is_some_and(|&p| curr_pos > p + self.rho);
                let clear_of_sub = self.sub_pos[i]
                    .last()
                    .is_some_and(|&p| curr_pos > p + self.rho);
                if clear_of_max && clear_of_sub {
                    self.sub_pos[i].push(curr_pos);
                }
                self.sub_last_pos[i] = curr_pos;
            }
        }

        let between = s.cmp_gt(self.sub_score).and(s.cmp_lt(self.max_score));
        if between.any() {
            for i in 0..V::LANES {
                if !between.test_lane(i) {
                    continue;
                }
                // candidate runner-up: only if already clear of the best,
                // and better than any candidate currently parked
                if curr_pos > self.max_last_pos[i] + self.rho
                    && (self.waiting_pos[i] == 0
                        || s.extract(i) > self.waiting_score.extract(i))
                {
                    self.waiting_score = self.waiting_score.insert(i, s.extract(i));
                    self.waiting_pos[i] = curr_pos;
                    self.waiting_last_pos[i] = curr_pos;
                }
            }
        }

        let pending = self.waiting_score.cmp_gt(self.sub_score);
        if pending.any() {
            for i in 0..V::LANES {
                if !pending.test_lane(i) {
                    continue;
                }
                // the scan has moved rho past the candidate's newest
                // occurrence without a conflicting max: commit it
                if self.waiting_pos[i] > 0 && curr_pos > self.waiting_last_pos[i] + self.rho {
                    self.sub_score =
                        self.sub_score.insert(i, self.waiting_score.extract(i));
                    self.sub_last_pos[i] = self.waiting_last_pos[i];
                    self.sub_pos[i].clear();
                    self.sub_pos[i].push(self.waiting_pos[i]);
                    self.waiting_pos[i] = 0;
                }
            }
        }
    }

    /// End-of-pass commit: a candidate that still dominates the second-best
    /// and sits beyond the last best occurrence becomes the second-best.
    pub fn finish(&mut self) {
        if MSONLY || MAXONLY {
            return;
        }
        let pending = self.waiting_score.cmp_gt(self.sub_score);
        if pending.any() {
            for i in 0..V::LANES {
                if pending.test_lane(i) && self.max_last_pos[i] < self.waiting_pos[i] {
                    self.sub_score =
                        self.sub_score.insert(i, self.waiting_score.extract(i));
                    self.sub_last_pos[i] = self.waiting_last_pos[i];
                    self.sub_pos[i].clear();
                    self.sub_pos[i].push(self.waiting_pos[i]);
                    self.waiting_pos[i] = 0;
                }
            }
        }
    }

    pub fn max_score_vec(&self) -> V {
        self.max_score
    }

    pub fn sub_score_vec(&self) -> V {
        self.sub_score
    }

    pub fn max_positions(&self, lane: usize) -> &[u32] {
        &self.max_pos[lane]
    }

    pub fn sub_positions(&self, lane: usize) -> &[u32] {
        &self.sub_pos[lane]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V = wide::i8x16;
    type Full = Tracker<V, false, false>;

    fn offer(t: &mut Full, score: i8, pos: u32) {
        t.observe(V::splat(score), pos);
    }

    #[test]
    fn repeated_max_needs_separation() {
        // read_len 2, rho 4
        let mut t = Full::new(2);
        offer(&mut t, 6, 1);
        offer(&mut t, 6, 3); // within rho of pos 1: occurrence not listed
        offer(&mut t, 6, 8); // 8 > 3 + 4: listed
        t.finish();
        assert_eq!(t.max_positions(0), &[1, 8]);
    }

    #[test]
    fn separation_is_against_latest_occurrence() {
        let mut t = Full::new(2);
        offer(&mut t, 6, 1);
        offer(&mut t, 6, 4);
        offer(&mut t, 6, 6); // 6 > 1 + 4 but not > 4 + 4
        t.finish();
        assert_eq!(t.max_positions(0), &[1]);
    }

    #[test]
    fn new_max_demotes_distant_old_max_to_sub() {
        let mut t = Full::new(2);
        offer(&mut t, 5, 1);
        offer(&mut t, 7, 10); // old max far enough back: demoted
        t.finish();
        assert_eq!(t.max_positions(0), &[10]);
        assert_eq!(t.sub_positions(0), &[1]);
        assert_eq!(t.sub_score_vec().extract(0), 5);
    }

    #[test]
    fn new_max_abandons_adjacent_old_max() {
        let mut t = Full::new(2);
        offer(&mut t, 5, 9);
        offer(&mut t, 7, 10); // old max within rho: dropped, not demoted
        t.finish();
        assert_eq!(t.max_positions(0), &[10]);
        assert!(t.sub_positions(0).is_empty());
    }

    #[test]
    fn waiting_candidate_commits_after_separation() {
        let mut t = Full::new(2);
        offer(&mut t, 9, 1);
        offer(&mut t, 4, 7); // parked: clear of max by rho
        offer(&mut t, 0, 12); // 12 > 7 + 4: committed
        t.finish();
        assert_eq!(t.sub_score_vec().extract(0), 4);
        assert_eq!(t.sub_positions(0), &[7]);
    }

    #[test]
    fn max_repeat_voids_waiting_candidate() {
        let mut t = Full::new(2);
        offer(&mut t, 9, 1);
        offer(&mut t, 4, 7); // parked
        offer(&mut t, 9, 8); // max repeats before separation is witnessed
        t.finish();
        assert_eq!(t.max_positions(0), &[1, 8]);
        assert!(t.sub_positions(0).is_empty());
        assert_eq!(t.sub_score_vec().extract(0), i8::MIN);
    }

    #[test]
    fn end_of_pass_commits_live_candidate() {
        let mut t = Full::new(2);
        offer(&mut t, 9, 1);
        offer(&mut t, 4, 7); // parked, pass ends before curr_pos clears it
        t.finish();
        assert_eq!(t.sub_score_vec().extract(0), 4);
        assert_eq!(t.sub_positions(0), &[7]);
    }

    #[test]
    fn better_candidate_replaces_parked_one() {
        let mut t = Full::new(2);
        offer(&mut t, 9, 1);
        offer(&mut t, 3, 7);
        offer(&mut t, 5, 9); // better candidate while parked
        t.finish();
        assert_eq!(t.sub_score_vec().extract(0), 5);
        assert_eq!(t.sub_positions(0), &[9]);
    }

    #[test]
    fn msonly_tracks_scores_without_positions() {
        let mut t: Tracker<V, true, false> = Tracker::new(2);
        t.observe(V::splat(5), 1);
        t.observe(V::splat(9), 10);
        t.observe(V::splat(2), 20);
        t.finish();
        assert_eq!(t.max_score_vec().extract(0), 9);
        assert!(t.max_positions(0).is_empty());
    }

    #[test]
    fn maxonly_keeps_max_positions_only() {
        let mut t: Tracker<V, false, true> = Tracker::new(2);
        t.observe(V::splat(5), 1);
        t.observe(V::splat(9), 10);
        t.observe(V::splat(5), 20);
        t.finish();
        assert_eq!(t.max_positions(0), &[10]);
        assert!(t.sub_positions(0).is_empty());
    }

    #[test]
    fn lanes_track_independently() {
        let mut t = Full::new(2);
        t.observe(V::splat(3).insert(1, 8), 2);
        t.observe(V::splat(8).insert(1, 3), 9);
        t.finish();
        assert_eq!(t.max_score_vec().extract(0), 8);
        assert_eq!(t.max_positions(0), &[9]);
        assert_eq!(t.max_score_vec().extract(1), 8);
        assert_eq!(t.max_positions(1), &[2]);
    }
}
