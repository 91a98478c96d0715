//! Named occurrence counters, used for NSEC-kind and signing-algorithm
//! usage reporting.
//!
//! Grounded on `examples/original_source/tests/application/Statistics.py`.
//! `dec` is kept symmetric with `inc` -- it always adjusts the running
//! total, whether the key pre-existed or not -- rather than the uneven
//! behavior callers of the original relied on (see DESIGN.md, Open
//! Question (b)).

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub value: i64,
    /// `None` when the running total is zero (percent is undefined).
    pub percent: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Statistics {
    title: String,
    track: HashMap<String, i64>,
    order: Vec<String>,
    sum: i64,
}

impl Statistics {
    pub fn new(title: impl Into<String>) -> Self {
        Statistics {
            title: title.into(),
            track: HashMap::new(),
            order: Vec::new(),
            sum: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Adds `delta` (default 1 via callers) to `name`'s tally and to the
    /// running total. Returns the new value for `name`.
    pub fn inc(&mut self, name: &str, delta: i64) -> i64 {
        if !self.track.contains_key(name) {
            self.order.push(name.to_string());
        }
        let v = self.track.entry(name.to_string()).or_insert(0);
        *v += delta;
        self.sum += delta;
        *v
    }

    /// Subtracts `delta` from `name`'s tally and the running total.
    /// Symmetric with `inc`: `dec(name, d)` is exactly `inc(name, -d)`.
    pub fn dec(&mut self, name: &str, delta: i64) -> i64 {
        self.inc(name, -delta)
    }

    pub fn get(&self, name: &str) -> i64 {
        *self.track.get(name).unwrap_or(&0)
    }

    /// Iterates entries in first-seen order, each with its percentage of
    /// the running total. `percent` is `None` when the total is zero.
    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.order.iter().map(move |name| {
            let value = self.track[name];
            let percent = if self.sum != 0 {
                Some(100.0 * value as f64 / self.sum as f64)
            } else {
                None
            };
            Entry { name: name.clone(), value, percent }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc_tracks_running_total() {
        let mut s = Statistics::new("algorithms");
        assert_eq!(s.inc("rsasha256", 1), 1);
        assert_eq!(s.inc("rsasha256", 2), 3);
        assert_eq!(s.inc("ecdsap256", 1), 1);
        assert_eq!(s.get("ecdsap256"), 1);
        assert_eq!(s.get("missing"), 0);
    }

    #[test]
    fn dec_is_symmetric_with_inc() {
        let mut a = Statistics::new("a");
        a.inc("k", 5);
        a.dec("k", 2);

        let mut b = Statistics::new("b");
        b.inc("k", 5);
        b.inc("k", -2);

        assert_eq!(a.get("k"), b.get("k"));
    }

    #[test]
    fn dec_on_absent_key_still_adjusts_total() {
        let mut s = Statistics::new("s");
        s.inc("present", 10);
        s.dec("absent", 4);
        let total: i64 = s.entries().map(|e| e.value).sum::<i64>();
        assert_eq!(total, 10 + (-4));
    }

    #[test]
    fn percent_undefined_when_total_zero() {
        let mut s = Statistics::new("s");
        s.inc("a", 5);
        s.dec("a", 5);
        let entry = s.entries().next().unwrap();
        assert_eq!(entry.percent, None);
    }

    #[test]
    fn percent_reflects_share_of_total() {
        let mut s = Statistics::new("s");
        s.inc("a", 75);
        s.inc("b", 25);
        let by_name: HashMap<_, _> = s.entries().map(|e| (e.name.clone(), e.percent)).collect();
        assert_eq!(by_name["a"], Some(75.0));
        assert_eq!(by_name["b"], Some(25.0));
    }

    #[test]
    fn entries_preserve_first_seen_order() {
        let mut s = Statistics::new("s");
        s.inc("z", 1);
        s.inc("a", 1);
        s.inc("m", 1);
        let names: Vec<_> = s.entries().map(|e| e.name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
