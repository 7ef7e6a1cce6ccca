// Copyright 2022 Oxide Computer Company

//! A one-dimensional colored interval map over IPv4 addresses.
//!
//! The map is an ordered sequence of disjoint colored segments. Colors
//! are client-defined values supporting additive composition; segments
//! hold them through shared handles so that copies never duplicate color
//! state. After every operation adjacent segments of equal color are
//! coalesced, so no two neighboring segments ever share a color.

use std::fmt;
use std::rc::Rc;

use crate::addr::Ip4Addr;
use crate::interval::{Interval, Metric};
use crate::range::Ip4Range;

/// A client-defined color with additive composition.
pub trait Color: Clone + Ord {
    /// The composition of two colors, used by blending.
    fn blend(&self, other: &Self) -> Self;

    /// Remove `other` from the composition, used by unblending.
    fn unblend(&self, other: &Self) -> Self;
}

/// Shared handle to a color value. Several segments may hold the same
/// color; the value lives as long as any segment holds it.
pub type Handle<C> = Rc<C>;

/// A maximal interval annotated with one color.
#[derive(Clone)]
pub struct Segment<C> {
    range: Ip4Range,
    color: Handle<C>,
}

impl<C> Segment<C> {
    fn new(lo: Ip4Addr, hi: Ip4Addr, color: Handle<C>) -> Self {
        Self {
            range: Ip4Range::new(lo, hi),
            color,
        }
    }

    pub fn range(&self) -> Ip4Range {
        self.range
    }

    pub fn color(&self) -> &Handle<C> {
        &self.color
    }
}

impl<C: fmt::Debug> fmt::Debug for Segment<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}={:?}", self.range, self.color)
    }
}

/// An ordered mapping from disjoint address ranges to colors.
#[derive(Clone)]
pub struct IpMap<C> {
    spans: Vec<Segment<C>>,
}

impl<C: Color> IpMap<C> {
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn segments(&self) -> &[Segment<C>] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment<C>> {
        self.spans.iter()
    }

    /// The color painted on `addr`, if any.
    pub fn color_at(&self, addr: Ip4Addr) -> Option<&Handle<C>> {
        let at = self.spans.partition_point(|s| Interval::max(&s.range) < addr);
        self.spans
            .get(at)
            .filter(|s| s.range.contains(addr))
            .map(|s| &s.color)
    }

    /// Indices `[i, j)` of the segments intersecting `range`.
    fn window(&self, range: &Ip4Range) -> (usize, usize) {
        let i = self
            .spans
            .partition_point(|s| Interval::max(&s.range) < Interval::min(range));
        let j = i
            + self.spans[i..]
                .partition_point(|s| Interval::min(&s.range) <= Interval::max(range));
        (i, j)
    }

    /// The part of the first windowed segment hanging out to the left of
    /// `range`, with its original color.
    fn left_overhang(s: &Segment<C>, range: &Ip4Range) -> Option<Segment<C>> {
        if Interval::min(&s.range) < Interval::min(range) {
            Interval::min(range).pred().map(|hi| {
                Segment::new(Interval::min(&s.range), hi, s.color.clone())
            })
        } else {
            None
        }
    }

    /// The part of the last windowed segment hanging out to the right.
    fn right_overhang(s: &Segment<C>, range: &Ip4Range) -> Option<Segment<C>> {
        if Interval::max(&s.range) > Interval::max(range) {
            Interval::max(range).succ().map(|lo| {
                Segment::new(lo, Interval::max(&s.range), s.color.clone())
            })
        } else {
            None
        }
    }

    /// Overwrite existing colors within `range` with `color`, preserving
    /// coverage outside it.
    pub fn paint(&mut self, range: Ip4Range, color: &Handle<C>) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.window(&range);
        let mut repl = Vec::with_capacity(3);
        if i < j {
            repl.extend(Self::left_overhang(&self.spans[i], &range));
        }
        repl.push(Segment {
            range,
            color: color.clone(),
        });
        if i < j {
            repl.extend(Self::right_overhang(&self.spans[j - 1], &range));
        }
        self.spans.splice(i..j, repl);
        self.coalesce();
    }

    /// Within `range`, remove coverage wherever the existing color equals
    /// `color`; other colors are left alone.
    pub fn unpaint(&mut self, range: Ip4Range, color: &Handle<C>) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.window(&range);
        let mut repl = Vec::new();
        for s in &self.spans[i..j] {
            if *s.color == **color {
                repl.extend(Self::left_overhang(s, &range));
                repl.extend(Self::right_overhang(s, &range));
            } else {
                repl.push(s.clone());
            }
        }
        self.spans.splice(i..j, repl);
        self.coalesce();
    }

    /// Within `range`, remove all coverage regardless of color.
    pub fn uncolor(&mut self, range: Ip4Range) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.window(&range);
        if i == j {
            return;
        }
        let mut repl = Vec::with_capacity(2);
        repl.extend(Self::left_overhang(&self.spans[i], &range));
        repl.extend(Self::right_overhang(&self.spans[j - 1], &range));
        self.spans.splice(i..j, repl);
        self.coalesce();
    }

    /// Within `range`, add `color` to existing coverage, and color the
    /// uncovered remainder with `color` alone, so that afterwards the
    /// union of coverage includes all of `range`.
    pub fn blend(&mut self, range: Ip4Range, color: &Handle<C>) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.window(&range);
        let mut repl = Vec::new();
        let mut cursor = Some(Interval::min(&range));
        for s in &self.spans[i..j] {
            let cross = s.range.intersection(&range);
            repl.extend(Self::left_overhang(s, &range));
            // fill the uncovered gap before this segment
            if let Some(at) = cursor {
                if at < Interval::min(&cross) {
                    if let Some(hi) = Interval::min(&cross).pred() {
                        repl.push(Segment::new(at, hi, color.clone()));
                    }
                }
            }
            repl.push(Segment {
                range: cross,
                color: Rc::new(s.color.blend(color)),
            });
            repl.extend(Self::right_overhang(s, &range));
            cursor = Interval::max(&cross).succ();
        }
        // the uncovered tail of the range
        if let Some(at) = cursor {
            if at <= Interval::max(&range) {
                repl.push(Segment::new(at, Interval::max(&range), color.clone()));
            }
        }
        self.spans.splice(i..j, repl);
        self.coalesce();
    }

    /// Within the covered part of `range`, subtract `color` from the
    /// existing color. Uncovered subranges are unaffected.
    pub fn unblend(&mut self, range: Ip4Range, color: &Handle<C>) {
        if range.is_empty() {
            return;
        }
        let (i, j) = self.window(&range);
        let mut repl = Vec::new();
        for s in &self.spans[i..j] {
            let cross = s.range.intersection(&range);
            repl.extend(Self::left_overhang(s, &range));
            repl.push(Segment {
                range: cross,
                color: Rc::new(s.color.unblend(color)),
            });
            repl.extend(Self::right_overhang(s, &range));
        }
        self.spans.splice(i..j, repl);
        self.coalesce();
    }

    /// Apply each segment of `src` as a [`paint`](Self::paint).
    pub fn paint_map(&mut self, src: &IpMap<C>) {
        for s in &src.spans {
            self.paint(s.range, &s.color);
        }
    }

    /// Paint each range of `src` with the one given color.
    pub fn paint_map_with(&mut self, src: &IpMap<C>, color: &Handle<C>) {
        for s in &src.spans {
            self.paint(s.range, color);
        }
    }

    /// Apply each segment of `src` as an [`unpaint`](Self::unpaint).
    pub fn unpaint_map(&mut self, src: &IpMap<C>) {
        for s in &src.spans {
            self.unpaint(s.range, &s.color);
        }
    }

    pub fn unpaint_map_with(&mut self, src: &IpMap<C>, color: &Handle<C>) {
        for s in &src.spans {
            self.unpaint(s.range, color);
        }
    }

    /// Remove all coverage within each range of `src`.
    pub fn uncolor_map(&mut self, src: &IpMap<C>) {
        for s in &src.spans {
            self.uncolor(s.range);
        }
    }

    /// Apply each segment of `src` as a [`blend`](Self::blend).
    pub fn blend_map(&mut self, src: &IpMap<C>) {
        for s in &src.spans {
            self.blend(s.range, &s.color);
        }
    }

    pub fn blend_map_with(&mut self, src: &IpMap<C>, color: &Handle<C>) {
        for s in &src.spans {
            self.blend(s.range, color);
        }
    }

    /// Apply each segment of `src` as an [`unblend`](Self::unblend).
    pub fn unblend_map(&mut self, src: &IpMap<C>) {
        for s in &src.spans {
            self.unblend(s.range, &s.color);
        }
    }

    pub fn unblend_map_with(&mut self, src: &IpMap<C>, color: &Handle<C>) {
        for s in &src.spans {
            self.unblend(s.range, color);
        }
    }

    /// Merge neighboring segments that are adjacent and equal in color.
    fn coalesce(&mut self) {
        let mut out: Vec<Segment<C>> = Vec::with_capacity(self.spans.len());
        for s in self.spans.drain(..) {
            if let Some(last) = out.last_mut() {
                if Interval::max(&last.range).succ() == Some(Interval::min(&s.range))
                    && *last.color == *s.color
                {
                    last.range = Ip4Range::new(
                        Interval::min(&last.range),
                        Interval::max(&s.range),
                    );
                    continue;
                }
            }
            out.push(s);
        }
        self.spans = out;
    }
}

impl<C: Color> Default for IpMap<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: fmt::Debug> fmt::Debug for IpMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.spans.iter()).finish()
    }
}
