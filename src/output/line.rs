//! # Composite line.
//!
//! The full bar content: every module's current [`Output`] concatenated in
//! registration order. It is the only artifact handed to renderers, and the
//! click router resolves positions against the last published one.

use std::sync::Arc;

use super::click::SegmentRef;
use super::segment::{Output, Segment};

/// One segment of the composite line, tagged with its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEntry {
    /// Registration index of the owning module.
    pub module: usize,
    /// Name of the owning module.
    pub name: Arc<str>,
    /// Position of the segment inside the module's own output.
    pub index: usize,
    pub segment: Segment,
}

/// Ordered concatenation of all module outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeLine {
    entries: Vec<LineEntry>,
}

impl CompositeLine {
    /// Concatenates `(name, output)` pairs; the iteration order is the module index.
    pub fn compose<'a, I>(slots: I) -> Self
    where
        I: IntoIterator<Item = (&'a Arc<str>, &'a Output)>,
    {
        let entries = slots
            .into_iter()
            .enumerate()
            .flat_map(|(module, (name, output))| {
                output
                    .iter()
                    .enumerate()
                    .map(move |(index, segment)| LineEntry {
                        module,
                        name: Arc::clone(name),
                        index,
                        segment: segment.clone(),
                    })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a click target to its entry.
    pub fn resolve(&self, target: &SegmentRef) -> Option<&LineEntry> {
        match *target {
            SegmentRef::Position(pos) => self.entries.get(pos),
            SegmentRef::Module { module, segment } => self
                .entries
                .iter()
                .find(|e| e.module == module && e.index == segment),
        }
    }

    /// Segments currently contributed by `module`, in its own order.
    pub fn module_segments(&self, module: usize) -> impl Iterator<Item = &Segment> {
        self.entries
            .iter()
            .filter(move |e| e.module == module)
            .map(|e| &e.segment)
    }

    /// Plain texts, mostly for logs and tests.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.segment.text()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Color;

    fn names(n: &[&str]) -> Vec<Arc<str>> {
        n.iter().map(|s| Arc::from(*s)).collect()
    }

    #[test]
    fn concatenates_in_registration_order() {
        let names = names(&["disk", "hidden", "clock"]);
        let outputs = vec![
            Output::from(vec![Segment::new("/: 1G"), Segment::new("/home: 2G")]),
            Output::empty(),
            Output::one(Segment::new("12:00")),
        ];
        let line = CompositeLine::compose(names.iter().zip(outputs.iter()));

        assert_eq!(line.texts(), vec!["/: 1G", "/home: 2G", "12:00"]);
        assert_eq!(line.entries()[2].module, 2);
        assert_eq!(line.entries()[1].index, 1);
        assert_eq!(line.module_segments(1).count(), 0);
    }

    #[test]
    fn replacing_one_output_only_touches_its_subsequence() {
        let names = names(&["a", "b", "c"]);
        let mut outputs = vec![
            Output::one(Segment::new("A")),
            Output::one(Segment::new("B")),
            Output::one(Segment::new("C")),
        ];
        let before = CompositeLine::compose(names.iter().zip(outputs.iter()));

        outputs[1] = Output::from(vec![
            Segment::new("B1").with_color(Color::Bad),
            Segment::new("B2"),
        ]);
        let after = CompositeLine::compose(names.iter().zip(outputs.iter()));

        let b: Vec<&Segment> = after.module_segments(1).collect();
        assert_eq!(b, outputs[1].segments().iter().collect::<Vec<_>>());
        for m in [0, 2] {
            assert!(before.module_segments(m).eq(after.module_segments(m)));
        }
    }

    #[test]
    fn resolves_position_and_module_refs() {
        let names = names(&["a", "b"]);
        let outputs = vec![
            Output::one(Segment::new("A")),
            Output::from(vec![Segment::new("B0"), Segment::new("B1")]),
        ];
        let line = CompositeLine::compose(names.iter().zip(outputs.iter()));

        assert_eq!(line.resolve(&SegmentRef::Position(2)).unwrap().segment.text(), "B1");
        let by_module = line
            .resolve(&SegmentRef::Module { module: 1, segment: 0 })
            .unwrap();
        assert_eq!(by_module.segment.text(), "B0");
        assert!(line.resolve(&SegmentRef::Position(3)).is_none());
    }
}
