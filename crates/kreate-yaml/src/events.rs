use yaml_rust::parser::{Event, MarkedEventReceiver};
use yaml_rust::scanner::Marker;

use crate::path_map::{Location, NodeKind, PathMap, Phase};

/// Feeds parser events into a [`PathMap`] as open/close notifications.
pub(crate) struct PathMapReceiver<'a> {
    map: &'a mut PathMap,
    /// Byte offset of every char, only built for non-ASCII sources.
    byte_offsets: Option<Vec<usize>>,
    source_len: usize,
}

impl<'a> PathMapReceiver<'a> {
    pub(crate) fn new(map: &'a mut PathMap, source: &str) -> Self {
        let byte_offsets =
            (!source.is_ascii()).then(|| source.char_indices().map(|(idx, _)| idx).collect());
        Self {
            map,
            byte_offsets,
            source_len: source.len(),
        }
    }

    fn location(&self, mark: Marker) -> Location {
        let offset = match &self.byte_offsets {
            Some(offsets) => offsets.get(mark.index()).copied().unwrap_or(self.source_len),
            None => mark.index(),
        };
        Location {
            line: mark.line().saturating_sub(1),
            column: mark.col(),
            offset,
        }
    }
}

impl MarkedEventReceiver for PathMapReceiver<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        let location = self.location(mark);
        match event {
            Event::MappingStart(_) => {
                self.map
                    .record_event(Phase::Open, NodeKind::Mapping, location);
            }
            Event::MappingEnd => {
                self.map
                    .record_event(Phase::Close, NodeKind::Mapping, location);
            }
            Event::SequenceStart(_) => {
                self.map
                    .record_event(Phase::Open, NodeKind::Sequence, location);
            }
            Event::SequenceEnd => {
                self.map
                    .record_event(Phase::Close, NodeKind::Sequence, location);
            }
            Event::Scalar(value, ..) => {
                let node = NodeKind::Scalar(&value);
                self.map.record_event(Phase::Open, node, location);
                self.map.record_event(Phase::Close, node, location);
            }
            Event::Alias(_) => {
                let node = NodeKind::Scalar("*");
                self.map.record_event(Phase::Open, node, location);
                self.map.record_event(Phase::Close, node, location);
            }
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd
            | Event::Nothing => {}
        }
    }
}
